use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IsingError>;

#[derive(Debug, Error)]
pub enum IsingError {
    /// A reduction needs more retained samples than the chain produced.
    #[error("Sample series has {len} entries but at least {required} are required")]
    DegenerateSample { len: usize, required: usize },

    #[error("Numeric overflow while computing {quantity}")]
    NumericOverflow { quantity: &'static str },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to parse configuration file '{path}': {source}", path = path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
