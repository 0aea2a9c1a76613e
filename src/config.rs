use crate::error::{IsingError, Result};
use crate::lattice::InitialState;
use crate::monte_carlo::beta_sweep::{check_schedule, ChainStart};
use crate::monte_carlo::chain::ChainParameters;
use crate::monte_carlo::statistics::SpecificHeatErrorEstimator;
use crate::monte_carlo::sweep::TraversalOrder;
use crate::monte_carlo::update_rule::UpdateRule;
use crate::monte_carlo::SingleSpinFlipSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Ten inverse temperatures between roughly 0.1 and 5, shared with the analytic table.
pub const DEFAULT_BETAS: [f64; 10] = [0.11, 0.2, 0.64, 1.17, 1.7, 2.23, 2.76, 3.29, 3.82, 4.88];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatticeConfig {
    pub width: usize,
    pub height: usize,
    pub field: f64,
    pub initial: InitialState,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        LatticeConfig {
            width: 100,
            height: 100,
            field: 0.01,
            initial: InitialState::Random,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub lattice: LatticeConfig,
    pub chain: ChainParameters,
    pub update_rule: UpdateRule,
    pub traversal: TraversalOrder,
    pub chain_start: ChainStart,
    pub specific_heat_error: SpecificHeatErrorEstimator,
    pub betas: Vec<f64>,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            lattice: LatticeConfig::default(),
            chain: ChainParameters::default(),
            update_rule: UpdateRule::default(),
            traversal: TraversalOrder::default(),
            chain_start: ChainStart::default(),
            specific_heat_error: SpecificHeatErrorEstimator::default(),
            betas: DEFAULT_BETAS.to_vec(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| IsingError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading simulation config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lattice.width == 0 || self.lattice.height == 0 {
            return Err(IsingError::Configuration(format!(
                "Lattice dimensions must be positive, got {}x{}",
                self.lattice.width, self.lattice.height
            )));
        }
        if !self.lattice.field.is_finite() {
            return Err(IsingError::Configuration(format!(
                "External field must be finite, got {}",
                self.lattice.field
            )));
        }
        self.chain.validate()?;
        check_schedule(&self.betas)
    }

    pub fn spin_flip_settings(&self) -> SingleSpinFlipSettings {
        SingleSpinFlipSettings::new(self.chain, self.update_rule)
            .with_traversal(self.traversal)
            .with_chain_start(self.chain_start)
            .with_specific_heat_error(self.specific_heat_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<SimulationConfig> {
        SimulationConfig::from_toml_str(content, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_gives_reference_defaults() {
        let config = parse("").unwrap();

        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.lattice.width, 100);
        assert_eq!(config.lattice.height, 100);
        assert_eq!(config.lattice.field, 0.01);
        assert_eq!(config.chain.expected_samples(), 90);
        assert_eq!(config.betas.len(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_file_is_parsed() {
        let config = parse(
            r#"
            update_rule = "heat-bath"
            traversal = "random-site"
            chain_start = "fresh"
            specific_heat_error = "jackknife"
            betas = [0.5, 1.0]
            seed = 42

            [lattice]
            width = 8
            height = 6
            field = 0.0
            initial = "all-up"

            [chain]
            total_sweeps = 200
            burn_in = 20
            interval = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.update_rule, UpdateRule::HeatBath);
        assert_eq!(config.traversal, TraversalOrder::RandomSite);
        assert_eq!(config.chain_start, ChainStart::Fresh);
        assert_eq!(config.specific_heat_error, SpecificHeatErrorEstimator::Jackknife);
        assert_eq!(config.betas, vec![0.5, 1.0]);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.lattice.initial, InitialState::AllUp);
        assert_eq!(config.chain, ChainParameters::new(200, 20, 4).unwrap());

        let settings = config.spin_flip_settings();
        assert_eq!(settings.get_update_rule(), UpdateRule::HeatBath);
        assert_eq!(settings.get_chain().expected_samples(), 45);
    }

    #[test]
    fn partial_lattice_table_keeps_other_defaults() {
        let config = parse("[lattice]\nwidth = 16\n").unwrap();

        assert_eq!(config.lattice.width, 16);
        assert_eq!(config.lattice.height, 100);
        assert_eq!(config.update_rule, UpdateRule::Metropolis);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            parse("temperature = 2.0"),
            Err(IsingError::ConfigParse { .. })
        ));
        assert!(matches!(
            parse("update_rule = \"wolff\""),
            Err(IsingError::ConfigParse { .. })
        ));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = SimulationConfig::default();
        config.betas = vec![1., 0.];
        assert!(matches!(config.validate(), Err(IsingError::Configuration(_))));

        let mut config = SimulationConfig::default();
        config.lattice.height = 0;
        assert!(matches!(config.validate(), Err(IsingError::Configuration(_))));

        let config = parse("[chain]\ntotal_sweeps = 10\nburn_in = 10\ninterval = 1\n").unwrap();
        assert!(matches!(config.validate(), Err(IsingError::Configuration(_))));
    }
}
