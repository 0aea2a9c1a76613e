pub mod analytic;
pub mod config;
pub mod error;
pub mod lattice;
pub mod monte_carlo;
pub mod output;
pub mod vis;

pub use error::{IsingError, Result};
