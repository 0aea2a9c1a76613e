use crate::config::SimulationConfig;
use crate::error::Result;
use crate::lattice::square_lattice::SquareLattice;
use beta_sweep::ChainStart;
use chain::ChainParameters;
use mc_results::SweepResult;
use rand;
use serde::{Deserialize, Serialize};
use statistics::SpecificHeatErrorEstimator;
use sweep::TraversalOrder;
use update_rule::UpdateRule;

pub mod beta_sweep;
pub mod chain;
pub mod mc_results;
pub mod statistics;
pub mod sweep;
pub mod update_rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SingleSpinFlipSettings {
    chain: ChainParameters,
    update_rule: UpdateRule,
    traversal: TraversalOrder,
    chain_start: ChainStart,
    specific_heat_error: SpecificHeatErrorEstimator,
}

impl SingleSpinFlipSettings {
    pub fn new(chain: ChainParameters, update_rule: UpdateRule) -> Self {
        SingleSpinFlipSettings {
            chain,
            update_rule,
            ..Default::default()
        }
    }

    pub fn with_traversal(mut self, traversal: TraversalOrder) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn with_chain_start(mut self, chain_start: ChainStart) -> Self {
        self.chain_start = chain_start;
        self
    }

    pub fn with_specific_heat_error(mut self, estimator: SpecificHeatErrorEstimator) -> Self {
        self.specific_heat_error = estimator;
        self
    }

    pub fn get_chain(&self) -> &ChainParameters {
        &self.chain
    }

    pub fn get_update_rule(&self) -> UpdateRule {
        self.update_rule
    }

    pub fn get_traversal(&self) -> TraversalOrder {
        self.traversal
    }

    pub fn get_chain_start(&self) -> ChainStart {
        self.chain_start
    }

    pub fn get_specific_heat_error(&self) -> SpecificHeatErrorEstimator {
        self.specific_heat_error
    }
}

/// Run the full inverse temperature sweep described by `config` on a square lattice.
pub fn simulate<R: rand::Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SweepResult> {
    config.validate()?;
    let lattice = config.lattice;
    beta_sweep::run_beta_sweep(
        |chain_rng| {
            SquareLattice::with_initial_state(
                lattice.width,
                lattice.height,
                lattice.field,
                lattice.initial,
                chain_rng,
            )
        },
        &config.betas,
        &config.spin_flip_settings(),
        rng,
    )
}
