use super::sweep::{sweep, TraversalOrder};
use super::update_rule::UpdateRule;
use crate::error::{IsingError, Result};
use crate::lattice::Lattice;
use rand;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Length of a chain and which of its sweeps are recorded.
///
/// Sweep `i` (counting from 0) is recorded when `i >= burn_in` and `i % interval == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainParameters {
    total_sweeps: usize,
    burn_in: usize,
    interval: usize,
}

impl Default for ChainParameters {
    fn default() -> Self {
        ChainParameters {
            total_sweeps: 1000,
            burn_in: 100,
            interval: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPhase {
    BurnIn,
    Sampling,
}

impl ChainParameters {
    pub fn new(total_sweeps: usize, burn_in: usize, interval: usize) -> Result<Self> {
        let params = ChainParameters {
            total_sweeps,
            burn_in,
            interval,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_sweeps == 0 {
            return Err(IsingError::Configuration(String::from(
                "total_sweeps must be >= 1",
            )));
        }
        if self.interval == 0 {
            return Err(IsingError::Configuration(String::from(
                "interval must be >= 1",
            )));
        }
        if self.burn_in >= self.total_sweeps {
            return Err(IsingError::Configuration(format!(
                "burn_in ({}) must be smaller than total_sweeps ({})",
                self.burn_in, self.total_sweeps
            )));
        }
        let retained = self.expected_samples();
        if retained < 2 {
            return Err(IsingError::Configuration(format!(
                "The chain retains {retained} sample(s), at least 2 are needed"
            )));
        }
        Ok(())
    }

    pub fn get_total_sweeps(&self) -> usize {
        self.total_sweeps
    }

    pub fn get_burn_in(&self) -> usize {
        self.burn_in
    }

    pub fn get_interval(&self) -> usize {
        self.interval
    }

    pub fn phase(&self, sweep_idx: usize) -> ChainPhase {
        if sweep_idx < self.burn_in {
            ChainPhase::BurnIn
        } else {
            ChainPhase::Sampling
        }
    }

    pub fn is_sample_sweep(&self, sweep_idx: usize) -> bool {
        self.phase(sweep_idx) == ChainPhase::Sampling && sweep_idx % self.interval == 0
    }

    /// Number of multiples of `interval` in `burn_in..total_sweeps`.
    pub fn expected_samples(&self) -> usize {
        if self.interval == 0 || self.burn_in >= self.total_sweeps {
            return 0;
        }
        let first = self.burn_in.div_ceil(self.interval) * self.interval;
        if first >= self.total_sweeps {
            0
        } else {
            (self.total_sweeps - 1 - first) / self.interval + 1
        }
    }
}

/// Magnetisation, energy and squared energy of every retained sweep of one chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    magnetisations: Vec<f64>,
    energies: Vec<f64>,
    squared_energies: Vec<f64>,
}

impl SampleSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        SampleSeries {
            magnetisations: Vec::with_capacity(capacity),
            energies: Vec::with_capacity(capacity),
            squared_energies: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, magnetisation: f64, energy: f64) {
        self.magnetisations.push(magnetisation);
        self.energies.push(energy);
        self.squared_energies.push(energy * energy);
    }

    pub fn record<L: Lattice>(&mut self, lattice: &L) {
        self.push(lattice.get_magnetisation(), lattice.get_energy());
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    pub fn get_magnetisations(&self) -> &[f64] {
        &self.magnetisations
    }

    pub fn get_energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn get_squared_energies(&self) -> &[f64] {
        &self.squared_energies
    }
}

/// Run one chain at inverse temperature `beta`, starting from `current_lattice`.
///
/// Returns the lattice as left by the last sweep together with the retained samples.
pub fn run_chain<L: Lattice, R: rand::Rng + ?Sized>(
    current_lattice: L,
    beta: f64,
    params: &ChainParameters,
    update_rule: UpdateRule,
    order: TraversalOrder,
    rng: &mut R,
) -> (L, SampleSeries) {
    let mut current_lattice = current_lattice;
    let mut samples = SampleSeries::with_capacity(params.expected_samples());

    trace!(beta, burn_in = params.burn_in, "Starting burn-in.");
    for sweep_idx in 0..params.total_sweeps {
        if sweep_idx == params.burn_in {
            trace!(beta, sweep_idx, "Burn-in finished, sampling.");
        }
        current_lattice = sweep(current_lattice, beta, update_rule, order, rng);
        if params.is_sample_sweep(sweep_idx) {
            samples.record(&current_lattice);
        }
    }

    debug!(
        beta,
        retained = samples.len(),
        "Chain finished after {} sweeps.",
        params.total_sweeps
    );
    (current_lattice, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::square_lattice::SquareLattice;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn default_parameters_retain_ninety_samples() {
        let params = ChainParameters::default();
        assert_eq!(params.get_total_sweeps(), 1000);
        assert_eq!(params.get_burn_in(), 100);
        assert_eq!(params.get_interval(), 10);
        assert_eq!(params.expected_samples(), 90);
        assert!(params.is_sample_sweep(100));
        assert!(params.is_sample_sweep(990));
        assert!(!params.is_sample_sweep(90));
        assert!(!params.is_sample_sweep(105));
    }

    #[test]
    fn expected_samples_matches_sampled_sweeps() {
        let cases = [(50, 10, 5), (11, 10, 10), (10, 3, 4), (7, 0, 1), (9, 1, 20)];
        for (total_sweeps, burn_in, interval) in cases {
            let params = ChainParameters {
                total_sweeps,
                burn_in,
                interval,
            };
            let counted = (0..total_sweeps)
                .filter(|i| params.is_sample_sweep(*i))
                .count();
            assert_eq!(params.expected_samples(), counted, "{params:?}");
        }
    }

    #[test]
    fn chain_phases() {
        let params = ChainParameters::new(20, 5, 3).unwrap();
        assert_eq!(params.phase(0), ChainPhase::BurnIn);
        assert_eq!(params.phase(4), ChainPhase::BurnIn);
        assert_eq!(params.phase(5), ChainPhase::Sampling);
        assert!(!params.is_sample_sweep(3));
        assert!(params.is_sample_sweep(6));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let cases = [(0, 0, 1), (10, 2, 0), (10, 10, 1), (10, 20, 1), (11, 10, 10), (9, 1, 20)];
        for (total, burn_in, interval) in cases {
            assert!(
                matches!(
                    ChainParameters::new(total, burn_in, interval),
                    Err(IsingError::Configuration(_))
                ),
                "({total}, {burn_in}, {interval}) should be rejected"
            );
        }
    }

    #[test]
    fn chains_retaining_fewer_than_two_samples_are_rejected() {
        // sweep 10 is the only one sampled
        let single = ChainParameters::new(11, 10, 10);
        assert!(matches!(single, Err(IsingError::Configuration(_))));

        let pair = ChainParameters::new(21, 10, 10).unwrap();
        assert_eq!(pair.expected_samples(), 2);
    }

    #[test]
    fn sample_series_records_squared_energy() {
        let mut series = SampleSeries::default();
        assert!(series.is_empty());

        series.push(3., -2.);
        series.push(-1., 4.);

        assert_eq!(series.len(), 2);
        assert_eq!(series.get_magnetisations(), &[3., -1.]);
        assert_eq!(series.get_energies(), &[-2., 4.]);
        assert_eq!(series.get_squared_energies(), &[4., 16.]);
    }

    #[test]
    fn run_chain_returns_one_sample_per_sampled_sweep() {
        let mut rng = SmallRng::seed_from_u64(42);
        let lattice = SquareLattice::new_random(4, 4, 0., &mut rng).unwrap();
        let params = ChainParameters::new(50, 10, 5).unwrap();

        let (_, samples) = run_chain(
            lattice,
            1.,
            &params,
            UpdateRule::Metropolis,
            TraversalOrder::RowColumnShuffle,
            &mut rng,
        );

        assert_eq!(samples.len(), 8);
        assert_eq!(samples.get_magnetisations().len(), 8);
        assert_eq!(samples.get_squared_energies().len(), 8);
    }

    #[test]
    fn run_chain_records_final_state_consistently() {
        let mut rng = SmallRng::seed_from_u64(9);
        let lattice = SquareLattice::new_random(5, 5, 0.01, &mut rng).unwrap();
        // the final sweep is sampled, so the last sample describes the returned lattice
        let params = ChainParameters::new(21, 0, 4).unwrap();

        let (lattice, samples) = run_chain(
            lattice,
            0.3,
            &params,
            UpdateRule::HeatBath,
            TraversalOrder::RandomSite,
            &mut rng,
        );

        assert_eq!(samples.len(), 6);
        assert_eq!(
            *samples.get_magnetisations().last().unwrap(),
            lattice.get_magnetisation()
        );
        assert_eq!(*samples.get_energies().last().unwrap(), lattice.get_energy());
    }
}
