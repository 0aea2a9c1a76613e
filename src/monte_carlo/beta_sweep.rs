use super::chain::run_chain;
use super::mc_results::{BetaPoint, SweepResult};
use super::statistics::summarise;
use super::SingleSpinFlipSettings;
use crate::error::{IsingError, Result};
use crate::lattice::Lattice;
use rand::{self, rngs::SmallRng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Whether the chains of consecutive inverse temperatures share one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainStart {
    /// Every chain continues from the final state of the previous one, in schedule order.
    #[default]
    WarmStart,
    /// Every chain starts from its own fresh configuration. Chains are independent and run
    /// in parallel.
    Fresh,
}

pub fn check_schedule(betas: &[f64]) -> Result<()> {
    if betas.is_empty() {
        return Err(IsingError::Configuration(String::from(
            "The inverse temperature schedule must not be empty",
        )));
    }
    if let Some(beta) = betas.iter().find(|b| !(b.is_finite() && **b > 0.)) {
        return Err(IsingError::Configuration(format!(
            "Inverse temperatures must be positive and finite, got {beta}"
        )));
    }
    Ok(())
}

fn run_beta_point<L: Lattice, R: rand::Rng + ?Sized>(
    current_lattice: L,
    beta: f64,
    settings: &SingleSpinFlipSettings,
    rng: &mut R,
) -> (L, BetaPoint) {
    let (current_lattice, samples) = run_chain(
        current_lattice,
        beta,
        settings.get_chain(),
        settings.get_update_rule(),
        settings.get_traversal(),
        rng,
    );
    let outcome = summarise(beta, &samples, settings.get_specific_heat_error());
    match &outcome {
        Ok(summary) => info!(
            beta,
            magnetisation = summary.magnetisation,
            energy = summary.energy,
            specific_heat = summary.specific_heat,
            "Finished inverse temperature."
        ),
        Err(e) => warn!(beta, "Inverse temperature failed: {e}"),
    }
    (current_lattice, BetaPoint { beta, outcome })
}

/// Run one chain per entry of `betas` and reduce each to an observable summary.
///
/// `make_lattice` builds the starting configuration. It is called once for a warm start and
/// once per inverse temperature for fresh starts. All randomness is derived from `rng`, so a
/// seeded `rng` reproduces the full sweep in either mode.
pub fn run_beta_sweep<L, F, R>(
    make_lattice: F,
    betas: &[f64],
    settings: &SingleSpinFlipSettings,
    rng: &mut R,
) -> Result<SweepResult>
where
    L: Lattice + Send,
    F: Fn(&mut SmallRng) -> Result<L> + Sync,
    R: rand::Rng + ?Sized,
{
    check_schedule(betas)?;
    settings.get_chain().validate()?;
    info!(
        num_betas = betas.len(),
        rule = settings.get_update_rule().name(),
        "Starting inverse temperature sweep ({:?}).",
        settings.get_chain_start()
    );

    let (points, num_spins, lattice_description) = match settings.get_chain_start() {
        ChainStart::WarmStart => {
            let mut chain_rng = SmallRng::seed_from_u64(rng.random());
            let mut current_lattice = make_lattice(&mut chain_rng)?;
            let num_spins = current_lattice.number_sites();
            let description = current_lattice.describe();

            let mut points = Vec::with_capacity(betas.len());
            for &beta in betas {
                let (tmp_lattice, point) =
                    run_beta_point(current_lattice, beta, settings, &mut chain_rng);
                current_lattice = tmp_lattice;
                points.push(point);
            }
            (points, num_spins, description)
        }
        ChainStart::Fresh => {
            let seeds: Vec<u64> = betas.iter().map(|_| rng.random()).collect();
            let outcomes = betas
                .par_iter()
                .zip(seeds.par_iter())
                .map(|(&beta, &seed)| -> Result<(BetaPoint, usize, String)> {
                    let mut chain_rng = SmallRng::seed_from_u64(seed);
                    let lattice = make_lattice(&mut chain_rng)?;
                    let num_spins = lattice.number_sites();
                    let description = lattice.describe();
                    let (_, point) = run_beta_point(lattice, beta, settings, &mut chain_rng);
                    Ok((point, num_spins, description))
                })
                .collect::<Result<Vec<_>>>()?;

            let num_spins = outcomes.first().map_or(0, |o| o.1);
            let description = outcomes
                .first()
                .map(|o| o.2.clone())
                .unwrap_or_default();
            let points = outcomes.into_iter().map(|o| o.0).collect();
            (points, num_spins, description)
        }
    };

    let result = SweepResult::new(points, num_spins, lattice_description, *settings);
    info!(
        failed = result.failures().count(),
        "Inverse temperature sweep finished."
    );
    Ok(result)
}
