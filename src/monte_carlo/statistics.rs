//! Reductions of a chain's samples to means, standard errors and the specific heat.
//!
//! The standard error divides the population standard deviation by `sqrt(N - 1)`, the
//! convention the published result tables were produced with.

use super::chain::SampleSeries;
use super::mc_results::ObservableSummary;
use crate::error::{IsingError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// How the uncertainty of the specific heat is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecificHeatErrorEstimator {
    /// `beta^2 * standard_error(E^2)`. Ignores the covariance between `<E>` and `<E^2>`.
    #[default]
    Propagated,
    /// Leave-one-out jackknife over the energy samples.
    Jackknife,
}

fn require_samples(xs: &[f64], required: usize) -> Result<()> {
    if xs.len() < required {
        return Err(IsingError::DegenerateSample {
            len: xs.len(),
            required,
        });
    }
    Ok(())
}

fn ensure_finite(value: f64, quantity: &'static str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(IsingError::NumericOverflow { quantity })
    }
}

pub fn mean(xs: &[f64]) -> Result<f64> {
    require_samples(xs, 1)?;
    Ok(xs.mean())
}

/// Variance with denominator `N`.
pub fn population_variance(xs: &[f64]) -> Result<f64> {
    require_samples(xs, 1)?;
    if xs.len() == 1 {
        return Ok(0.);
    }
    Ok(xs.population_variance())
}

pub fn standard_error(xs: &[f64]) -> Result<f64> {
    require_samples(xs, 2)?;
    let variance = population_variance(xs)?;
    Ok(variance.sqrt() / ((xs.len() - 1) as f64).sqrt())
}

pub fn specific_heat(beta: f64, mean_energy: f64, mean_squared_energy: f64) -> f64 {
    beta.powi(2) * (mean_squared_energy - mean_energy.powi(2))
}

/// Jackknife error of `beta^2 * Var(E)`, built from the `N` leave-one-out variances.
pub fn jackknife_specific_heat_error(beta: f64, energies: &[f64]) -> Result<f64> {
    require_samples(energies, 2)?;
    let n = energies.len() as f64;
    let centre = mean(energies)?;
    // shifting by the mean leaves every variance unchanged and avoids cancellation
    let deviations: Vec<f64> = energies.iter().map(|e| e - centre).collect();
    let sum: f64 = deviations.iter().sum();
    let sum_sq: f64 = deviations.iter().map(|d| d * d).sum();

    let leave_one_out: Vec<f64> = deviations
        .iter()
        .map(|d| {
            let m = (sum - d) / (n - 1.);
            let variance = ((sum_sq - d * d) / (n - 1.) - m * m).max(0.);
            beta.powi(2) * variance
        })
        .collect();
    let jackknife_mean = leave_one_out.iter().mean();
    let spread: f64 = leave_one_out
        .iter()
        .map(|c| (c - jackknife_mean).powi(2))
        .sum();

    Ok(((n - 1.) / n * spread).sqrt())
}

/// Reduce the samples of one chain at `beta` to its observable summary.
pub fn summarise(
    beta: f64,
    samples: &SampleSeries,
    estimator: SpecificHeatErrorEstimator,
) -> Result<ObservableSummary> {
    let magnetisations = samples.get_magnetisations();
    let energies = samples.get_energies();
    let squared_energies = samples.get_squared_energies();

    let mean_energy = ensure_finite(mean(energies)?, "mean energy")?;
    let mean_squared_energy = ensure_finite(mean(squared_energies)?, "mean squared energy")?;
    // the difference of two rounded means can come out marginally negative
    let heat = specific_heat(beta, mean_energy, mean_squared_energy).max(0.);

    let specific_heat_error = match estimator {
        SpecificHeatErrorEstimator::Propagated => beta.powi(2) * standard_error(squared_energies)?,
        SpecificHeatErrorEstimator::Jackknife => jackknife_specific_heat_error(beta, energies)?,
    };

    Ok(ObservableSummary {
        beta,
        magnetisation: ensure_finite(mean(magnetisations)?, "mean magnetisation")?,
        magnetisation_error: ensure_finite(standard_error(magnetisations)?, "magnetisation error")?,
        energy: mean_energy,
        energy_error: ensure_finite(standard_error(energies)?, "energy error")?,
        specific_heat: ensure_finite(heat, "specific heat")?,
        specific_heat_error: ensure_finite(specific_heat_error, "specific heat error")?,
        num_samples: samples.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx;

    #[test]
    fn mean_of_empty_series_is_degenerate() {
        assert!(matches!(
            mean(&[]),
            Err(IsingError::DegenerateSample { len: 0, required: 1 })
        ));
    }

    #[test]
    fn mean_of_single_value_is_that_value() {
        assert_eq!(mean(&[4.25]).unwrap(), 4.25);
        approx::assert_relative_eq!(mean(&[1., 2., 3., 6.]).unwrap(), 3.);
    }

    #[test]
    fn variance_uses_population_denominator() {
        approx::assert_relative_eq!(
            population_variance(&[1., 2., 3., 6.]).unwrap(),
            3.5,
            epsilon = 1e-12
        );
        assert_eq!(population_variance(&[7.]).unwrap(), 0.);
    }

    #[test]
    fn standard_error_needs_two_samples() {
        assert!(matches!(
            standard_error(&[]),
            Err(IsingError::DegenerateSample { len: 0, required: 2 })
        ));
        assert!(matches!(
            standard_error(&[1.]),
            Err(IsingError::DegenerateSample { len: 1, required: 2 })
        ));
    }

    #[test]
    fn standard_error_mixes_population_and_sample_conventions() {
        // population variance 3.5, divided by sqrt(3)
        approx::assert_relative_eq!(
            standard_error(&[1., 2., 3., 6.]).unwrap(),
            (3.5f64).sqrt() / 3f64.sqrt(),
            epsilon = 1e-15
        );
        assert_eq!(standard_error(&[2., 2., 2.]).unwrap(), 0.);
    }

    #[test]
    fn specific_heat_from_energy_fluctuations() {
        approx::assert_relative_eq!(specific_heat(2., 3., 10.), 4.);
        assert_eq!(specific_heat(0.3, -5., 25.), 0.);
    }

    #[test]
    fn specific_heat_is_non_negative_for_summaries() {
        let mut series = SampleSeries::default();
        for (m, e) in [(1., -31.97), (3., -31.97), (-2., -31.97), (0., -31.97)] {
            series.push(m, e);
        }

        let summary = summarise(4.88, &series, SpecificHeatErrorEstimator::Propagated).unwrap();

        assert!(summary.specific_heat >= 0.);
        approx::assert_abs_diff_eq!(summary.specific_heat, 0., epsilon = 1e-9);
    }

    #[test]
    fn summarise_reduces_all_observables() {
        let mut series = SampleSeries::default();
        for (m, e) in [(16., -32.), (14., -24.), (12., -24.), (14., -32.)] {
            series.push(m, e);
        }

        let summary = summarise(0.5, &series, SpecificHeatErrorEstimator::Propagated).unwrap();

        assert_eq!(summary.beta, 0.5);
        assert_eq!(summary.num_samples, 4);
        approx::assert_relative_eq!(summary.magnetisation, 14., epsilon = 1e-12);
        approx::assert_relative_eq!(
            summary.magnetisation_error,
            (2f64 / 3.).sqrt(),
            epsilon = 1e-12
        );
        approx::assert_relative_eq!(summary.energy, -28., epsilon = 1e-12);
        approx::assert_relative_eq!(summary.energy_error, (16f64 / 3.).sqrt(), epsilon = 1e-12);
        // <E^2> = 800, <E>^2 = 784
        approx::assert_relative_eq!(summary.specific_heat, 4., epsilon = 1e-12);
        // E^2 is 1024 or 576, population std 224
        approx::assert_relative_eq!(
            summary.specific_heat_error,
            0.25 * 224. / 3f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn summarise_rejects_single_sample() {
        let mut series = SampleSeries::default();
        series.push(16., -32.);

        assert!(matches!(
            summarise(1., &series, SpecificHeatErrorEstimator::Propagated),
            Err(IsingError::DegenerateSample { len: 1, required: 2 })
        ));
        assert!(matches!(
            summarise(1., &SampleSeries::default(), SpecificHeatErrorEstimator::Jackknife),
            Err(IsingError::DegenerateSample { len: 0, .. })
        ));
    }

    #[test]
    fn summarise_reports_overflowing_energies() {
        let mut series = SampleSeries::default();
        series.push(1., 1e200);
        series.push(1., 1e200);

        assert!(matches!(
            summarise(1., &series, SpecificHeatErrorEstimator::Propagated),
            Err(IsingError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn jackknife_error_vanishes_for_constant_energy() {
        assert_eq!(jackknife_specific_heat_error(2., &[-8., -8., -8.]).unwrap(), 0.);
        assert!(matches!(
            jackknife_specific_heat_error(2., &[-8.]),
            Err(IsingError::DegenerateSample { len: 1, required: 2 })
        ));
    }

    #[test]
    fn jackknife_error_matches_explicit_leave_one_out() {
        let energies = [-30., -28., -32., -24., -26.];
        let beta: f64 = 0.7;

        let leave_one_out: Vec<f64> = (0..energies.len())
            .map(|i| {
                let rest: Vec<f64> = energies
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, e)| *e)
                    .collect();
                beta.powi(2) * population_variance(&rest).unwrap()
            })
            .collect();
        let n = energies.len() as f64;
        let centre = leave_one_out.iter().sum::<f64>() / n;
        let expected =
            ((n - 1.) / n * leave_one_out.iter().map(|c| (c - centre).powi(2)).sum::<f64>()).sqrt();

        approx::assert_relative_eq!(
            jackknife_specific_heat_error(beta, &energies).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn jackknife_estimator_is_used_when_requested() {
        let mut series = SampleSeries::default();
        for (m, e) in [(16., -32.), (14., -24.), (12., -24.), (14., -32.)] {
            series.push(m, e);
        }

        let summary = summarise(0.5, &series, SpecificHeatErrorEstimator::Jackknife).unwrap();

        approx::assert_relative_eq!(
            summary.specific_heat_error,
            jackknife_specific_heat_error(0.5, series.get_energies()).unwrap()
        );
    }
}
