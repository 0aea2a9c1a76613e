use crate::analytic::{critical_beta, AnalyticPoint};
use crate::error::Result;
use crate::monte_carlo::mc_results::SweepResult;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct SummaryRecord {
    beta: f64,
    energy: f64,
    energy_error: f64,
    specific_heat: f64,
    specific_heat_error: f64,
    magnetisation: f64,
    magnetisation_error: f64,
}

#[derive(Debug, Serialize)]
struct AnalyticRecord {
    beta: f64,
    energy: f64,
    specific_heat: f64,
    magnetisation: f64,
    critical_beta: f64,
}

/// Write one row per successfully reduced inverse temperature, in schedule order.
pub fn write_summary_csv(path: &Path, result: &SweepResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for summary in result.summaries() {
        writer.serialize(SummaryRecord {
            beta: summary.beta,
            energy: summary.energy,
            energy_error: summary.energy_error,
            specific_heat: summary.specific_heat,
            specific_heat_error: summary.specific_heat_error,
            magnetisation: summary.magnetisation,
            magnetisation_error: summary.magnetisation_error,
        })?;
    }
    for (beta, error) in result.failures() {
        warn!(beta, "Skipping failed inverse temperature in {}: {error}", path.display());
    }
    writer.flush()?;
    info!("Wrote Monte Carlo summary to {}", path.display());
    Ok(())
}

pub fn write_analytic_csv(path: &Path, points: &[AnalyticPoint]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let beta_c = critical_beta();
    for point in points {
        writer.serialize(AnalyticRecord {
            beta: point.beta,
            energy: point.energy,
            specific_heat: point.specific_heat,
            magnetisation: point.magnetisation,
            critical_beta: beta_c,
        })?;
    }
    writer.flush()?;
    info!("Wrote analytic reference to {}", path.display());
    Ok(())
}
