use super::SingleSpinFlipSettings;
use crate::error::IsingError;
use serde::Serialize;
use std::cell::OnceCell;

/// Reduced observables of one chain. Magnetisation and energy are totals over the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservableSummary {
    pub beta: f64,
    pub magnetisation: f64,
    pub magnetisation_error: f64,
    pub energy: f64,
    pub energy_error: f64,
    pub specific_heat: f64,
    pub specific_heat_error: f64,
    pub num_samples: usize,
}

impl ObservableSummary {
    /// Rescale every extensive quantity to a single site.
    pub fn per_site(&self, num_sites: usize) -> Self {
        let n = num_sites as f64;
        ObservableSummary {
            beta: self.beta,
            magnetisation: self.magnetisation / n,
            magnetisation_error: self.magnetisation_error / n,
            energy: self.energy / n,
            energy_error: self.energy_error / n,
            specific_heat: self.specific_heat / n,
            specific_heat_error: self.specific_heat_error / n,
            num_samples: self.num_samples,
        }
    }
}

/// Outcome of one inverse temperature of the schedule.
#[derive(Debug)]
pub struct BetaPoint {
    pub beta: f64,
    pub outcome: Result<ObservableSummary, IsingError>,
}

#[derive(Debug)]
pub struct SweepResult {
    points: Vec<BetaPoint>,
    num_spins: usize,
    lattice_description: String,
    settings: SingleSpinFlipSettings,
    // cached lazily
    per_site_summaries: OnceCell<Vec<ObservableSummary>>,
}

impl SweepResult {
    pub fn new(
        points: Vec<BetaPoint>,
        num_spins: usize,
        lattice_description: String,
        settings: SingleSpinFlipSettings,
    ) -> Self {
        SweepResult {
            points,
            num_spins,
            lattice_description,
            settings,
            per_site_summaries: OnceCell::new(),
        }
    }

    pub fn get_points(&self) -> &[BetaPoint] {
        &self.points
    }

    pub fn get_betas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.beta).collect()
    }

    pub fn get_num_spins(&self) -> usize {
        self.num_spins
    }

    pub fn get_lattice_description(&self) -> &str {
        &self.lattice_description
    }

    pub fn get_settings(&self) -> &SingleSpinFlipSettings {
        &self.settings
    }

    /// Summaries of the successful points, in schedule order.
    pub fn summaries(&self) -> impl Iterator<Item = &ObservableSummary> {
        self.points.iter().filter_map(|p| p.outcome.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (f64, &IsingError)> {
        self.points
            .iter()
            .filter_map(|p| p.outcome.as_ref().err().map(|e| (p.beta, e)))
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn get_per_site_summaries(&self) -> &Vec<ObservableSummary> {
        self.per_site_summaries.get_or_init(|| {
            self.summaries()
                .map(|s| s.per_site(self.num_spins))
                .collect()
        })
    }
}
