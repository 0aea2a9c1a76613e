use crate::lattice::{Lattice, Spin};
use serde::{Deserialize, Serialize};

/// Signature shared by every single-site update: `(lattice, site, beta, uniform draw in [0, 1))`
/// to the spin the site holds afterwards.
pub type UpdateFunc<L> = fn(&L, <L as Lattice>::Idx, f64, f64) -> Spin;

/// Metropolis acceptance probability `min(1, exp(-2 beta s k))` for flipping a spin `s`
/// that sits in the local field `k`.
///
/// A non-negative exponent is capped to 1 before exponentiating, so the result never
/// overflows. Very negative exponents underflow to 0.
pub fn metropolis_acceptance(spin: f64, local_field: f64, beta: f64) -> f64 {
    let exponent = -2. * beta * spin * local_field;
    if exponent >= 0. {
        1.
    } else {
        exponent.exp()
    }
}

/// Heat-bath probability of drawing spin up, `exp(beta k) / (exp(beta k) + exp(-beta k))`,
/// evaluated as the logistic function of `2 beta k`.
pub fn heat_bath_up_probability(local_field: f64, beta: f64) -> f64 {
    let x = 2. * beta * local_field;
    if x >= 0. {
        1. / (1. + (-x).exp())
    } else {
        let e = x.exp();
        e / (1. + e)
    }
}

fn metropolis<L: Lattice>(lattice: &L, idx: L::Idx, beta: f64, draw: f64) -> Spin {
    let spin = lattice.spin_at(idx);
    let local_field = lattice.sum_neighbouring_spins(idx) + lattice.field();
    if draw <= metropolis_acceptance(spin.into(), local_field, beta) {
        spin.flipped()
    } else {
        spin
    }
}

fn heat_bath<L: Lattice>(lattice: &L, idx: L::Idx, beta: f64, draw: f64) -> Spin {
    let local_field = lattice.sum_neighbouring_spins(idx) - lattice.field();
    if draw <= heat_bath_up_probability(local_field, beta) {
        Spin::Up
    } else {
        Spin::Down
    }
}

/// Single-spin update rule used by a sweep.
///
/// Metropolis proposes a flip and accepts it with `metropolis_acceptance`. Heat-bath ignores
/// the current spin and redraws it from its conditional distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateRule {
    #[default]
    Metropolis,
    HeatBath,
}

impl UpdateRule {
    pub fn get_update_func<L: Lattice>(&self) -> UpdateFunc<L> {
        match self {
            UpdateRule::Metropolis => metropolis,
            UpdateRule::HeatBath => heat_bath,
        }
    }

    pub fn update<L: Lattice>(&self, lattice: &L, idx: L::Idx, beta: f64, draw: f64) -> Spin {
        (self.get_update_func::<L>())(lattice, idx, beta, draw)
    }

    pub fn name(&self) -> &'static str {
        match self {
            UpdateRule::Metropolis => "metropolis",
            UpdateRule::HeatBath => "heat-bath",
        }
    }
}
