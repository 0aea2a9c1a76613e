use crate::monte_carlo::sweep::TraversalOrder;
use rand;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

pub mod square_lattice;

/// A single Ising spin, `+1` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    Up,
    Down,
}

impl Spin {
    pub fn value(self) -> i8 {
        match self {
            Spin::Up => 1,
            Spin::Down => -1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Spin::Up => Spin::Down,
            Spin::Down => Spin::Up,
        }
    }

    /// Draw a spin that is up or down with probability 1/2 each.
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Spin::Up
        } else {
            Spin::Down
        }
    }
}

impl From<Spin> for f64 {
    fn from(spin: Spin) -> Self {
        spin.value() as f64
    }
}

/// How the spins of a freshly built lattice are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialState {
    #[default]
    Random,
    AllUp,
    AllDown,
}

pub trait Lattice {
    type Idx: Copy + PartialEq + Eq + Hash + Debug;

    fn number_sites(&self) -> usize;

    /// Uniform external field `h`.
    fn field(&self) -> f64;

    fn sum_neighbouring_spins(&self, idx: Self::Idx) -> f64;

    fn spin_at(&self, idx: Self::Idx) -> Spin;

    fn idx_into(&self, idx: Self::Idx) -> i8 {
        self.spin_at(idx).value()
    }

    fn set_spin(self, idx: Self::Idx, spin: Spin) -> Self;

    fn flip(self, idx: Self::Idx) -> Self
    where
        Self: Sized,
    {
        let flipped = self.spin_at(idx).flipped();
        self.set_spin(idx, flipped)
    }

    fn get_all_indices(&self) -> Vec<Self::Idx>;

    /// All indices exactly once, in the order one sweep visits them.
    fn sweep_order<R: rand::Rng + ?Sized>(
        &self,
        order: TraversalOrder,
        rng: &mut R,
    ) -> Vec<Self::Idx>;

    fn get_sum_of_spins(&self) -> i64;

    /// Total magnetisation, ie the plain sum of all spins.
    fn get_magnetisation(&self) -> f64 {
        self.get_sum_of_spins() as f64
    }

    fn get_energy(&self) -> f64;

    fn describe(&self) -> String {
        String::from("Unknown lattice")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn spin_values_and_flips() {
        assert_eq!(Spin::Up.value(), 1);
        assert_eq!(Spin::Down.value(), -1);
        assert_eq!(Spin::Up.flipped(), Spin::Down);
        assert_eq!(Spin::Down.flipped().flipped(), Spin::Down);
        assert_eq!(f64::from(Spin::Down), -1.);
    }

    #[test]
    fn random_spins_hit_both_states() {
        let mut rng = SmallRng::seed_from_u64(3);
        let draws: Vec<Spin> = (0..200).map(|_| Spin::random(&mut rng)).collect();

        assert!(draws.contains(&Spin::Up));
        assert!(draws.contains(&Spin::Down));
    }
}
