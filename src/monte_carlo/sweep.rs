use super::update_rule::{UpdateFunc, UpdateRule};
use crate::lattice::Lattice;
use rand;
use serde::{Deserialize, Serialize};

/// Order in which one sweep visits the lattice sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// Independent random permutations of the row and of the column indices, visited as their
    /// nested cartesian product. Every site is hit once, but not in a uniformly random order.
    #[default]
    RowColumnShuffle,
    /// One uniformly random permutation of all sites.
    RandomSite,
}

/// One sweep: every site is updated exactly once, sequentially, so later sites already see
/// the new values of neighbours visited earlier in the same sweep.
pub fn sweep<L: Lattice, R: rand::Rng + ?Sized>(
    current_lattice: L,
    beta: f64,
    update_rule: UpdateRule,
    order: TraversalOrder,
    rng: &mut R,
) -> L {
    sweep_with(
        current_lattice,
        beta,
        update_rule.get_update_func::<L>(),
        order,
        rng,
    )
}

fn sweep_with<L: Lattice, R: rand::Rng + ?Sized>(
    current_lattice: L,
    beta: f64,
    update_func: UpdateFunc<L>,
    order: TraversalOrder,
    rng: &mut R,
) -> L {
    let mut current_lattice = current_lattice;
    for idx in current_lattice.sweep_order(order, rng) {
        let draw: f64 = rng.random();
        let new_spin = update_func(&current_lattice, idx, beta, draw);
        current_lattice = current_lattice.set_spin(idx, new_spin);
    }
    return current_lattice;
}
