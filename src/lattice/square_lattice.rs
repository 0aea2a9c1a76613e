use crate::error::{IsingError, Result};
use crate::lattice::{InitialState, Lattice, Spin};
use crate::monte_carlo::sweep::TraversalOrder;
use itertools::iproduct;
use rand::{self, seq::SliceRandom};

/// Rectangular `width x height` lattice with periodic boundaries in both directions,
/// nearest neighbour coupling `J = 1` and a uniform external field.
///
/// Sites are addressed as `(x, y)` with `x < width` and `y < height`.
#[derive(Debug, Clone)]
pub struct SquareLattice {
    width: usize,
    height: usize,
    field: f64,
    spins: Vec<Vec<Spin>>,
}

impl SquareLattice {
    pub fn new(width: usize, height: usize, field: f64) -> Result<Self> {
        Self::new_with_spin(width, height, field, Spin::Up)
    }

    pub fn new_with_spin(width: usize, height: usize, field: f64, spin: Spin) -> Result<Self> {
        check_geometry(width, height, field)?;
        Ok(SquareLattice {
            width,
            height,
            field,
            spins: vec![vec![spin; height]; width],
        })
    }

    pub fn new_random<R: rand::Rng + ?Sized>(
        width: usize,
        height: usize,
        field: f64,
        rng: &mut R,
    ) -> Result<Self> {
        check_geometry(width, height, field)?;
        let spins = (0..width)
            .map(|_| (0..height).map(|_| Spin::random(rng)).collect())
            .collect();
        Ok(SquareLattice {
            width,
            height,
            field,
            spins,
        })
    }

    pub fn with_initial_state<R: rand::Rng + ?Sized>(
        width: usize,
        height: usize,
        field: f64,
        initial: InitialState,
        rng: &mut R,
    ) -> Result<Self> {
        match initial {
            InitialState::Random => Self::new_random(width, height, field, rng),
            InitialState::AllUp => Self::new_with_spin(width, height, field, Spin::Up),
            InitialState::AllDown => Self::new_with_spin(width, height, field, Spin::Down),
        }
    }

    /// Build a lattice from explicit spin values, `values[x][y]` in `{-1, +1}`.
    pub fn from_values(values: &[Vec<i8>], field: f64) -> Result<Self> {
        let width = values.len();
        let height = values.first().map_or(0, |column| column.len());
        check_geometry(width, height, field)?;

        let mut spins = Vec::with_capacity(width);
        for column in values {
            if column.len() != height {
                return Err(IsingError::Configuration(String::from(
                    "All lattice columns must have the same length",
                )));
            }
            let converted = column
                .iter()
                .map(|&value| match value {
                    1 => Ok(Spin::Up),
                    -1 => Ok(Spin::Down),
                    other => Err(IsingError::Configuration(format!(
                        "Spin values must be -1 or +1, got {other}"
                    ))),
                })
                .collect::<Result<Vec<Spin>>>()?;
            spins.push(converted);
        }

        Ok(SquareLattice {
            width,
            height,
            field,
            spins,
        })
    }

    /// Map an arbitrary (possibly negative or out of range) coordinate pair back onto the torus.
    pub fn wrap(&self, x: isize, y: isize) -> (usize, usize) {
        (
            x.rem_euclid(self.width as isize) as usize,
            y.rem_euclid(self.height as isize) as usize,
        )
    }

    fn get_all_neighbour_indices(&self, x: usize, y: usize) -> [(usize, usize); 4] {
        let (x, y) = (x as isize, y as isize);
        [
            self.wrap(x - 1, y),
            self.wrap(x, y - 1),
            self.wrap(x + 1, y),
            self.wrap(x, y + 1),
        ]
    }

    pub fn get_all_neighbour_values(&self, x: usize, y: usize) -> [i8; 4] {
        self.get_all_neighbour_indices(x, y)
            .map(|(nx, ny)| self.spins[nx][ny].value())
    }

    pub fn is_state_equal(&self, other: &Self) -> bool {
        self.spins == other.spins
    }

    pub fn flip_all(self) -> Self {
        let mut out_lattice = self;
        for idx in out_lattice.get_all_indices() {
            out_lattice = out_lattice.flip(idx);
        }

        return out_lattice;
    }

    /// Bond energy seen from one site, `-s * (sum of neighbours)`. Summing this over all
    /// sites counts every bond twice.
    fn get_bond_energy_at_site(&self, idx: <Self as Lattice>::Idx) -> f64 {
        -(self.idx_into(idx) as f64) * self.sum_neighbouring_spins(idx)
    }
}

fn check_geometry(width: usize, height: usize, field: f64) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(IsingError::Configuration(format!(
            "Lattice dimensions must be positive, got {width}x{height}"
        )));
    }
    if !field.is_finite() {
        return Err(IsingError::Configuration(format!(
            "External field must be finite, got {field}"
        )));
    }
    Ok(())
}

impl Lattice for SquareLattice {
    type Idx = (usize, usize);

    fn number_sites(&self) -> usize {
        self.width * self.height
    }

    fn field(&self) -> f64 {
        self.field
    }

    fn sum_neighbouring_spins(&self, idx: Self::Idx) -> f64 {
        self.get_all_neighbour_values(idx.0, idx.1)
            .iter()
            .map(|item| *item as f64)
            .sum::<f64>()
    }

    fn spin_at(&self, idx: Self::Idx) -> Spin {
        self.spins[idx.0][idx.1]
    }

    fn set_spin(mut self, idx: Self::Idx, spin: Spin) -> Self {
        self.spins[idx.0][idx.1] = spin;
        self
    }

    fn get_all_indices(&self) -> Vec<Self::Idx> {
        iproduct!(0..self.width, 0..self.height).collect()
    }

    fn sweep_order<R: rand::Rng + ?Sized>(
        &self,
        order: TraversalOrder,
        rng: &mut R,
    ) -> Vec<Self::Idx> {
        match order {
            TraversalOrder::RowColumnShuffle => {
                let mut rows: Vec<usize> = (0..self.width).collect();
                let mut columns: Vec<usize> = (0..self.height).collect();
                rows.shuffle(rng);
                columns.shuffle(rng);
                iproduct!(rows, columns).collect()
            }
            TraversalOrder::RandomSite => {
                let mut indices = self.get_all_indices();
                indices.shuffle(rng);
                indices
            }
        }
    }

    fn get_sum_of_spins(&self) -> i64 {
        self.spins
            .iter()
            .map(|v| v.iter().map(|s| s.value() as i64).sum::<i64>())
            .sum::<i64>()
    }

    fn get_energy(&self) -> f64 {
        let bond_energy = self
            .get_all_indices()
            .into_iter()
            .map(|idx| self.get_bond_energy_at_site(idx))
            .sum::<f64>();
        0.5 * bond_energy + self.field * self.get_sum_of_spins() as f64
    }

    fn describe(&self) -> String {
        format!(
            "{}x{} Periodic Square Lattice With External Field {}",
            self.width, self.height, self.field,
        )
    }
}
