//! Neighbourhoods on a toroidal grid.
//!
//! Cells are numbered row-major. Every function wraps around both edges.

/// Shape of the neighbourhood used by the cellular GA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeighborhoodTopology {
    /// Left and right cells on the flattened ring.
    Ring,
    /// The cell and its N, S, E, W neighbours.
    #[default]
    LinearFive,
    /// Linear five plus the four diagonals.
    CompactNine,
    /// Compact nine plus the cells two steps away N, S, E, W.
    CompactThirteen,
}

/// A `rows × cols` torus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood {
    rows: usize,
    cols: usize,
}

impl Neighborhood {
    /// # Panics
    /// Panics if `rows` or `cols` is zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid dimensions must be positive");
        Self { rows, cols }
    }

    /// Grid holding `n` cells, as square as possible.
    pub fn for_population(n: usize) -> Self {
        let (rows, cols) = grid_shape(n.max(1));
        Self::new(rows, cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell reached from `index` after moving `dr` rows and `dc` columns.
    fn offset(&self, index: usize, dr: isize, dc: isize) -> usize {
        let r = (index / self.cols) as isize;
        let c = (index % self.cols) as isize;
        let nr = (r + dr).rem_euclid(self.rows as isize) as usize;
        let nc = (c + dc).rem_euclid(self.cols as isize) as usize;
        nr * self.cols + nc
    }

    /// `[left, right]` on the flattened ring.
    pub fn ring(&self, index: usize) -> Vec<usize> {
        let n = self.len();
        vec![(index + n - 1) % n, (index + 1) % n]
    }

    /// `[self, N, S, E, W]`.
    pub fn linear_five(&self, index: usize) -> Vec<usize> {
        vec![
            index,
            self.offset(index, -1, 0),
            self.offset(index, 1, 0),
            self.offset(index, 0, 1),
            self.offset(index, 0, -1),
        ]
    }

    /// Linear five followed by `[NW, NE, SW, SE]`.
    pub fn compact_nine(&self, index: usize) -> Vec<usize> {
        let mut cells = self.linear_five(index);
        cells.extend([
            self.offset(index, -1, -1),
            self.offset(index, -1, 1),
            self.offset(index, 1, -1),
            self.offset(index, 1, 1),
        ]);
        cells
    }

    /// Compact nine followed by `[NN, SS, EE, WW]`.
    pub fn compact_thirteen(&self, index: usize) -> Vec<usize> {
        let mut cells = self.compact_nine(index);
        cells.extend([
            self.offset(index, -2, 0),
            self.offset(index, 2, 0),
            self.offset(index, 0, 2),
            self.offset(index, 0, -2),
        ]);
        cells
    }

    pub fn neighbors(&self, topology: NeighborhoodTopology, index: usize) -> Vec<usize> {
        match topology {
            NeighborhoodTopology::Ring => self.ring(index),
            NeighborhoodTopology::LinearFive => self.linear_five(index),
            NeighborhoodTopology::CompactNine => self.compact_nine(index),
            NeighborhoodTopology::CompactThirteen => self.compact_thirteen(index),
        }
    }
}

/// `(rows, cols)` with `rows * cols == n`; `cols` is the largest divisor of
/// `n` not above `√n`.
pub fn grid_shape(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let mut cols = 1;
    let mut d = 1;
    while d * d <= n {
        if n % d == 0 {
            cols = d;
        }
        d += 1;
    }
    (n / cols, cols)
}
