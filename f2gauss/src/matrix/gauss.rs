use super::F2Matrix;
use crate::accumulator::Accumulator;
use crate::bitvec::{BitSlice, BLOCKSIZE};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;
use tracing::{debug, trace};

/// Default width of the column blocks scanned for duplicate rows
pub const DEFAULT_BLOCKSIZE: usize = 6;

/// How the elimination engine treats duplicate rows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Before pivoting in each column block, cancel rows that agree on that block
    ///
    /// This is the optimisation from K. Patel, I. Markov, J. Hayes. Optimal Synthesis of Linear
    /// Reversible Circuits. QIC 2008. It changes the sequence of row operations, but never the
    /// rank or the reduced form.
    #[default]
    BlockDedup,

    /// Textbook Gaussian elimination, one column at a time
    Plain,
}

/// Configuration of a single elimination run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GaussConfig {
    /// Also clear every pivot column above its pivot, giving reduced row echelon form
    pub full_reduce: bool,

    /// Width of the column blocks used by [`Strategy::BlockDedup`]. A blocksize of 0 is treated
    /// as 1. A blocksize equal to the number of columns removes duplicate rows up front.
    pub blocksize: usize,

    /// Whether duplicate rows are cancelled block by block or plain elimination is used
    pub strategy: Strategy,
}

impl Default for GaussConfig {
    fn default() -> Self {
        GaussConfig {
            full_reduce: false,
            blocksize: DEFAULT_BLOCKSIZE,
            strategy: Strategy::BlockDedup,
        }
    }
}

impl GaussConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_full_reduce(mut self, full_reduce: bool) -> Self {
        self.full_reduce = full_reduce;
        self
    }

    pub fn with_blocksize(mut self, blocksize: usize) -> Self {
        self.blocksize = blocksize;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// The outcome of an elimination run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GaussResult {
    /// Number of non-zero rows in the echelon form
    pub rank: usize,

    /// The pivot column of each non-zero row, in order of discovery (which is also row order)
    pub pivot_cols: Vec<usize>,
}

/// The matrix being reduced together with its two companions, which mirror every row addition
struct Eliminator<'a, X, Y> {
    m: &'a mut F2Matrix,
    x: &'a mut X,
    y: &'a mut Y,
    row_adds: usize,
}

impl<X: Accumulator, Y: Accumulator> Eliminator<'_, X, Y> {
    /// Adds row `from` into row `to` of the matrix, so `x` gets the same row operation and `y`
    /// gets the column operation of the inverse, with source and target swapped
    #[inline]
    fn add_row(&mut self, from: usize, to: usize) {
        self.m.row_add(from, to);
        self.x.row_add(from, to);
        self.y.col_add(to, from);
        self.row_adds += 1;
    }

    /// Cancels every row (taken in the order given by `rows`) that agrees with an earlier one on
    /// the columns `i0..i1`, by adding the earlier row into it
    fn dedupe_block(&mut self, rows: impl Iterator<Item = usize>, i0: usize, i1: usize) {
        if i1 - i0 <= BLOCKSIZE {
            self.dedupe_by(rows, i0, |row| {
                let key = row.bits_u64(i0, i1);
                (key != 0).then_some(key)
            });
        } else {
            self.dedupe_by(rows, i0, |row| {
                let key = row.extract_bits(i0, i1);
                (!key.is_zero()).then_some(key)
            });
        }
    }

    fn dedupe_by<K: Hash + Eq>(
        &mut self,
        rows: impl Iterator<Item = usize>,
        i0: usize,
        key: impl Fn(&BitSlice) -> Option<K>,
    ) {
        let mut chunks: FxHashMap<K, usize> = FxHashMap::default();
        for r in rows {
            let Some(k) = key(self.m.row(r)) else {
                continue;
            };
            match chunks.entry(k) {
                Entry::Occupied(e) => {
                    let first = *e.get();
                    trace!(block = i0, first, duplicate = r, "cancelling duplicate row");
                    self.add_row(first, r);
                }
                Entry::Vacant(e) => {
                    e.insert(r);
                }
            }
        }
    }

    /// Reduces to row echelon form, returning the pivot columns
    fn forward(&mut self, blocksize: usize, dedupe: bool) -> Vec<usize> {
        let rows = self.m.rows();
        let cols = self.m.cols();
        let mut pivot_cols = vec![];
        let mut pivot_row = 0;

        for i0 in (0..cols).step_by(blocksize) {
            if pivot_row == rows {
                break;
            }
            let i1 = usize::min(cols, i0 + blocksize);

            // a single column has nothing to deduplicate beyond what pivoting does anyway
            if dedupe && i1 - i0 > 1 {
                self.dedupe_block(pivot_row..rows, i0, i1);
            }

            for p in i0..i1 {
                if pivot_row == rows {
                    break;
                }
                let Some(r0) = (pivot_row..rows).find(|&r| self.m.bit(r, p)) else {
                    continue;
                };

                // rows between pivot_row and r0 are 0 in column p, so adding puts a 1 there
                if r0 != pivot_row {
                    self.add_row(r0, pivot_row);
                }

                for r1 in (pivot_row + 1)..rows {
                    if self.m.bit(r1, p) {
                        self.add_row(pivot_row, r1);
                    }
                }

                pivot_cols.push(p);
                pivot_row += 1;
            }
        }

        pivot_cols
    }

    /// Clears every pivot column above its pivot, working from the right-most block
    fn backward(&mut self, pivot_cols: &[usize], blocksize: usize, dedupe: bool) {
        let cols = self.m.cols();
        let num_blocks = cols.div_ceil(blocksize);

        // pivots not processed yet; the next pivot row to process is `remaining - 1`
        let mut remaining = pivot_cols.len();

        for sec in (0..num_blocks).rev() {
            if remaining == 0 {
                break;
            }
            let i0 = sec * blocksize;
            let i1 = usize::min(cols, i0 + blocksize);

            if dedupe && i1 - i0 > 1 {
                self.dedupe_block((0..remaining).rev(), i0, i1);
            }

            while remaining > 0 && (i0..i1).contains(&pivot_cols[remaining - 1]) {
                let pivot_row = remaining - 1;
                let pcol = pivot_cols[pivot_row];
                for r in 0..pivot_row {
                    if self.m.bit(r, pcol) {
                        self.add_row(pivot_row, r);
                    }
                }
                remaining -= 1;
            }
        }
    }
}

impl F2Matrix {
    /// Performs Gaussian elimination in place with the default configuration
    ///
    /// If `full_reduce` is true, computes reduced row echelon form, otherwise just row echelon
    /// form.
    #[inline]
    pub fn gauss(&mut self, full_reduce: bool) -> GaussResult {
        let config = GaussConfig::default().with_full_reduce(full_reduce);
        self.gauss_with(&config, &mut (), &mut ())
    }

    /// Performs Gaussian elimination in place, mirroring every row operation on two companions
    ///
    /// Suppose the elimination computes `g * m = m'`. Then `x` is transformed to `g * x` and `y`
    /// to `y * g^-1`. So `x` must have as many rows as `self`, and `y` as many columns as `self`
    /// has rows. Pass `&mut ()` for a companion that is not needed.
    pub fn gauss_with(
        &mut self,
        config: &GaussConfig,
        x: &mut impl Accumulator,
        y: &mut impl Accumulator,
    ) -> GaussResult {
        let blocksize = config.blocksize.max(1);
        let dedupe = config.strategy == Strategy::BlockDedup;

        let mut elim = Eliminator {
            m: self,
            x,
            y,
            row_adds: 0,
        };
        let pivot_cols = elim.forward(blocksize, dedupe);
        if config.full_reduce {
            elim.backward(&pivot_cols, blocksize, dedupe);
        }

        debug!(
            rows = elim.m.rows(),
            cols = elim.m.cols(),
            blocksize,
            strategy = ?config.strategy,
            full_reduce = config.full_reduce,
            rank = pivot_cols.len(),
            row_adds = elim.row_adds,
            "gaussian elimination finished"
        );

        GaussResult {
            rank: pivot_cols.len(),
            pivot_cols,
        }
    }
}
