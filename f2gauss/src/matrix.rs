pub mod derived;
pub mod gauss;

use crate::accumulator::Accumulator;
use crate::bitvec::*;
use crate::error::{Axis, F2Error, Result};
use rand::Rng;
use std::{
    fmt,
    ops::{Add, Bound, Index, Mul, Range, RangeBounds},
};

/// A dense matrix over the 2-element field
///
/// The matrix is stored in row-major order. Each row occupies `col_blocks` consecutive
/// [`BitBlock`]s of `data`, so row operations are word-wise XORs. If the number of columns is not
/// a multiple of [`BLOCKSIZE`], the last block of each row is padded with 0s, and every operation
/// keeps those padding bits at 0.
///
/// The shape is fixed at construction: rows and columns can be rewritten, swapped and permuted,
/// but never inserted or removed.
#[derive(Clone, Debug)]
pub struct F2Matrix {
    /// the number of logical rows in the matrix
    rows: usize,

    /// the number of logical columns in the matrix
    cols: usize,

    /// the number of [`BitBlock`]s used to store each row
    col_blocks: usize,

    /// exactly `rows * col_blocks` blocks, in row-major order
    data: BitVec,
}

impl F2Matrix {
    /// Gets the bit at position `(i, j)`
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of range; use [`F2Matrix::get`] for a checked read.
    #[inline]
    pub fn bit(&self, i: usize, j: usize) -> bool {
        assert!(j < self.cols, "column {j} out of range");
        self.row(i).bit(j)
    }

    /// Sets the bit at position `(i, j)` to `b`
    ///
    /// # Panics
    ///
    /// Same conditions as [`F2Matrix::bit`].
    #[inline]
    pub fn set_bit(&mut self, i: usize, j: usize, b: bool) {
        assert!(j < self.cols, "column {j} out of range");
        self.row_mut(i).set_bit(j, b);
    }

    /// Checked read of the bit at position `(i, j)`
    pub fn get(&self, i: usize, j: usize) -> Result<bool> {
        self.check_row(i)?;
        self.check_col(j)?;
        Ok(self.bit(i, j))
    }

    /// Checked write of the bit at position `(i, j)`
    pub fn set(&mut self, i: usize, j: usize, b: bool) -> Result<()> {
        self.check_row(i)?;
        self.check_col(j)?;
        self.set_bit(i, j, b);
        Ok(())
    }

    /// Builds a matrix from a function `f` giving the value of each bit
    pub fn build(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut m = Self::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                if f(i, j) {
                    m.set_bit(i, j, true);
                }
            }
        }
        m
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        let col_blocks = min_blocks(cols);
        F2Matrix {
            rows,
            cols,
            col_blocks,
            data: BitVec::zeros(rows * col_blocks),
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut m = Self::zeros(size, size);
        for i in 0..size {
            m.set_bit(i, i, true);
        }
        m
    }

    /// A `dim x 1` column vector with a single 1 in row `index`
    pub fn unit_vector(dim: usize, index: usize) -> Result<Self> {
        if index >= dim {
            return Err(F2Error::IndexOutOfRange {
                axis: Axis::Row,
                index,
                len: dim,
            });
        }
        let mut v = Self::zeros(dim, 1);
        v.set_bit(index, 0, true);
        Ok(v)
    }

    /// Creates a matrix from a vector of rows
    ///
    /// All rows must have the same length, otherwise a [`F2Error::DimensionMismatch`] comparing
    /// the offending row with the first one, both as `1 x len` shapes, is returned. An empty input
    /// gives a `0 x 0` matrix.
    pub fn from_bool_vec(data: &[Vec<bool>]) -> Result<Self> {
        let cols = Self::uniform_row_len(data.iter().map(Vec::len))?;
        Ok(Self::build(data.len(), cols, |i, j| data[i][j]))
    }

    /// Creates a matrix from a vector of rows of integers, treating any non-zero entry as 1
    pub fn from_int_vec(data: &[Vec<u8>]) -> Result<Self> {
        let cols = Self::uniform_row_len(data.iter().map(Vec::len))?;
        Ok(Self::build(data.len(), cols, |i, j| data[i][j] != 0))
    }

    fn uniform_row_len(mut lens: impl Iterator<Item = usize>) -> Result<usize> {
        let Some(cols) = lens.next() else {
            return Ok(0);
        };
        for len in lens {
            if len != cols {
                return Err(F2Error::DimensionMismatch {
                    op: "construct",
                    left: (1, len),
                    right: (1, cols),
                });
            }
        }
        Ok(cols)
    }

    pub fn random(rng: &mut impl Rng, rows: usize, cols: usize) -> Self {
        let mut m = Self::zeros(rows, cols);
        if m.col_blocks == 0 {
            return m;
        }
        let mask = leading_mask(cols - (m.col_blocks - 1) * BLOCKSIZE);
        for (k, block) in m.data.block_iter_mut().enumerate() {
            *block = rng.random::<BitBlock>();
            if k % m.col_blocks == m.col_blocks - 1 {
                *block &= mask;
            }
        }
        m
    }

    /// A random invertible matrix, built by applying random row additions to the identity
    pub fn random_invertible(rng: &mut impl Rng, size: usize) -> Self {
        let mut m = Self::identity(size);
        if size < 2 {
            return m;
        }

        for _ in 0..10 * size * size {
            let r1 = rng.random_range(0..size);
            let mut r2 = rng.random_range(0..size - 1);
            if r2 >= r1 {
                r2 += 1;
            }
            m.row_add(r1, r2);
        }

        m
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.data.is_zero()
    }

    /// Number of 1s in the given row
    #[inline]
    pub fn row_weight(&self, row: usize) -> usize {
        self.row(row).count_ones() as usize
    }

    #[inline]
    pub fn row(&self, row: usize) -> &BitSlice {
        &self.data[row * self.col_blocks..(row + 1) * self.col_blocks]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut BitSlice {
        &mut self.data[row * self.col_blocks..(row + 1) * self.col_blocks]
    }

    /// XORs `bits` into the given row. `bits` must have the same number of blocks as a row.
    #[inline]
    pub fn add_bits_to_row(&mut self, bits: &BitSlice, row: usize) {
        *self.row_mut(row) ^= bits;
    }

    fn check_row(&self, i: usize) -> Result<()> {
        if i < self.rows {
            Ok(())
        } else {
            Err(F2Error::IndexOutOfRange {
                axis: Axis::Row,
                index: i,
                len: self.rows,
            })
        }
    }

    fn check_col(&self, j: usize) -> Result<()> {
        if j < self.cols {
            Ok(())
        } else {
            Err(F2Error::IndexOutOfRange {
                axis: Axis::Col,
                index: j,
                len: self.cols,
            })
        }
    }

    /// Adds row `from` into row `to`
    ///
    /// # Panics
    ///
    /// Panics if either row is out of range.
    #[inline]
    pub fn row_add(&mut self, from: usize, to: usize) {
        assert!(from < self.rows && to < self.rows, "row out of range");
        self.data.xor_range(
            from * self.col_blocks,
            to * self.col_blocks,
            self.col_blocks,
        );
    }

    /// Adds column `from` into column `to`
    ///
    /// # Panics
    ///
    /// Panics if either column is out of range.
    pub fn col_add(&mut self, from: usize, to: usize) {
        assert!(from < self.cols && to < self.cols, "column out of range");
        let (from_block, from_mask) = (from / BLOCKSIZE, MSB_ON >> (from % BLOCKSIZE));
        let (to_block, to_mask) = (to / BLOCKSIZE, MSB_ON >> (to % BLOCKSIZE));
        for base in (0..self.data.len()).step_by(self.col_blocks) {
            if self.data[base + from_block] & from_mask != 0 {
                self.data[base + to_block] ^= to_mask;
            }
        }
    }

    /// # Panics
    ///
    /// Panics if either row is out of range.
    #[inline]
    pub fn row_swap(&mut self, r0: usize, r1: usize) {
        assert!(r0 < self.rows && r1 < self.rows, "row out of range");
        if r0 != r1 {
            self.data.swap_range(
                r0 * self.col_blocks,
                r1 * self.col_blocks,
                self.col_blocks,
            );
        }
    }

    /// # Panics
    ///
    /// Panics if either column is out of range.
    pub fn col_swap(&mut self, c0: usize, c1: usize) {
        assert!(c0 < self.cols && c1 < self.cols, "column out of range");
        for i in 0..self.rows {
            let row = self.row_mut(i);
            if row.bit(c0) != row.bit(c1) {
                row.flip_bit(c0);
                row.flip_bit(c1);
            }
        }
    }

    /// Permutes the rows, so that row `i` of the result is row `p[i]` of the original
    ///
    /// `p` must be a permutation of `0..rows()`, otherwise [`F2Error::InvalidPermutation`] is
    /// returned and the matrix is left unchanged.
    pub fn permute_rows(&mut self, p: &[usize]) -> Result<()> {
        check_permutation(p, self.rows)?;
        let mut data = Vec::with_capacity(self.data.len());
        for &i in p {
            data.extend(self.row(i).block_iter());
        }
        self.data = data.into();
        Ok(())
    }

    /// Permutes the columns, so that column `j` of the result is column `p[j]` of the original
    ///
    /// `p` must be a permutation of `0..cols()`, otherwise [`F2Error::InvalidPermutation`] is
    /// returned and the matrix is left unchanged.
    pub fn permute_cols(&mut self, p: &[usize]) -> Result<()> {
        check_permutation(p, self.cols)?;
        *self = Self::build(self.rows, self.cols, |i, j| self.bit(i, p[j]));
        Ok(())
    }

    /// Returns a copy of the sub-matrix addressed by a range of rows and a range of columns
    pub fn submatrix(
        &self,
        rows: impl RangeBounds<usize>,
        cols: impl RangeBounds<usize>,
    ) -> Result<Self> {
        let rows = resolve_range(rows, self.rows, Axis::Row)?;
        let cols = resolve_range(cols, self.cols, Axis::Col)?;
        Ok(self.copy_region(rows, cols))
    }

    /// Copies out a region already known to lie within the matrix
    fn copy_region(&self, rows: Range<usize>, cols: Range<usize>) -> Self {
        let mut m = Self::zeros(rows.len(), cols.len());
        for (i, r) in rows.enumerate() {
            let bits = self.row(r).extract_bits(cols.start, cols.end);
            m.add_bits_to_row(&bits, i);
        }
        m
    }

    /// Overwrites the sub-matrix addressed by a range of rows and a range of columns with `source`
    ///
    /// The shape of `source` must match the addressed region exactly.
    pub fn set_submatrix(
        &mut self,
        rows: impl RangeBounds<usize>,
        cols: impl RangeBounds<usize>,
        source: &F2Matrix,
    ) -> Result<()> {
        let rows = resolve_range(rows, self.rows, Axis::Row)?;
        let cols = resolve_range(cols, self.cols, Axis::Col)?;
        if (rows.len(), cols.len()) != (source.rows, source.cols) {
            return Err(F2Error::DimensionMismatch {
                op: "set_submatrix",
                left: (rows.len(), cols.len()),
                right: (source.rows, source.cols),
            });
        }
        for (i, r) in rows.enumerate() {
            for (j, c) in cols.clone().enumerate() {
                self.set_bit(r, c, source.bit(i, j));
            }
        }
        Ok(())
    }

    /// Returns a transposed copy of the matrix
    ///
    /// Works one `BLOCKSIZE x BLOCKSIZE` tile at a time, transposing each tile in registers by
    /// recursively swapping off-diagonal quadrants of half the size.
    pub fn transposed(&self) -> Self {
        let mut dest = Self::zeros(self.cols, self.rows);
        let mut buffer: [BitBlock; BLOCKSIZE] = [0; BLOCKSIZE];
        for i in 0..dest.col_blocks {
            for j in 0..self.col_blocks {
                for k in 0..BLOCKSIZE {
                    let r = i * BLOCKSIZE + k;
                    buffer[k] = if r < self.rows {
                        self.data[r * self.col_blocks + j]
                    } else {
                        0
                    };
                }

                transpose_tile(&mut buffer);

                for k in 0..BLOCKSIZE {
                    let r = j * BLOCKSIZE + k;
                    if r < dest.rows {
                        dest.data[r * dest.col_blocks + i] = buffer[k];
                    }
                }
            }
        }
        dest
    }

    /// Matrix product, failing unless `self.cols() == rhs.rows()`
    pub fn try_mul(&self, rhs: &F2Matrix) -> Result<F2Matrix> {
        if self.cols != rhs.rows {
            return Err(F2Error::DimensionMismatch {
                op: "multiply",
                left: (self.rows, self.cols),
                right: (rhs.rows, rhs.cols),
            });
        }
        let mut res = F2Matrix::zeros(self.rows, rhs.cols);

        for i in 0..self.rows {
            let row = res.row_mut(i);
            self.row(i)
                .iter()
                .take(self.cols)
                .enumerate()
                .for_each(|(j, b)| {
                    if b {
                        *row ^= rhs.row(j);
                    }
                });
        }

        Ok(res)
    }

    /// Elementwise sum, failing unless both matrices have the same shape
    pub fn try_add(&self, rhs: &F2Matrix) -> Result<F2Matrix> {
        if (self.rows, self.cols) != (rhs.rows, rhs.cols) {
            return Err(F2Error::DimensionMismatch {
                op: "add",
                left: (self.rows, self.cols),
                right: (rhs.rows, rhs.cols),
            });
        }
        let mut res = self.clone();
        *res.data ^= rhs.data.as_bit_slice();
        Ok(res)
    }
}

/// Transposes a square tile of bits held as one block per row
fn transpose_tile(buffer: &mut [BitBlock; BLOCKSIZE]) {
    let mut swap_width = BLOCKSIZE;
    let mut swap_mask0 = BitBlock::MAX;
    while swap_width != 1 {
        swap_width >>= 1;

        // masks picking the left and right half of each run of 2 * swap_width bits
        swap_mask0 ^= swap_mask0 >> swap_width;
        let swap_mask1 = BitBlock::MAX ^ swap_mask0;

        for block_row in (0..BLOCKSIZE).step_by(swap_width * 2) {
            for row in block_row..block_row + swap_width {
                let b0 = buffer[row];
                let b1 = buffer[row + swap_width];
                buffer[row] = (b0 & swap_mask0) | ((b1 & swap_mask0) >> swap_width);
                buffer[row + swap_width] = (b1 & swap_mask1) | ((b0 & swap_mask1) << swap_width);
            }
        }
    }
}

fn check_permutation(p: &[usize], n: usize) -> Result<()> {
    let invalid = F2Error::InvalidPermutation {
        len: p.len(),
        expected: n,
    };
    if p.len() != n {
        return Err(invalid);
    }
    let mut seen = vec![false; n];
    for &i in p {
        if i >= n || seen[i] {
            return Err(invalid);
        }
        seen[i] = true;
    }
    Ok(())
}

/// Turns any range into a half-open range, checking it lies within `0..len`
fn resolve_range(range: impl RangeBounds<usize>, len: usize, axis: Axis) -> Result<Range<usize>> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    if end > len {
        return Err(F2Error::IndexOutOfRange {
            axis,
            index: end - 1,
            len,
        });
    }
    if start > end {
        return Err(F2Error::IndexOutOfRange {
            axis,
            index: start,
            len,
        });
    }
    Ok(start..end)
}

/// Two matrices are equal if they have the same shape and the same entries
impl PartialEq for F2Matrix {
    fn eq(&self, other: &Self) -> bool {
        // padding bits are always 0, so equal shapes can be compared block by block
        self.rows == other.rows && self.cols == other.cols && self.data == other.data
    }
}

impl Eq for F2Matrix {}

/// A matrix used as a companion simply performs the operations on itself
impl Accumulator for F2Matrix {
    #[inline]
    fn row_add(&mut self, from: usize, to: usize) {
        F2Matrix::row_add(self, from, to);
    }

    #[inline]
    fn col_add(&mut self, from: usize, to: usize) {
        F2Matrix::col_add(self, from, to);
    }
}

/// `matrix[(i, j)]` is equivalent to `matrix.bit(i, j)`
impl Index<(usize, usize)> for F2Matrix {
    type Output = bool;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        if self.bit(index.0, index.1) {
            &true
        } else {
            &false
        }
    }
}

impl fmt::Display for F2Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            for j in 0..self.cols {
                write!(f, " {} ", if self[(i, j)] { 1 } else { 0 })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// # Panics
///
/// Panics if `self.cols() != rhs.rows()`. Use [`F2Matrix::try_mul`] for a checked product.
impl Mul for &F2Matrix {
    type Output = F2Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        match self.try_mul(rhs) {
            Ok(m) => m,
            Err(e) => panic!("Cannot multiply matrices: {e}"),
        }
    }
}

/// # Panics
///
/// Panics if the shapes differ. Use [`F2Matrix::try_add`] for a checked sum.
impl Add for &F2Matrix {
    type Output = F2Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        match self.try_add(rhs) {
            Ok(m) => m,
            Err(e) => panic!("Cannot add matrices: {e}"),
        }
    }
}
