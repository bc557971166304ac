use super::gauss::GaussConfig;
use super::F2Matrix;
use crate::error::{F2Error, Result};

impl F2Matrix {
    /// Compute the rank of the matrix using gaussian elimination
    #[inline]
    pub fn rank(&self) -> usize {
        self.clone().gauss(false).rank
    }

    /// Returns a copy of the matrix in (reduced, if `full_reduce` is set) row echelon form
    pub fn reduced(&self, full_reduce: bool) -> Self {
        let mut m = self.clone();
        m.gauss(full_reduce);
        m
    }

    /// Produces a factorisation `self = m0 * m1`, where `m0.cols() == m1.rows() == self.rank()`
    ///
    /// `m1` is the row echelon form of `self` without its zero rows, so `m0` is injective and `m1`
    /// is surjective.
    pub fn factor(&self) -> (F2Matrix, F2Matrix) {
        // m1 := g * self and m0 := g^-1, so m0 * m1 = self
        let mut m0 = F2Matrix::identity(self.rows);
        let mut m1 = self.clone();
        let rank = m1.gauss_with(&GaussConfig::default(), &mut (), &mut m0).rank;

        // drop the zero rows of m1 and the matching columns of m0
        let m0 = m0.copy_region(0..m0.rows, 0..rank);
        let m1 = m1.copy_region(0..rank, 0..m1.cols);
        (m0, m1)
    }

    /// Computes the inverse, or returns `None` if the matrix is not square or is singular
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_square() {
            return None;
        }
        let mut m = self.clone();
        let mut inv = F2Matrix::identity(self.rows);
        let res = m.gauss_with(
            &GaussConfig::default().with_full_reduce(true),
            &mut inv,
            &mut (),
        );

        (res.rank == self.rows).then_some(inv)
    }

    #[inline]
    pub fn is_invertible(&self) -> bool {
        self.is_square() && self.rank() == self.rows
    }

    /// Finds a column vector `x` with `self * x == b`
    ///
    /// Returns `Ok(None)` if the system has no solution. If it has many, the free coordinates of
    /// the returned solution are 0.
    ///
    /// # Errors
    ///
    /// If `b` is not a column vector with `self.rows()` rows.
    pub fn solve(&self, b: &F2Matrix) -> Result<Option<Self>> {
        if b.rows != self.rows || b.cols != 1 {
            return Err(F2Error::DimensionMismatch {
                op: "solve",
                left: (self.rows, self.cols),
                right: (b.rows, b.cols),
            });
        }

        let mut m = self.clone();
        let mut b1 = b.clone();
        let res = m.gauss_with(
            &GaussConfig::default().with_full_reduce(true),
            &mut b1,
            &mut (),
        );

        // zero rows of the reduced matrix with a non-zero right-hand side have no solution
        if (res.rank..self.rows).any(|i| b1.bit(i, 0)) {
            return Ok(None);
        }

        let mut x = F2Matrix::zeros(self.cols, 1);
        for (i, &p) in res.pivot_cols.iter().enumerate() {
            x.set_bit(p, 0, b1.bit(i, 0));
        }
        Ok(Some(x))
    }

    /// Returns a basis of the nullspace, as one column vector for each non-pivot column
    ///
    /// The vectors are ordered by their non-pivot column. The result is empty if the matrix has
    /// full column rank.
    pub fn nullspace(&self) -> Vec<Self> {
        self.clone().nullspace_in_place()
    }

    /// Same as [`F2Matrix::nullspace`], but leaves `self` in reduced row echelon form instead of
    /// working on a copy
    pub fn nullspace_in_place(&mut self) -> Vec<Self> {
        let res = self.gauss(true);
        let mut is_pivot = vec![false; self.cols];
        for &p in &res.pivot_cols {
            is_pivot[p] = true;
        }

        // each reduced row reads x_p + sum of free x_n = 0, so setting a single free x_n = 1
        // forces exactly the pivots whose rows contain n
        (0..self.cols)
            .filter(|&n| !is_pivot[n])
            .map(|n| {
                let mut v = F2Matrix::zeros(self.cols, 1);
                v.set_bit(n, 0, true);
                for (r, &p) in res.pivot_cols.iter().enumerate() {
                    if self.bit(r, n) {
                        v.set_bit(p, 0, true);
                    }
                }
                v
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn rank_two() -> F2Matrix {
        F2Matrix::from_int_vec(&[vec![1, 1, 0], vec![0, 1, 1], vec![1, 0, 1]]).unwrap()
    }

    #[test]
    fn rank() {
        assert_eq!(rank_two().rank(), 2);
        assert_eq!(F2Matrix::identity(3).rank(), 3);
        assert_eq!(F2Matrix::zeros(4, 7).rank(), 0);

        let mut rng = SmallRng::seed_from_u64(1);
        let m = F2Matrix::random(&mut rng, 30, 90);
        assert_eq!(m.rank(), m.transposed().rank());
    }

    #[test]
    fn rank_leaves_matrix_alone() {
        let m = rank_two();
        let before = m.clone();
        m.rank();
        m.nullspace();
        m.factor();
        assert_eq!(m, before);
    }

    #[test]
    fn factor() {
        let mut rng = SmallRng::seed_from_u64(2);
        for (rows, cols) in [(10, 10), (30, 12), (12, 30), (70, 70)] {
            // product of two thin matrices, so the rank is at most 5
            let m = &F2Matrix::random(&mut rng, rows, 5) * &F2Matrix::random(&mut rng, 5, cols);
            let (m0, m1) = m.factor();
            let rank = m.rank();
            assert_eq!(m0.cols(), rank);
            assert_eq!(m1.rows(), rank);
            assert_eq!(&m0 * &m1, m);
            for i in 0..m1.rows() {
                assert!(m1.row_weight(i) > 0, "row {i} of m1 is zero");
            }
        }

        let (m0, m1) = F2Matrix::zeros(3, 4).factor();
        assert_eq!((m0.rows(), m0.cols()), (3, 0));
        assert_eq!((m1.rows(), m1.cols()), (0, 4));
        assert_eq!(&m0 * &m1, F2Matrix::zeros(3, 4));
    }

    #[test]
    fn matrix_inv() {
        let mut rng = SmallRng::seed_from_u64(1);
        let sz = 100;
        let m = F2Matrix::random_invertible(&mut rng, sz);
        let n = m.inverse().unwrap();
        let id = F2Matrix::identity(sz);

        assert_eq!(&m * &n, id);
        assert_eq!(&n * &m, id);
        assert!(m.is_invertible());
    }

    #[test]
    fn identity_inverse() {
        let id = F2Matrix::identity(3);
        assert_eq!(id.inverse(), Some(id.clone()));
        assert!(id.nullspace().is_empty());
        assert_eq!(F2Matrix::identity(0).inverse(), Some(F2Matrix::identity(0)));
    }

    #[test]
    fn no_inverse() {
        assert_eq!(rank_two().inverse(), None);
        assert!(!rank_two().is_invertible());
        assert_eq!(F2Matrix::identity(3).submatrix(0..2, ..).unwrap().inverse(), None);
    }

    #[test]
    fn solve() {
        let m = F2Matrix::from_int_vec(&[vec![1, 0], vec![1, 0]]).unwrap();

        let b = F2Matrix::from_int_vec(&[vec![1], vec![1]]).unwrap();
        let x = m.solve(&b).unwrap().unwrap();
        assert_eq!(x, F2Matrix::from_int_vec(&[vec![1], vec![0]]).unwrap());

        let b = F2Matrix::from_int_vec(&[vec![1], vec![0]]).unwrap();
        assert_eq!(m.solve(&b), Ok(None));
    }

    #[test]
    fn solve_random() {
        let mut rng = SmallRng::seed_from_u64(3);
        for (rows, cols) in [(20, 20), (40, 25), (25, 40)] {
            let m = F2Matrix::random(&mut rng, rows, cols);
            let x0 = F2Matrix::random(&mut rng, cols, 1);
            let b = &m * &x0;
            let x = m.solve(&b).unwrap().unwrap();
            assert_eq!(&m * &x, b);
            if m.rank() == cols {
                assert_eq!(x, x0);
            }
        }
    }

    #[test]
    fn solve_dimension_mismatch() {
        let m = rank_two();
        assert!(matches!(
            m.solve(&F2Matrix::zeros(2, 1)),
            Err(F2Error::DimensionMismatch { op: "solve", .. })
        ));
        assert!(m.solve(&F2Matrix::zeros(3, 2)).is_err());
    }

    #[test]
    fn nullspace() {
        let m = rank_two();
        let ns = m.nullspace();
        assert_eq!(ns.len(), 1);
        assert!((&m * &ns[0]).is_zero());
        assert_eq!(ns[0], F2Matrix::from_int_vec(&[vec![1], vec![1], vec![1]]).unwrap());

        let mut rng = SmallRng::seed_from_u64(4);
        let m = &F2Matrix::random(&mut rng, 30, 10) * &F2Matrix::random(&mut rng, 10, 80);
        let ns = m.nullspace();
        assert_eq!(ns.len(), m.cols() - m.rank());
        for v in &ns {
            assert_eq!((v.rows(), v.cols()), (80, 1));
            assert!((&m * v).is_zero());
        }
        // the free columns make the basis vectors independent
        let mut basis = F2Matrix::zeros(80, ns.len());
        for (j, v) in ns.iter().enumerate() {
            basis.set_submatrix(.., j..j + 1, v).unwrap();
        }
        assert_eq!(basis.rank(), ns.len());
    }

    #[test]
    fn nullspace_in_place() {
        let mut m = rank_two();
        let ns = m.nullspace_in_place();
        assert_eq!(ns, rank_two().nullspace());
        assert_eq!(m, rank_two().reduced(true));
    }
}
