/// Receives the elementary operations performed during Gaussian elimination
///
/// Suppose elimination computes `g * m = m'`. A value passed as the `x` companion receives the
/// same row additions as `m`, so it ends up as `g * x`. A value passed as the `y` companion
/// receives column additions with source and target swapped, so it ends up as `y * g^-1`.
///
/// Companions need not be matrices: anything that can record or replay the two operations can
/// be used, e.g. to synthesise a CNOT circuit from the row operations.
pub trait Accumulator {
    /// Add row `from` into row `to`
    fn row_add(&mut self, from: usize, to: usize);

    /// Add column `from` into column `to`
    fn col_add(&mut self, from: usize, to: usize);
}

/// The empty companion, which ignores every operation
impl Accumulator for () {
    #[inline]
    fn row_add(&mut self, _: usize, _: usize) {}

    #[inline]
    fn col_add(&mut self, _: usize, _: usize) {}
}

impl<A: Accumulator + ?Sized> Accumulator for &mut A {
    #[inline]
    fn row_add(&mut self, from: usize, to: usize) {
        (**self).row_add(from, to);
    }

    #[inline]
    fn col_add(&mut self, from: usize, to: usize) {
        (**self).col_add(from, to);
    }
}

/// Counts elementary operations, e.g. to compare elimination strategies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpCounter {
    pub row_adds: usize,
    pub col_adds: usize,
}

impl OpCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.row_adds + self.col_adds
    }
}

impl Accumulator for OpCounter {
    #[inline]
    fn row_add(&mut self, _: usize, _: usize) {
        self.row_adds += 1;
    }

    #[inline]
    fn col_add(&mut self, _: usize, _: usize) {
        self.col_adds += 1;
    }
}

/// A single recorded elementary operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementaryOp {
    RowAdd { from: usize, to: usize },
    ColAdd { from: usize, to: usize },
}

/// Records elementary operations in the order they were performed
///
/// Used as the `x` companion, the recorded row additions are exactly the CNOT gates
/// `(control = from, target = to)` implementing the elimination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpLog {
    ops: Vec<ElementaryOp>,
}

impl OpLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn ops(&self) -> &[ElementaryOp] {
        &self.ops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The recorded row additions as `(from, to)` pairs
    pub fn row_ops(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.ops.iter().filter_map(|op| match *op {
            ElementaryOp::RowAdd { from, to } => Some((from, to)),
            ElementaryOp::ColAdd { .. } => None,
        })
    }

    /// Performs the recorded operations, in order, on `target`
    pub fn replay(&self, target: &mut impl Accumulator) {
        for op in &self.ops {
            match *op {
                ElementaryOp::RowAdd { from, to } => target.row_add(from, to),
                ElementaryOp::ColAdd { from, to } => target.col_add(from, to),
            }
        }
    }
}

impl Accumulator for OpLog {
    #[inline]
    fn row_add(&mut self, from: usize, to: usize) {
        self.ops.push(ElementaryOp::RowAdd { from, to });
    }

    #[inline]
    fn col_add(&mut self, from: usize, to: usize) {
        self.ops.push(ElementaryOp::ColAdd { from, to });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counter_counts() {
        fn record(mut acc: impl Accumulator) {
            acc.row_add(0, 1);
            acc.row_add(1, 0);
            acc.col_add(2, 3);
        }

        let mut c = OpCounter::new();
        record(&mut c);
        assert_eq!(c.row_adds, 2);
        assert_eq!(c.col_adds, 1);
        assert_eq!(c.total(), 3);
    }

    #[test]
    fn log_replays_in_order() {
        let mut log = OpLog::new();
        log.row_add(0, 2);
        log.col_add(1, 0);
        log.row_add(2, 1);
        assert_eq!(log.len(), 3);
        assert_eq!(log.row_ops().collect::<Vec<_>>(), vec![(0, 2), (2, 1)]);

        let mut copy = OpLog::new();
        log.replay(&mut copy);
        assert_eq!(copy, log);
    }
}
