use std::fmt;
use thiserror::Error;

/// Which dimension of a matrix an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Col,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Col => write!(f, "column"),
        }
    }
}

/// Errors from checked matrix operations
///
/// Outcomes that are a normal part of linear algebra, such as a singular matrix having no
/// inverse or an inconsistent system having no solution, are reported as `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum F2Error {
    /// The shapes of the operands are incompatible. Shapes are given as `(rows, cols)`.
    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// An index or the end of a range lies outside the matrix
    #[error("{axis} index {index} out of range for {axis} count {len}")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },

    /// A permutation has the wrong length or is not a bijection
    #[error("invalid permutation of length {len} (expected a bijection on 0..{expected})")]
    InvalidPermutation { len: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, F2Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        let e = F2Error::DimensionMismatch {
            op: "multiply",
            left: (2, 3),
            right: (2, 3),
        };
        assert_eq!(e.to_string(), "dimension mismatch in multiply: (2, 3) vs (2, 3)");

        let e = F2Error::IndexOutOfRange {
            axis: Axis::Col,
            index: 5,
            len: 4,
        };
        assert_eq!(e.to_string(), "column index 5 out of range for column count 4");
    }
}
