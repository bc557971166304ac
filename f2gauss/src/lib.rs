//! `f2gauss` is a Rust library for dense linear algebra over the 2-element field. Some features
//! include:
//! - getting and setting individual matrix elements and ranges of rows and columns
//! - fast row operations using bitwise operations on 64-bit blocks
//! - column operations, swaps and permutations of rows and columns
//! - fast out-of-place matrix transpose using a [recursive block method](https://github.com/dsnet/matrix-transpose)
//! - matrix multiplication and addition
//! - Gaussian elimination with the block-wise duplicate row optimisation of Patel, Markov and
//!   Hayes, optionally recording every row operation on companion objects
//! - rank, epi-mono factorisation, inverse, linear system solving and nullspace bases
//!
//! The main data structures provided by this crate are:
//! - [`F2Matrix`]: a dense matrix of bits, stored row by row in 64-bit blocks
//! - [`Accumulator`]: anything that can receive the row and column additions performed during
//!   elimination, e.g. another [`F2Matrix`], an [`OpCounter`] or an [`OpLog`]
//! - [`BitVec`] and [`BitSlice`]: the packed bit storage underneath

#![allow(
    clippy::needless_range_loop,
    clippy::uninlined_format_args,
    clippy::bool_assert_comparison,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]
pub mod accumulator;
pub mod bitvec;
pub mod error;
pub mod matrix;

pub use accumulator::{Accumulator, ElementaryOp, OpCounter, OpLog};
pub use bitvec::{BitBlock, BitSlice, BitVec};
pub use error::{Axis, F2Error, Result};
pub use matrix::gauss::{GaussConfig, GaussResult, Strategy, DEFAULT_BLOCKSIZE};
pub use matrix::F2Matrix;
