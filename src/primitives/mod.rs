//! Core compute primitives.
//!
//! The classifier consumes feature rows as a row-major [`Matrix`].

mod matrix;

pub use matrix::Matrix;
