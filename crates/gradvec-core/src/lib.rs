//! Validated sizes and ownership-aware gradient vectors.
//!
//! This crate provides:
//! - [`SizeInvariant`], a size that can never be negative
//! - [`GradientVector`], a dense f64 vector that either owns a copy of its
//!   values or explicitly aliases a [`SharedBuffer`]
//! - Checked algebra returning [`Error`] values for bad sizes, mismatched
//!   sizes and zero divisors
//!
//! Dot products and norms delegate to the SIMD kernels in `gradvec-simd`.

pub mod buffer;
pub mod error;
pub mod size;
pub mod vector;

pub use buffer::SharedBuffer;
pub use error::{Error, Result};
pub use size::SizeInvariant;
pub use vector::{GradientVector, VectorView};
