//! # gradvec
//!
//! SIMD-backed f64 vectors for representing optimization gradients and
//! candidate solutions.
//!
//! gradvec provides:
//! - Dot products and L2 norms on AVX-512, AVX2+FMA or portable lanes,
//!   selected at runtime, with masked tails
//! - A compensated dot product for cancellation-prone inputs
//! - [`GradientVector`], which either copies its input or explicitly
//!   aliases a [`SharedBuffer`]
//! - Validated sizes ([`SizeInvariant`]) and error values instead of panics
//!   for bad or mismatched sizes
//!
//! ## Quick Start
//!
//! ```rust
//! use gradvec::prelude::*;
//!
//! let a = GradientVector::of([1.0, 2.0, 3.0]).unwrap();
//! let b = GradientVector::of([4.0, 5.0, 6.0]).unwrap();
//! assert_eq!(a.dot(&b), Ok(32.0));
//! assert_eq!(GradientVector::zeros(3).unwrap().l2_norm(), 0.0);
//! ```
//!
//! ## Raw buffers
//!
//! ```rust
//! let a = [9.0, 1.0, 2.0, 3.0];
//! let b = [4.0, 5.0, 6.0];
//! assert_eq!(gradvec::dot_product(&a, 1, 3, &b, 0), 32.0);
//! ```

// Re-export member crates
pub use gradvec_core as core;
pub use gradvec_simd as simd;

// ============================================================================
// Convenient re-exports from gradvec_core
// ============================================================================

pub use gradvec_core::{Error, GradientVector, Result, SharedBuffer, SizeInvariant, VectorView};

// ============================================================================
// Convenient re-exports from gradvec_simd
// ============================================================================

pub use gradvec_simd::{
    KernelConfig,
    SimdCapability,
    Summation,
    VectorSlice,
    // Dot products
    dot_product,
    dot_product_kahan,
    // Norms
    l2_norm_of,
    squared_l2_norm_of,
};

/// Prelude module containing commonly used types.
///
/// ```rust
/// use gradvec::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Error, GradientVector, KernelConfig, SharedBuffer, SimdCapability, SizeInvariant,
        Summation, VectorSlice,
    };
}
