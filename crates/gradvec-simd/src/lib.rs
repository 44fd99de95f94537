//! SIMD-accelerated numerical kernels for gradvec.
//!
//! Provides runtime-detected SIMD implementations for:
//! - f64 dot products, plain (FMA) and compensated (Kahan-style)
//! - squared L2 and L2 norms
//!
//! All kernels process full-width register chunks and fold the
//! `length % lanes` tail in through a masked, zero-padded load.
//!
//! On x86/x86_64 systems, automatically uses AVX-512 or AVX2+FMA when available.
//! Falls back to fixed-width portable lanes on all other architectures.

pub mod capability;
pub mod config;
pub mod dot;
pub mod lanes;
pub mod norm;
pub mod slice;

pub use capability::SimdCapability;
pub use config::{KernelConfig, Summation};
pub use dot::{dot, dot_kahan, dot_kahan_scalar, dot_product, dot_product_kahan, dot_scalar};
pub use lanes::{LaneOps, MAX_LANES, ScalarLanes};
pub use norm::{l2_norm, l2_norm_of, squared_l2_norm, squared_l2_norm_of};
pub use slice::{VectorSlice, canonical_bits};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use lanes::{Avx2Lanes, Avx512Lanes};
