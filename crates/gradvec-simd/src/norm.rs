//! SIMD-accelerated squared L2 and L2 norms.
//!
//! Same lane chunking and masked tail as the dot product kernels, with a
//! single operand loaded once per step.

use crate::capability::SimdCapability;
use crate::dot::supported;
use crate::lanes::{LaneOps, ScalarLanes};
use crate::slice::VectorSlice;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::lanes::{Avx2Lanes, Avx512Lanes};

/// Sum of squares of the slice. Empty input returns `0.0`.
#[inline]
pub fn squared_l2_norm(a: VectorSlice<'_>, capability: SimdCapability) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let a = a.as_slice();

    match supported(capability) {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        SimdCapability::Avx512 => {
            // SAFETY: AVX-512 availability verified by `supported`
            unsafe { sum_squares_avx512(a) }
        }
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        SimdCapability::Avx2 => {
            // SAFETY: AVX2+FMA availability verified by `supported`
            unsafe { sum_squares_avx2(a) }
        }
        SimdCapability::Scalar => {
            // SAFETY: portable lanes have no feature requirement
            unsafe { sum_squares_lanes::<ScalarLanes>(a) }
        }
    }
}

/// Euclidean norm: `sqrt(squared_l2_norm(a))`.
#[inline]
pub fn l2_norm(a: VectorSlice<'_>, capability: SimdCapability) -> f64 {
    squared_l2_norm(a, capability).sqrt()
}

/// [`squared_l2_norm`] over a whole buffer with the detected capability.
#[inline]
pub fn squared_l2_norm_of(a: &[f64]) -> f64 {
    squared_l2_norm(VectorSlice::full(a), SimdCapability::detect())
}

/// [`l2_norm`] over a whole buffer with the detected capability.
#[inline]
pub fn l2_norm_of(a: &[f64]) -> f64 {
    l2_norm(VectorSlice::full(a), SimdCapability::detect())
}

/// # Safety
///
/// `L`'s CPU features must be available.
#[inline(always)]
unsafe fn sum_squares_lanes<L: LaneOps>(a: &[f64]) -> f64 {
    let n = a.len();
    let simd_len = n - n % L::LANES;
    let a_ptr = a.as_ptr();

    unsafe {
        let mut acc = L::zero();
        let mut i = 0;
        while i < simd_len {
            let v = L::load(a_ptr.add(i));
            acc = L::mul_add(v, v, acc);
            i += L::LANES;
        }

        let tail = n - simd_len;
        if tail > 0 {
            let v = L::load_masked(a_ptr.add(simd_len), tail);
            acc = L::mul_add(v, v, acc);
        }

        L::reduce_add(acc)
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn sum_squares_avx2(a: &[f64]) -> f64 {
    unsafe { sum_squares_lanes::<Avx2Lanes>(a) }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx512f")]
unsafe fn sum_squares_avx512(a: &[f64]) -> f64 {
    unsafe { sum_squares_lanes::<Avx512Lanes>(a) }
}
