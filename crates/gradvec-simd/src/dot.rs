//! SIMD-accelerated f64 dot products.
//!
//! Two accumulation paths share one chunking strategy: full `LANES`-wide
//! steps followed by a single masked partial step for the `length % LANES`
//! tail, all folded into the same register before one horizontal reduction.
//!
//! - [`dot`] accumulates with fused multiply-add.
//! - [`dot_kahan`] additionally recovers the rounding error of every product
//!   (exactly, via FMA) and of every addition (via TwoSum), keeps it in a
//!   lane-wise compensation register, and re-injects it at the end. On
//!   cancellation-heavy inputs the result is as accurate as if it had been
//!   computed in twice the working precision:
//!   `|err| <= eps * |s| + (n * eps)^2 * sum(|a_i * b_i|)`.
//!
//! Neither path is bit-identical to a left-to-right scalar sum; both
//! reassociate terms across lanes.

use crate::capability::SimdCapability;
use crate::lanes::{LaneOps, MAX_LANES, ScalarLanes};
use crate::slice::VectorSlice;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::lanes::{Avx2Lanes, Avx512Lanes};

/// Compute `sum(a[a_offset + i] * b[b_offset + i])` for `i` in `0..length`.
///
/// Uses the detected SIMD capability. `length == 0` returns `0.0` without
/// reading either buffer.
///
/// # Panics
///
/// Panics if either window runs past the end of its buffer.
#[inline]
pub fn dot_product(a: &[f64], a_offset: usize, length: usize, b: &[f64], b_offset: usize) -> f64 {
    if length == 0 {
        return 0.0;
    }
    dot(
        VectorSlice::new(a, a_offset, length),
        VectorSlice::new(b, b_offset, length),
        SimdCapability::detect(),
    )
}

/// Compensated variant of [`dot_product`].
///
/// # Panics
///
/// Panics if either window runs past the end of its buffer.
#[inline]
pub fn dot_product_kahan(
    a: &[f64],
    a_offset: usize,
    length: usize,
    b: &[f64],
    b_offset: usize,
) -> f64 {
    if length == 0 {
        return 0.0;
    }
    dot_kahan(
        VectorSlice::new(a, a_offset, length),
        VectorSlice::new(b, b_offset, length),
        SimdCapability::detect(),
    )
}

/// Dot product of two equal-length slices.
///
/// A capability the running CPU does not support is replaced by the
/// detected one.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
pub fn dot(a: VectorSlice<'_>, b: VectorSlice<'_>, capability: SimdCapability) -> f64 {
    assert_eq!(a.len(), b.len(), "Vector lengths must match");
    if a.is_empty() {
        return 0.0;
    }
    let (a, b) = (a.as_slice(), b.as_slice());

    match supported(capability) {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        SimdCapability::Avx512 => {
            // SAFETY: AVX-512 availability verified by `supported`
            unsafe { dot_avx512(a, b) }
        }
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        SimdCapability::Avx2 => {
            // SAFETY: AVX2+FMA availability verified by `supported`
            unsafe { dot_avx2(a, b) }
        }
        SimdCapability::Scalar => {
            // SAFETY: portable lanes have no feature requirement
            unsafe { dot_lanes::<ScalarLanes>(a, b) }
        }
    }
}

/// Compensated dot product of two equal-length slices.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
pub fn dot_kahan(a: VectorSlice<'_>, b: VectorSlice<'_>, capability: SimdCapability) -> f64 {
    assert_eq!(a.len(), b.len(), "Vector lengths must match");
    if a.is_empty() {
        return 0.0;
    }
    let (a, b) = (a.as_slice(), b.as_slice());

    match supported(capability) {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        SimdCapability::Avx512 => {
            // SAFETY: AVX-512 availability verified by `supported`
            unsafe { dot_kahan_avx512(a, b) }
        }
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        SimdCapability::Avx2 => {
            // SAFETY: AVX2+FMA availability verified by `supported`
            unsafe { dot_kahan_avx2(a, b) }
        }
        SimdCapability::Scalar => {
            // SAFETY: portable lanes have no feature requirement
            unsafe { dot_kahan_lanes::<ScalarLanes>(a, b) }
        }
    }
}

/// Scalar reference: left-to-right FMA accumulation.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
#[inline]
pub fn dot_scalar(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Vector lengths must match");
    let mut sum = 0.0;
    for (ai, bi) in a.iter().zip(b.iter()) {
        sum = ai.mul_add(*bi, sum);
    }
    sum
}

/// Scalar reference for the compensated dot product.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths.
pub fn dot_kahan_scalar(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "Vector lengths must match");
    let mut sum = 0.0;
    let mut comp = 0.0;
    for (ai, bi) in a.iter().zip(b.iter()) {
        let (p, p_err) = two_product(*ai, *bi);
        let (s, s_err) = two_sum(sum, p);
        sum = s;
        comp += p_err + s_err;
    }
    sum + comp
}

#[inline]
pub(crate) fn supported(capability: SimdCapability) -> SimdCapability {
    if capability.is_supported() {
        capability
    } else {
        SimdCapability::detect()
    }
}

/// Error-free sum: `a + b == s + err` exactly.
#[inline(always)]
pub(crate) fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let z = s - a;
    (s, (a - (s - z)) + (b - z))
}

/// Error-free product: `a * b == p + err` exactly.
#[inline(always)]
pub(crate) fn two_product(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

// ============================================================================
// Generic lane kernels
// ============================================================================

/// # Safety
///
/// `L`'s CPU features must be available; `a.len() == b.len()`.
#[inline(always)]
pub(crate) unsafe fn dot_lanes<L: LaneOps>(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    let simd_len = n - n % L::LANES;

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    unsafe {
        let mut acc = L::zero();
        let mut i = 0;
        while i < simd_len {
            let a_vec = L::load(a_ptr.add(i));
            let b_vec = L::load(b_ptr.add(i));
            acc = L::mul_add(a_vec, b_vec, acc);
            i += L::LANES;
        }

        // Masked tail: out-of-range lanes load as zero and add nothing.
        let tail = n - simd_len;
        if tail > 0 {
            let a_vec = L::load_masked(a_ptr.add(simd_len), tail);
            let b_vec = L::load_masked(b_ptr.add(simd_len), tail);
            acc = L::mul_add(a_vec, b_vec, acc);
        }

        L::reduce_add(acc)
    }
}

/// One compensated step over a full register.
#[inline(always)]
unsafe fn kahan_step<L: LaneOps>(
    sum: L::Reg,
    comp: L::Reg,
    a_vec: L::Reg,
    b_vec: L::Reg,
) -> (L::Reg, L::Reg) {
    unsafe {
        // TwoProduct: p + p_err == a * b exactly
        let p = L::mul(a_vec, b_vec);
        let p_err = L::mul_add(a_vec, b_vec, L::sub(L::zero(), p));

        // TwoSum: t + s_err == sum + p exactly
        let t = L::add(sum, p);
        let z = L::sub(t, sum);
        let s_err = L::add(L::sub(sum, L::sub(t, z)), L::sub(p, z));

        (t, L::add(comp, L::add(p_err, s_err)))
    }
}

/// # Safety
///
/// `L`'s CPU features must be available; `a.len() == b.len()`.
#[inline(always)]
pub(crate) unsafe fn dot_kahan_lanes<L: LaneOps>(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    let simd_len = n - n % L::LANES;

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut sum_lanes = [0.0f64; MAX_LANES];
    let mut comp_lanes = [0.0f64; MAX_LANES];

    unsafe {
        let mut sum = L::zero();
        let mut comp = L::zero();
        let mut i = 0;
        while i < simd_len {
            let a_vec = L::load(a_ptr.add(i));
            let b_vec = L::load(b_ptr.add(i));
            (sum, comp) = kahan_step::<L>(sum, comp, a_vec, b_vec);
            i += L::LANES;
        }

        let tail = n - simd_len;
        if tail > 0 {
            let a_vec = L::load_masked(a_ptr.add(simd_len), tail);
            let b_vec = L::load_masked(b_ptr.add(simd_len), tail);
            (sum, comp) = kahan_step::<L>(sum, comp, a_vec, b_vec);
        }

        L::store(sum, sum_lanes.as_mut_ptr());
        L::store(comp, comp_lanes.as_mut_ptr());
    }

    // Lane sums can be large and of opposite sign, so combine them with
    // TwoSum as well; compensations are small and add plainly.
    let mut total = 0.0;
    let mut comp = 0.0;
    for k in 0..L::LANES {
        let (s, err) = two_sum(total, sum_lanes[k]);
        total = s;
        comp += err + comp_lanes[k];
    }
    total + comp
}

// ============================================================================
// AVX2 Implementation
// ============================================================================

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn dot_avx2(a: &[f64], b: &[f64]) -> f64 {
    unsafe { dot_lanes::<Avx2Lanes>(a, b) }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn dot_kahan_avx2(a: &[f64], b: &[f64]) -> f64 {
    unsafe { dot_kahan_lanes::<Avx2Lanes>(a, b) }
}

// ============================================================================
// AVX-512 Implementation
// ============================================================================

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx512f")]
unsafe fn dot_avx512(a: &[f64], b: &[f64]) -> f64 {
    unsafe { dot_lanes::<Avx512Lanes>(a, b) }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx512f")]
unsafe fn dot_kahan_avx512(a: &[f64], b: &[f64]) -> f64 {
    unsafe { dot_kahan_lanes::<Avx512Lanes>(a, b) }
}
