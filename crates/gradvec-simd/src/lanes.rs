//! Lane abstraction over hardware vector registers.
//!
//! Each implementation exposes one register of `LANES` f64 values and the
//! load/store/arithmetic/reduce primitives the kernels are written against.
//! The kernels never special-case an instruction set: they are generic over
//! [`LaneOps`] and are monomorphized inside `#[target_feature]` entry points.
//!
//! Partial loads are always masked: lanes at or past `len` read as `0.0` and
//! never touch memory, so a tail of `length % LANES` elements can be folded
//! into the same accumulator as the full-width chunks.

/// Largest lane count of any implementation. Sizes scratch buffers for
/// [`LaneOps::store`].
pub const MAX_LANES: usize = 8;

/// Register-level primitives for one vector width.
///
/// # Safety
///
/// All methods are `unsafe`: the x86 implementations require the matching
/// CPU features to be present, and the pointer-taking methods require
/// `ptr..ptr + LANES` (or `ptr..ptr + len` for masked loads) to be valid.
pub trait LaneOps {
    /// Number of f64 values per register.
    const LANES: usize;

    /// Register type.
    type Reg: Copy;

    /// All lanes zero.
    unsafe fn zero() -> Self::Reg;

    /// Unaligned load of `LANES` values.
    unsafe fn load(ptr: *const f64) -> Self::Reg;

    /// Load the first `len` values (`len < LANES`), zeroing the rest.
    unsafe fn load_masked(ptr: *const f64, len: usize) -> Self::Reg;

    /// Unaligned store of all lanes to `out`.
    unsafe fn store(reg: Self::Reg, out: *mut f64);

    unsafe fn add(a: Self::Reg, b: Self::Reg) -> Self::Reg;

    unsafe fn sub(a: Self::Reg, b: Self::Reg) -> Self::Reg;

    unsafe fn mul(a: Self::Reg, b: Self::Reg) -> Self::Reg;

    /// Fused `a * b + c` with a single rounding.
    unsafe fn mul_add(a: Self::Reg, b: Self::Reg, c: Self::Reg) -> Self::Reg;

    /// Horizontal sum of all lanes.
    unsafe fn reduce_add(reg: Self::Reg) -> f64;
}

// ============================================================================
// Portable fallback
// ============================================================================

/// Fixed 4-wide unrolled scalar lanes.
///
/// Used where no vector unit is available; keeps the exact chunking and
/// zero-padded tail of the hardware paths so results agree in structure.
#[derive(Debug, Clone, Copy)]
pub struct ScalarLanes;

impl LaneOps for ScalarLanes {
    const LANES: usize = 4;
    type Reg = [f64; 4];

    #[inline(always)]
    unsafe fn zero() -> [f64; 4] {
        [0.0; 4]
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f64) -> [f64; 4] {
        unsafe { std::ptr::read_unaligned(ptr as *const [f64; 4]) }
    }

    #[inline(always)]
    unsafe fn load_masked(ptr: *const f64, len: usize) -> [f64; 4] {
        let mut reg = [0.0; 4];
        for (k, lane) in reg.iter_mut().enumerate().take(len) {
            *lane = unsafe { *ptr.add(k) };
        }
        reg
    }

    #[inline(always)]
    unsafe fn store(reg: [f64; 4], out: *mut f64) {
        unsafe { std::ptr::write_unaligned(out as *mut [f64; 4], reg) }
    }

    #[inline(always)]
    unsafe fn add(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]]
    }

    #[inline(always)]
    unsafe fn sub(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3] - b[3]]
    }

    #[inline(always)]
    unsafe fn mul(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
        [a[0] * b[0], a[1] * b[1], a[2] * b[2], a[3] * b[3]]
    }

    #[inline(always)]
    unsafe fn mul_add(a: [f64; 4], b: [f64; 4], c: [f64; 4]) -> [f64; 4] {
        [
            a[0].mul_add(b[0], c[0]),
            a[1].mul_add(b[1], c[1]),
            a[2].mul_add(b[2], c[2]),
            a[3].mul_add(b[3], c[3]),
        ]
    }

    #[inline(always)]
    unsafe fn reduce_add(reg: [f64; 4]) -> f64 {
        // Same pairing as the 256-bit horizontal sum.
        (reg[0] + reg[2]) + (reg[1] + reg[3])
    }
}

// ============================================================================
// AVX2 Implementation
// ============================================================================

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86 {
    use super::LaneOps;

    #[cfg(target_arch = "x86")]
    use std::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::*;

    /// 256-bit AVX2+FMA registers, 4 f64 lanes.
    #[derive(Debug, Clone, Copy)]
    pub struct Avx2Lanes;

    impl LaneOps for Avx2Lanes {
        const LANES: usize = 4;
        type Reg = __m256d;

        #[inline(always)]
        unsafe fn zero() -> __m256d {
            unsafe { _mm256_setzero_pd() }
        }

        #[inline(always)]
        unsafe fn load(ptr: *const f64) -> __m256d {
            unsafe { _mm256_loadu_pd(ptr) }
        }

        #[inline(always)]
        unsafe fn load_masked(ptr: *const f64, len: usize) -> __m256d {
            // maskload reads a lane only when the sign bit of its mask is set;
            // masked-off lanes read as zero and cannot fault.
            let on = |lane: usize| if lane < len { -1i64 } else { 0 };
            unsafe {
                let mask = _mm256_set_epi64x(on(3), on(2), on(1), on(0));
                _mm256_maskload_pd(ptr, mask)
            }
        }

        #[inline(always)]
        unsafe fn store(reg: __m256d, out: *mut f64) {
            unsafe { _mm256_storeu_pd(out, reg) }
        }

        #[inline(always)]
        unsafe fn add(a: __m256d, b: __m256d) -> __m256d {
            unsafe { _mm256_add_pd(a, b) }
        }

        #[inline(always)]
        unsafe fn sub(a: __m256d, b: __m256d) -> __m256d {
            unsafe { _mm256_sub_pd(a, b) }
        }

        #[inline(always)]
        unsafe fn mul(a: __m256d, b: __m256d) -> __m256d {
            unsafe { _mm256_mul_pd(a, b) }
        }

        #[inline(always)]
        unsafe fn mul_add(a: __m256d, b: __m256d, c: __m256d) -> __m256d {
            unsafe { _mm256_fmadd_pd(a, b, c) }
        }

        #[inline(always)]
        unsafe fn reduce_add(reg: __m256d) -> f64 {
            unsafe {
                // Horizontal sum of 4 f64
                let high = _mm256_extractf128_pd(reg, 1);
                let low = _mm256_castpd256_pd128(reg);
                let sum_128 = _mm_add_pd(low, high);
                let high_64 = _mm_unpackhi_pd(sum_128, sum_128);
                _mm_cvtsd_f64(_mm_add_sd(sum_128, high_64))
            }
        }
    }

    // ========================================================================
    // AVX-512 Implementation
    // ========================================================================

    /// 512-bit AVX-512F registers, 8 f64 lanes.
    #[derive(Debug, Clone, Copy)]
    pub struct Avx512Lanes;

    impl LaneOps for Avx512Lanes {
        const LANES: usize = 8;
        type Reg = __m512d;

        #[inline(always)]
        unsafe fn zero() -> __m512d {
            unsafe { _mm512_setzero_pd() }
        }

        #[inline(always)]
        unsafe fn load(ptr: *const f64) -> __m512d {
            unsafe { _mm512_loadu_pd(ptr) }
        }

        #[inline(always)]
        unsafe fn load_masked(ptr: *const f64, len: usize) -> __m512d {
            let mask: __mmask8 = ((1u16 << len) - 1) as __mmask8;
            unsafe { _mm512_maskz_loadu_pd(mask, ptr) }
        }

        #[inline(always)]
        unsafe fn store(reg: __m512d, out: *mut f64) {
            unsafe { _mm512_storeu_pd(out, reg) }
        }

        #[inline(always)]
        unsafe fn add(a: __m512d, b: __m512d) -> __m512d {
            unsafe { _mm512_add_pd(a, b) }
        }

        #[inline(always)]
        unsafe fn sub(a: __m512d, b: __m512d) -> __m512d {
            unsafe { _mm512_sub_pd(a, b) }
        }

        #[inline(always)]
        unsafe fn mul(a: __m512d, b: __m512d) -> __m512d {
            unsafe { _mm512_mul_pd(a, b) }
        }

        #[inline(always)]
        unsafe fn mul_add(a: __m512d, b: __m512d, c: __m512d) -> __m512d {
            unsafe { _mm512_fmadd_pd(a, b, c) }
        }

        #[inline(always)]
        unsafe fn reduce_add(reg: __m512d) -> f64 {
            unsafe {
                // Reduce 512 -> 256 -> 128 -> scalar
                let sum256_low = _mm512_castpd512_pd256(reg);
                let sum256_high = _mm512_extractf64x4_pd(reg, 1);
                let sum256 = _mm256_add_pd(sum256_low, sum256_high);

                let sum128_low = _mm256_castpd256_pd128(sum256);
                let sum128_high = _mm256_extractf128_pd(sum256, 1);
                let sum128 = _mm_add_pd(sum128_low, sum128_high);

                let high_64 = _mm_unpackhi_pd(sum128, sum128);
                _mm_cvtsd_f64(_mm_add_sd(sum128, high_64))
            }
        }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use x86::{Avx2Lanes, Avx512Lanes};
