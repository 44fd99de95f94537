//! Accuracy of the dot product kernels against an exact oracle.
//!
//! The oracle expands every product into an exact pair `p + e` with FMA and
//! sums all pairs with non-overlapping partials (Shewchuk), rounding once at
//! the end. The result is the correctly rounded exact dot product.

use gradvec_simd::{SimdCapability, VectorSlice, dot, dot_kahan, dot_kahan_scalar, dot_scalar};

/// Correctly rounded sum of `values`.
fn exact_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut partials: Vec<f64> = Vec::new();
    for mut x in values {
        let mut i = 0;
        for j in 0..partials.len() {
            let mut y = partials[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if lo != 0.0 {
                partials[i] = lo;
                i += 1;
            }
            x = hi;
        }
        partials.truncate(i);
        partials.push(x);
    }

    let mut n = partials.len();
    if n == 0 {
        return 0.0;
    }
    n -= 1;
    let mut hi = partials[n];
    let mut lo = 0.0;
    while n > 0 {
        let x = hi;
        n -= 1;
        let y = partials[n];
        hi = x + y;
        let yr = hi - x;
        lo = y - yr;
        if lo != 0.0 {
            break;
        }
    }
    // Half-way case: the discarded partials push the tie one way.
    if n > 0 && ((lo < 0.0 && partials[n - 1] < 0.0) || (lo > 0.0 && partials[n - 1] > 0.0)) {
        let y = lo * 2.0;
        let x = hi + y;
        if y == x - hi {
            hi = x;
        }
    }
    hi
}

fn exact_dot(a: &[f64], b: &[f64]) -> f64 {
    exact_sum(a.iter().zip(b).flat_map(|(&x, &y)| {
        let p = x * y;
        [p, x.mul_add(y, -p)]
    }))
}

fn abs_dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x * y).abs()).sum()
}

fn supported_capabilities() -> Vec<SimdCapability> {
    let mut caps = vec![SimdCapability::Scalar];
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        caps.push(SimdCapability::Avx2);
        caps.push(SimdCapability::Avx512);
    }
    caps.retain(|c| c.is_supported());
    caps
}

/// `a[i] = (-1)^i * 1e16`, `b[i] = 1 / (i + 1)`.
fn alternating_cancellation(n: usize) -> (Vec<f64>, Vec<f64>) {
    let a = (0..n)
        .map(|i| if i % 2 == 0 { 1e16 } else { -1e16 })
        .collect();
    let b = (0..n).map(|i| 1.0 / (i as f64 + 1.0)).collect();
    (a, b)
}

#[test]
fn oracle_sanity() {
    assert_eq!(exact_sum([1e16, 1.0, -1e16]), 1.0);
    assert_eq!(exact_sum([1e100, 1.0, -1e100, 1e-100]), 1.0);
    assert_eq!(exact_sum(std::iter::empty()), 0.0);
    assert_eq!(exact_dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
}

#[test]
fn kahan_at_least_as_accurate_on_alternating_cancellation() {
    for cap in supported_capabilities() {
        for n in [7, 16, 33, 101, 1000, 4097] {
            let (a, b) = alternating_cancellation(n);
            let exact = exact_dot(&a, &b);

            let plain = dot(VectorSlice::full(&a), VectorSlice::full(&b), cap);
            let kahan = dot_kahan(VectorSlice::full(&a), VectorSlice::full(&b), cap);

            let plain_err = (plain - exact).abs();
            let kahan_err = (kahan - exact).abs();
            assert!(
                kahan_err <= plain_err,
                "n={} cap={:?}: kahan err {} > plain err {}",
                n,
                cap,
                kahan_err,
                plain_err
            );

            // eps * |s| + (n * eps)^2 * sum(|a_i b_i|)
            let ne = n as f64 * f64::EPSILON;
            let bound = f64::EPSILON * exact.abs() + ne * ne * abs_dot(&a, &b);
            assert!(
                kahan_err <= bound,
                "n={} cap={:?}: kahan err {} exceeds bound {}",
                n,
                cap,
                kahan_err,
                bound
            );
        }
    }
}

#[test]
fn scalar_kahan_reference_matches_oracle() {
    for n in [10, 100, 1000] {
        let (a, b) = alternating_cancellation(n);
        let exact = exact_dot(&a, &b);
        let kahan = dot_kahan_scalar(&a, &b);
        assert!(
            (kahan - exact).abs() <= f64::EPSILON * exact.abs(),
            "n={}: {} vs {}",
            n,
            kahan,
            exact
        );
    }
}

#[test]
fn plain_within_ulp_scaled_tolerance_of_fma_reference() {
    for cap in supported_capabilities() {
        for n in [1, 5, 64, 250, 1023] {
            let a: Vec<f64> = (0..n).map(|i| ((i * 7 + 3) as f64).sqrt()).collect();
            let b: Vec<f64> = (0..n).map(|i| 1.0 + (i as f64 * 0.37).cos()).collect();

            let reference = dot_scalar(&a, &b);
            let simd = dot(VectorSlice::full(&a), VectorSlice::full(&b), cap);

            // Positive terms: well conditioned, so the gap is a few ULPs per
            // accumulation step at most.
            let ulp = f64::EPSILON * reference.abs();
            assert!(
                (simd - reference).abs() <= 2.0 * n as f64 * ulp,
                "n={} cap={:?}: {} vs {}",
                n,
                cap,
                simd,
                reference
            );

            let exact = exact_dot(&a, &b);
            assert!((reference - exact).abs() <= n as f64 * ulp);
        }
    }
}

#[test]
fn huge_cancellation_exact_result() {
    // Every pair cancels exactly except the small terms.
    let mut a = Vec::new();
    let mut b = Vec::new();
    for i in 0..50 {
        a.extend_from_slice(&[1e200, 1.0, -1e200]);
        b.extend_from_slice(&[1.0, i as f64, 1.0]);
    }
    let expected: f64 = (0..50).map(|i| i as f64).sum();
    assert_eq!(exact_dot(&a, &b), expected);
    for cap in supported_capabilities() {
        let kahan = dot_kahan(VectorSlice::full(&a), VectorSlice::full(&b), cap);
        assert_eq!(kahan, expected, "cap={:?}", cap);
    }
}
