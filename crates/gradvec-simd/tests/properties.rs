//! Property tests for the lane-chunked kernels.

use gradvec_simd::{
    SimdCapability, VectorSlice, dot, dot_kahan, dot_product, dot_scalar, l2_norm,
    squared_l2_norm,
};
use proptest::prelude::*;

/// `(n + 1) * eps * sum(|a_i b_i|)`.
fn tolerance(a: &[f64], b: &[f64]) -> f64 {
    let abs_sum: f64 = a.iter().zip(b).map(|(x, y)| (x * y).abs()).sum();
    (a.len() as f64 + 1.0) * f64::EPSILON * abs_sum
}

fn pair(max_len: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1..max_len).prop_flat_map(|n| {
        (
            prop::collection::vec(-1e3..1e3f64, n),
            prop::collection::vec(-1e3..1e3f64, n),
        )
    })
}

proptest! {
    /// SIMD dot stays within the ULP-scaled bound of the scalar FMA reference.
    #[test]
    fn prop_dot_matches_reference((a, b) in pair(200)) {
        let reference = dot_scalar(&a, &b);
        let simd = dot(VectorSlice::full(&a), VectorSlice::full(&b), SimdCapability::detect());
        prop_assert!((simd - reference).abs() <= 2.0 * tolerance(&a, &b));
    }

    /// Compensated dot agrees with the plain one on well-scaled inputs.
    #[test]
    fn prop_kahan_matches_reference((a, b) in pair(200)) {
        let reference = dot_scalar(&a, &b);
        let kahan = dot_kahan(VectorSlice::full(&a), VectorSlice::full(&b), SimdCapability::detect());
        prop_assert!((kahan - reference).abs() <= 2.0 * tolerance(&a, &b));
    }

    /// Splitting at a lane boundary never changes the result beyond tolerance.
    #[test]
    fn prop_masked_tail_split((a, b) in pair(120)) {
        for cap in [SimdCapability::detect(), SimdCapability::Scalar] {
            let lanes = cap.lanes();
            let len = a.len();
            let boundary = lanes * (len / lanes);

            let (sa, sb) = (VectorSlice::full(&a), VectorSlice::full(&b));
            let (a_head, a_tail) = sa.split_at(boundary);
            let (b_head, b_tail) = sb.split_at(boundary);

            let whole = dot(sa, sb, cap);
            let combined = dot(a_head, b_head, cap) + dot(a_tail, b_tail, cap);
            prop_assert!(
                (whole - combined).abs() <= 2.0 * tolerance(&a, &b),
                "dot len={} lanes={}: {} vs {}", len, lanes, whole, combined
            );

            let whole = dot_kahan(sa, sb, cap);
            let combined = dot_kahan(a_head, b_head, cap) + dot_kahan(a_tail, b_tail, cap);
            prop_assert!(
                (whole - combined).abs() <= 2.0 * tolerance(&a, &b),
                "dot_kahan len={} lanes={}: {} vs {}", len, lanes, whole, combined
            );

            let whole = squared_l2_norm(sa, cap);
            let combined = squared_l2_norm(a_head, cap) + squared_l2_norm(a_tail, cap);
            prop_assert!(
                (whole - combined).abs() <= 2.0 * tolerance(&a, &a),
                "squared_l2_norm len={} lanes={}: {} vs {}", len, lanes, whole, combined
            );
        }
    }

    /// The norm's own tail path: a buffer shorter than one register sums
    /// exactly like the scalar reference.
    #[test]
    fn prop_norm_tail_only(a in prop::collection::vec(-1e3..1e3f64, 1..8)) {
        let cap = SimdCapability::detect();
        prop_assume!(a.len() < cap.lanes());
        let sq = squared_l2_norm(VectorSlice::full(&a), cap);
        let reference = dot_scalar(&a, &a);
        prop_assert!((sq - reference).abs() <= 2.0 * tolerance(&a, &a));
    }

    /// Squared norm agrees with the self dot product; the norm is its sqrt.
    #[test]
    fn prop_norm_is_self_dot(a in prop::collection::vec(-1e3..1e3f64, 0..200)) {
        let cap = SimdCapability::detect();
        let s = VectorSlice::full(&a);
        let sq = squared_l2_norm(s, cap);
        let d = dot(s, s, cap);
        prop_assert!((sq - d).abs() <= 2.0 * tolerance(&a, &a));
        prop_assert_eq!(l2_norm(s, cap), sq.sqrt());
        prop_assert!(sq >= 0.0);
    }

    /// Offsets window into the buffers exactly like pre-sliced inputs.
    #[test]
    fn prop_offsets_equal_subslices(
        (a, b) in pair(100),
        skip_a in 0usize..8,
        skip_b in 0usize..8,
    ) {
        let mut padded_a = vec![f64::NAN; skip_a];
        padded_a.extend_from_slice(&a);
        let mut padded_b = vec![f64::INFINITY; skip_b];
        padded_b.extend_from_slice(&b);

        let windowed = dot_product(&padded_a, skip_a, a.len(), &padded_b, skip_b);
        let direct = dot(VectorSlice::full(&a), VectorSlice::full(&b), SimdCapability::detect());
        prop_assert_eq!(windowed, direct);
    }
}
