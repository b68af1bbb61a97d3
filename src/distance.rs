//! Integer approximate distance between product-quantized codes.
//!
//! # Symmetric lookup distance
//!
//! Both sides of the comparison are PQ codes, so there is no query-time
//! float vector anywhere: the angular distance is reconstructed entirely
//! from two precomputed tables carried by the [`CodebookSet`]:
//!
//! ```text
//! norm_x = Σ_i  norm[code_x[i]]              (squared-norm estimate)
//! prod   = Σ_i  prod[(code_a[i] << 8) | code_b[i]]   (inner-product estimate)
//!
//! dist   = 2 - 2 · prod / √norm_a / √norm_b
//! ```
//!
//! With tables trained so that `√norm_x ≈ ‖x‖` and `prod ≈ ⟨a, b⟩`, the
//! result lands in `[0, 4]`. It is scaled by 10000 and truncated to an
//! integer: the host index compares distances inside its priority
//! structures, and integer comparisons there are cheap and deterministic
//! where float comparisons are neither.
//!
//! # Hot-path contract
//!
//! [`pq_distance`] is branch-minimal and unchecked: it assumes both codes
//! are `code_length` bytes with `code_length` a multiple of 4, which
//! [`CodebookSet::new`](CodebookSet::new) enforced at construction. The
//! kernel walks complete 4-byte groups of the codes, so violating the
//! contract yields meaningless distances rather than memory errors, but it
//! is still a caller fault. Degenerate (zero-norm) codes divide by ≈0 and
//! produce a huge or non-finite pre-scale value; use
//! [`pq_distance_checked`] or [`Space::prepare`](crate::Space::prepare)
//! where that must be a signaled error instead.

use crate::codebook::{CodebookSet, GROUP};
use crate::error::CodeError;

/// Distance function signature expected by a host ANN index: two raw
/// encoded vectors plus the shared per-space context.
pub type DistFn<C> = fn(&[u8], &[u8], &C) -> i32;

/// Fixed-point scale applied to the `[0, 4]` angular distance before
/// truncating toward zero.
pub const DIST_SCALE: f32 = 10_000.0;

/// Accumulated norms at or below this are treated as degenerate by the
/// checked entry points.
pub const NORM_EPSILON: f32 = 1e-6;

/// Approximate angular distance between two PQ codes, scaled to an
/// integer.
///
/// See the module docs for the formula and the hot-path contract. Reads
/// only the code slices and the codebook tables; no other state.
#[inline]
pub fn pq_distance(a: &[u8], b: &[u8], cb: &CodebookSet) -> i32 {
    let (norm_a, norm_b, prod) = accumulate(a, b, cb);
    finalize(norm_a, norm_b, prod)
}

/// Checked variant of [`pq_distance`].
///
/// Verifies both code lengths against the codebook's `code_length` and
/// rejects codes whose accumulated norm is degenerate, instead of letting
/// the division produce an undefined numeric. Intended for validation
/// paths and tests; the function handed to the index stays unchecked.
pub fn pq_distance_checked(a: &[u8], b: &[u8], cb: &CodebookSet) -> Result<i32, CodeError> {
    let expected = cb.code_length();
    for code in [a, b] {
        if code.len() != expected {
            return Err(CodeError::LengthMismatch {
                expected,
                actual: code.len(),
            });
        }
    }

    let (norm_a, norm_b, prod) = accumulate(a, b, cb);
    if norm_a <= NORM_EPSILON || norm_b <= NORM_EPSILON {
        return Err(CodeError::DegenerateNorm);
    }
    Ok(finalize(norm_a, norm_b, prod))
}

/// Walk both codes four positions at a time, accumulating both
/// squared-norm estimates and the inner-product estimate in one pass.
#[inline(always)]
fn accumulate(a: &[u8], b: &[u8], cb: &CodebookSet) -> (f32, f32, f32) {
    let norm_lut = cb.norm_lookup();
    let prod_lut = cb.prod_lookup();

    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    let mut prod = 0.0_f32;

    for (ga, gb) in a.chunks_exact(GROUP).zip(b.chunks_exact(GROUP)) {
        let (a0, a1, a2, a3) = (ga[0] as usize, ga[1] as usize, ga[2] as usize, ga[3] as usize);
        let (b0, b1, b2, b3) = (gb[0] as usize, gb[1] as usize, gb[2] as usize, gb[3] as usize);

        norm_a += norm_lut[a0] + norm_lut[a1] + norm_lut[a2] + norm_lut[a3];
        norm_b += norm_lut[b0] + norm_lut[b1] + norm_lut[b2] + norm_lut[b3];

        prod += prod_lut[(a0 << 8) | b0]
            + prod_lut[(a1 << 8) | b1]
            + prod_lut[(a2 << 8) | b2]
            + prod_lut[(a3 << 8) | b3];
    }

    (norm_a, norm_b, prod)
}

#[inline(always)]
fn finalize(norm_a: f32, norm_b: f32, prod: f32) -> i32 {
    let dist = 2.0 - 2.0 * prod / norm_a.sqrt() / norm_b.sqrt();
    (dist * DIST_SCALE) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::{NORM_TABLE_LEN, PROD_TABLE_LEN};

    /// Build a codebook whose lookup regions are filled from the given
    /// per-byte norm and per-pair product functions.
    fn table_fixture(
        code_length: usize,
        norm: impl Fn(usize) -> f32,
        prod: impl Fn(usize, usize) -> f32,
    ) -> CodebookSet {
        let mut lookup = vec![0.0_f32; NORM_TABLE_LEN + PROD_TABLE_LEN];
        for v in 0..NORM_TABLE_LEN {
            lookup[v] = norm(v);
        }
        for a in 0..256 {
            for b in 0..256 {
                lookup[NORM_TABLE_LEN + ((a << 8) | b)] = prod(a, b);
            }
        }
        let dims = vec![lookup.len()];
        CodebookSet::new(Vec::new(), vec![0], lookup, dims, code_length).unwrap()
    }

    #[test]
    fn all_ones_tables_collapse_every_pair_to_zero() {
        let cb = table_fixture(4, |_| 1.0, |_, _| 1.0);
        // norm_a = norm_b = prod = 4  =>  dist = 2 - 2*4/2/2 = 0
        assert_eq!(pq_distance(&[0, 0, 0, 0], &[255, 255, 255, 255], &cb), 0);
        assert_eq!(pq_distance(&[1, 2, 3, 4], &[4, 3, 2, 1], &cb), 0);
        assert_eq!(pq_distance(&[9, 9, 9, 9], &[9, 9, 9, 9], &cb), 0);
    }

    #[test]
    fn identity_norms_zero_products_give_pure_angular_max() {
        let cb = table_fixture(4, |v| v as f32, |_, _| 0.0);
        let code = [10, 20, 30, 40];
        // norms = 100, prod = 0  =>  dist = 2.0  =>  20000
        assert_eq!(pq_distance(&code, &code, &cb), 20_000);
    }

    #[test]
    fn self_distance_is_zero_for_self_consistent_tables() {
        // prod[(v << 8) | v] == norm[v] makes d(a, a) collapse to zero.
        let cb = table_fixture(8, |_| 1.0, |a, b| if a == b { 1.0 } else { 0.25 });
        for code in [[0u8; 8], [7; 8], [1, 2, 3, 4, 5, 6, 7, 8]] {
            assert_eq!(pq_distance(&code, &code, &cb), 0);
        }
    }

    #[test]
    fn symmetric_product_table_gives_symmetric_distance() {
        let cb = table_fixture(4, |_| 2.0, |a, b| ((a + b) as f32).sin());
        let x = [3, 50, 90, 200];
        let y = [4, 60, 100, 210];
        assert_eq!(pq_distance(&x, &y, &cb), pq_distance(&y, &x, &cb));
    }

    #[test]
    fn asymmetric_product_table_breaks_symmetry() {
        // Argument order reaches different table entries, so symmetry is a
        // property of the trained table, not of the engine.
        let cb = table_fixture(4, |_| 2.0, |a, b| if a < b { 0.9 } else { 0.1 });
        let x = [1, 1, 1, 1];
        let y = [200, 200, 200, 200];
        assert_ne!(pq_distance(&x, &y, &cb), pq_distance(&y, &x, &cb));
    }

    #[test]
    fn checked_rejects_wrong_length_codes() {
        let cb = table_fixture(8, |_| 1.0, |_, _| 1.0);
        let good = [0u8; 8];
        let short = [0u8; 4];
        assert_eq!(
            pq_distance_checked(&good, &short, &cb),
            Err(CodeError::LengthMismatch {
                expected: 8,
                actual: 4
            })
        );
        assert_eq!(
            pq_distance_checked(&short, &good, &cb),
            Err(CodeError::LengthMismatch {
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn checked_rejects_degenerate_norms() {
        // Byte 0 contributes nothing to the norm; an all-zero code is
        // degenerate while any other code is fine.
        let cb = table_fixture(4, |v| if v == 0 { 0.0 } else { 1.0 }, |_, _| 0.5);
        let zero = [0u8; 4];
        let live = [1u8; 4];
        assert_eq!(
            pq_distance_checked(&zero, &live, &cb),
            Err(CodeError::DegenerateNorm)
        );
        assert_eq!(
            pq_distance_checked(&live, &zero, &cb),
            Err(CodeError::DegenerateNorm)
        );
        assert!(pq_distance_checked(&live, &live, &cb).is_ok());
    }

    #[test]
    fn checked_matches_unchecked_on_valid_input() {
        let cb = table_fixture(8, |v| 1.0 + v as f32 / 512.0, |a, b| ((a * b) as f32).cos());
        let x = [5, 10, 15, 20, 25, 30, 35, 40];
        let y = [40, 35, 30, 25, 20, 15, 10, 5];
        assert_eq!(pq_distance_checked(&x, &y, &cb), Ok(pq_distance(&x, &y, &cb)));
    }
}
