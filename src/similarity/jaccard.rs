//! Jaccard similarity over the meaningful vector prefix.
//!
//! Profile vectors are extremely sparse binary indicators. Euclidean or
//! cosine distance over-rewards shared *absence* on such vectors; Jaccard
//! ignores positions where both users are silent, which is the semantic we
//! want: similarity of what both users actually stated. Padding slots are
//! never inspected.

use serde::Serialize;

use crate::schema::{self, MEANINGFUL_LEN};
use crate::vector::{UserVector, Vector};

/// Jaccard similarity in [0, 1]. Symmetric and pure; two all-zero profiles
/// are defined as 0.0 similar rather than undefined.
pub fn jaccard(a: &Vector, b: &Vector) -> f64 {
    let (intersection, union) = overlap(a, b, 0, MEANINGFUL_LEN);
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Intersection and union counts over a slot range.
fn overlap(a: &Vector, b: &Vector, start: usize, end: usize) -> (usize, usize) {
    let mut intersection = 0;
    let mut union = 0;
    for i in start..end {
        let x = a[i] != 0;
        let y = b[i] != 0;
        if x && y {
            intersection += 1;
        }
        if x || y {
            union += 1;
        }
    }
    (intersection, union)
}

/// Per-segment overlap, for explanation UIs.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentOverlap {
    pub segment: &'static str,
    pub intersection: usize,
    pub union: usize,
    /// `None` when neither user has signal in this segment.
    pub ratio: Option<f64>,
}

/// Similarity with a structured breakdown and a confidence estimate.
///
/// Confidence discounts weak-data comparisons (tiny union, near-empty
/// profiles) without ever being folded into the similarity number itself;
/// the primary metric stays auditable.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityReport {
    pub similarity: f64,
    pub confidence: f64,
    pub segments: Vec<SegmentOverlap>,
}

/// Union size at which confidence from evidence volume saturates.
const EVIDENCE_SATURATION: f64 = 10.0;
/// Completeness at which confidence from profile depth saturates.
const COMPLETENESS_SATURATION: f64 = 0.15;

/// Build a full report for a pair of stored vectors.
pub fn report(a: &UserVector, b: &UserVector) -> SimilarityReport {
    let similarity = jaccard(&a.vector, &b.vector);

    let segments = schema::meaningful_segments()
        .map(|seg| {
            let (intersection, union) = overlap(&a.vector, &b.vector, seg.start, seg.end());
            SegmentOverlap {
                segment: seg.name,
                intersection,
                union,
                ratio: (union > 0).then(|| intersection as f64 / union as f64),
            }
        })
        .collect();

    let (_, union) = overlap(&a.vector, &b.vector, 0, MEANINGFUL_LEN);
    let evidence = (union as f64 / EVIDENCE_SATURATION).min(1.0);
    let depth = (a.completeness.min(b.completeness) / COMPLETENESS_SATURATION).min(1.0);

    SimilarityReport {
        similarity,
        confidence: evidence * depth,
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::VECTOR_LEN;

    fn vec_with(bits: &[usize]) -> Vector {
        let mut v = [0u8; VECTOR_LEN];
        for &i in bits {
            v[i] = 1;
        }
        v
    }

    #[test]
    fn shared_two_of_three_bits_is_two_thirds() {
        // Basketball-Beginner + COMPUTER SCIENCES on both sides; SELANGOR
        // only on one.
        let a = vec_with(&[0, 33]);
        let b = vec_with(&[0, 33, 40]);
        let sim = jaccard(&a, &b);
        assert!((sim - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_vectors_score_zero() {
        let a = vec_with(&[0, 1, 2, 3]);
        let b = vec_with(&[40, 41, 42]);
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = vec_with(&[0, 5, 77]);
        let b = vec_with(&[5, 33, 108]);
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    }

    #[test]
    fn both_all_zero_is_zero_not_one() {
        let z = [0u8; VECTOR_LEN];
        assert_eq!(jaccard(&z, &z), 0.0);
    }

    #[test]
    fn identity_with_signal_is_one() {
        let a = vec_with(&[2, 59, 136]);
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn padding_never_affects_similarity() {
        let a = vec_with(&[0, 33]);
        let b = vec_with(&[0, 40]);
        let base = jaccard(&a, &b);

        for pad in 137..VECTOR_LEN {
            let mut a2 = a;
            let mut b2 = b;
            a2[pad] = 1;
            b2[pad] = 1;
            assert_eq!(jaccard(&a2, &b2), base);
        }
    }

    #[test]
    fn adding_a_matching_bit_never_lowers_similarity() {
        let a = vec_with(&[0, 33, 40, 59]);
        let b = vec_with(&[0, 33]);
        let before = jaccard(&a, &b);

        // Position 40 is set in A, previously 0 in B.
        let mut b2 = b;
        b2[40] = 1;
        let after = jaccard(&a, &b2);
        assert!(after >= before);
    }

    #[test]
    fn range_stays_in_unit_interval() {
        let cases = [
            (vec_with(&[]), vec_with(&[])),
            (vec_with(&[0]), vec_with(&[0])),
            (vec_with(&(0..137).collect::<Vec<_>>()), vec_with(&[1])),
        ];
        for (a, b) in &cases {
            let sim = jaccard(a, b);
            assert!((0.0..=1.0).contains(&sim));
        }
    }

    fn stored(bits: &[usize]) -> UserVector {
        use crate::profile::UserProfile;
        use crate::vector::fingerprint::fingerprints_for;
        UserVector {
            user_id: "u".to_string(),
            vector: vec_with(bits),
            completeness: bits.len() as f64 / MEANINGFUL_LEN as f64,
            fingerprints: fingerprints_for(&UserProfile::default()),
            last_updated: chrono::Utc::now(),
        }
    }

    #[test]
    fn report_breaks_down_by_segment() {
        let a = stored(&[0, 33]);
        let b = stored(&[0, 33, 40]);
        let rep = report(&a, &b);

        assert!((rep.similarity - 2.0 / 3.0).abs() < 1e-9);
        let sports = rep.segments.iter().find(|s| s.segment == "sport_skills").unwrap();
        assert_eq!((sports.intersection, sports.union), (1, 1));
        let region = rep.segments.iter().find(|s| s.segment == "region").unwrap();
        assert_eq!((region.intersection, region.union), (0, 1));
        assert!(rep.segments.iter().all(|s| s.segment != "padding"));
    }

    #[test]
    fn confidence_discounts_sparse_pairs_without_touching_similarity() {
        let sparse_a = stored(&[0]);
        let sparse_b = stored(&[0]);
        let sparse = report(&sparse_a, &sparse_b);
        assert_eq!(sparse.similarity, 1.0);
        assert!(sparse.confidence < 0.2);

        let rich_bits: Vec<usize> = (0..30).collect();
        let rich_a = stored(&rich_bits);
        let rich_b = stored(&rich_bits);
        let rich = report(&rich_a, &rich_b);
        assert_eq!(rich.similarity, 1.0);
        assert_eq!(rich.confidence, 1.0);
    }
}
