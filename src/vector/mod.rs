//! User vector construction: attribute mapping, completeness, fingerprints.

pub mod builder;
pub mod encoder;
pub mod fingerprint;

use chrono::{DateTime, Utc};

use crate::schema::VECTOR_LEN;

/// The fixed-width binary indicator vector.
pub type Vector = [u8; VECTOR_LEN];

/// Per-segment change fingerprints, used to detect whether a cached
/// pairwise similarity is still valid without recomputing the vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentFingerprints {
    pub availability: String,
    pub sports: String,
    pub region: String,
    pub venues: String,
}

impl SegmentFingerprints {
    /// Single comparable rendering of all four fingerprints.
    pub fn combined(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.availability, self.sports, self.region, self.venues
        )
    }
}

/// A stored user vector. Always rebuilt wholesale from the current profile
/// snapshot, never patched in place.
#[derive(Debug, Clone)]
pub struct UserVector {
    pub user_id: String,
    pub vector: Vector,
    /// Fraction of meaningful slots that are non-zero, in [0, 1].
    /// Recomputed on every rebuild, never stale relative to the vector.
    pub completeness: f64,
    pub fingerprints: SegmentFingerprints,
    pub last_updated: DateTime<Utc>,
}
