//! Pairwise similarity cache with fingerprint-based staleness detection.
//!
//! One row per unordered user pair, keyed canonically. A hit requires the
//! stored fingerprints of both vectors to match the current ones; anything
//! else recomputes and overwrites the row. Every storage failure on this
//! path fails open: caching is a performance optimization, never a
//! correctness dependency.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::similarity::jaccard::jaccard;
use crate::storage::{canonical_pair, CacheEntry, SimilarityCacheStore};
use crate::vector::UserVector;

pub struct PairwiseCache {
    store: Arc<dyn SimilarityCacheStore>,
}

impl PairwiseCache {
    pub fn new(store: Arc<dyn SimilarityCacheStore>) -> Self {
        Self { store }
    }

    /// Cached similarity for a pair, recomputing on miss or stale
    /// fingerprints. Never fails: cache errors degrade to direct
    /// computation.
    pub async fn get_or_compute(&self, a: &UserVector, b: &UserVector) -> f64 {
        let (first, second) = if canonical_pair(&a.user_id, &b.user_id).0 == a.user_id {
            (a, b)
        } else {
            (b, a)
        };
        let fp_first = first.fingerprints.combined();
        let fp_second = second.fingerprints.combined();

        match self.store.get(&first.user_id, &second.user_id).await {
            Ok(Some(entry))
                if entry.fingerprint_a == fp_first && entry.fingerprint_b == fp_second =>
            {
                debug!(a = %first.user_id, b = %second.user_id, "similarity cache hit");
                return entry.similarity;
            }
            Ok(Some(_)) => {
                debug!(a = %first.user_id, b = %second.user_id, "similarity cache stale");
            }
            Ok(None) => {}
            Err(e) => {
                warn!(a = %first.user_id, b = %second.user_id, error = %e,
                    "similarity cache read failed, computing directly");
            }
        }

        let similarity = jaccard(&first.vector, &second.vector);

        let entry = CacheEntry {
            user_id_a: first.user_id.clone(),
            user_id_b: second.user_id.clone(),
            similarity,
            fingerprint_a: fp_first,
            fingerprint_b: fp_second,
            computed_at: Utc::now(),
        };
        if let Err(e) = self.store.put(&entry).await {
            warn!(a = %entry.user_id_a, b = %entry.user_id_b, error = %e,
                "similarity cache write failed, continuing uncached");
        }

        similarity
    }

    /// Drop every cached pair touching this user. Storage hygiene after a
    /// vector rebuild; the fingerprint check alone already guarantees
    /// correctness.
    pub async fn purge_user(&self, user_id: &str) -> u64 {
        match self.store.purge_user(user_id).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(user = %user_id, error = %e, "similarity cache purge failed");
                0
            }
        }
    }
}
