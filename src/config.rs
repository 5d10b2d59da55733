//! Engine configuration.
//!
//! Every tunable lives here and every component takes it as input; nothing
//! reads configuration from global state.

use std::time::Duration;

/// Tunable parameters for vector eligibility, ranking, and caching.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum completeness score a vector needs to enter the candidate
    /// pool. Profiles below this carry essentially no signal and would only
    /// pollute results with noisy near-zero similarities.
    pub completeness_floor: f64,

    /// Minimum similarity a neighbor needs to be recommended.
    pub min_similarity: f64,

    /// Whether the similarity threshold is applied at all. Disabling it is
    /// a diagnostic mode: every neighbor passes through regardless of score.
    pub enforce_min_similarity: bool,

    /// Default number of neighbors to retrieve per query.
    pub default_k: usize,

    /// Upper bound on concurrent pairwise similarity lookups per request.
    pub knn_concurrency: usize,

    /// How long an assembled recommendation page stays valid in the
    /// in-memory result cache.
    pub result_cache_ttl: Duration,

    /// Completeness at or above which recommendation quality is "Medium".
    pub quality_medium: f64,

    /// Completeness at or above which recommendation quality is "High".
    pub quality_high: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            completeness_floor: 0.05,
            min_similarity: 0.3,
            enforce_min_similarity: true,
            default_k: 20,
            knn_concurrency: 16,
            result_cache_ttl: Duration::from_secs(15 * 60),
            quality_medium: 0.05,
            quality_high: 0.15,
        }
    }
}
