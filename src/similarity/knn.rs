//! Brute-force K-nearest-neighbor search over stored user vectors.
//!
//! Each pairwise lookup is independent, so the candidate loop fans out as
//! bounded-concurrency tasks. Sorting happens only after every lookup has
//! finished; the final ordering is deterministic regardless of completion
//! order.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::similarity::cache::PairwiseCache;
use crate::storage::VectorStore;
use crate::vector::builder::VectorBuilder;

/// One ranked candidate.
#[derive(Debug, Clone, Serialize)]
pub struct Neighbor {
    pub user_id: String,
    pub similarity: f64,
    pub completeness: f64,
}

/// KNN output plus the candidate-pool size for metadata.
#[derive(Debug, Clone, Serialize)]
pub struct KnnResult {
    pub neighbors: Vec<Neighbor>,
    /// Users that passed the completeness floor and were compared.
    pub candidates_considered: usize,
}

pub struct KnnSearch {
    builder: Arc<VectorBuilder>,
    vectors: Arc<dyn VectorStore>,
    cache: Arc<PairwiseCache>,
    config: EngineConfig,
}

impl KnnSearch {
    pub fn new(
        builder: Arc<VectorBuilder>,
        vectors: Arc<dyn VectorStore>,
        cache: Arc<PairwiseCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            builder,
            vectors,
            cache,
            config,
        }
    }

    /// Top-k users by similarity to the target, descending, ties broken by
    /// user id ascending. An empty candidate pool yields an empty result,
    /// not an error.
    pub async fn find_neighbors(&self, user_id: &str, k: usize) -> Result<KnnResult, EngineError> {
        let target = Arc::new(self.builder.get_or_build(user_id).await?);

        let candidates = self
            .vectors
            .candidates(user_id, self.config.completeness_floor)
            .await?;
        let candidates_considered = candidates.len();
        if candidates.is_empty() {
            info!(user = %user_id, "no candidates pass the completeness floor");
            return Ok(KnnResult {
                neighbors: Vec::new(),
                candidates_considered: 0,
            });
        }
        debug!(user = %user_id, candidates = candidates_considered, "scoring candidate pool");

        let semaphore = Arc::new(Semaphore::new(self.config.knn_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for candidate in candidates {
            let target = Arc::clone(&target);
            let cache = Arc::clone(&self.cache);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let similarity = cache.get_or_compute(&target, &candidate).await;
                Neighbor {
                    user_id: candidate.user_id,
                    similarity,
                    completeness: candidate.completeness,
                }
            });
        }

        let mut neighbors = Vec::with_capacity(candidates_considered);
        while let Some(joined) = tasks.join_next().await {
            neighbors.push(joined?);
        }

        neighbors.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        neighbors.truncate(k);

        Ok(KnnResult {
            neighbors,
            candidates_considered,
        })
    }
}
