//! Turn ranked neighbors into user-facing recommendation pages.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::profile::PublicProfile;
use crate::recommend::explain::similarity_explanation;
use crate::recommend::result_cache::{Clock, ResultCache, ResultKey, SystemClock};
use crate::similarity::knn::KnnSearch;
use crate::storage::{ProfileStore, RelationshipStore, VectorStore};
use crate::vector::builder::VectorBuilder;

/// Identifier reported in page metadata so consumers can tell which
/// ranking algorithm produced a page.
pub const ALGORITHM: &str = "knn-jaccard-v1";

/// Query options for one recommendation request.
#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub limit: usize,
    pub offset: usize,
    /// Neighbors to retrieve before filtering.
    pub k: usize,
    pub min_similarity: f64,
    /// Disabling the threshold is a diagnostic mode: all k neighbors pass.
    pub enforce_min_similarity: bool,
}

impl RecommendOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            limit: 10,
            offset: 0,
            k: config.default_k,
            min_similarity: config.min_similarity,
            enforce_min_similarity: config.enforce_min_similarity,
        }
    }
}

impl Hash for RecommendOptions {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.limit.hash(state);
        self.offset.hash(state);
        self.k.hash(state);
        self.min_similarity.to_bits().hash(state);
        self.enforce_min_similarity.hash(state);
    }
}

/// One user-facing recommendation record.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub user_id: String,
    pub similarity: f64,
    pub explanation: String,
    pub profile: PublicProfile,
}

/// Page metadata: how many were analyzed and under what settings, so the
/// consumer can show "why" and "how many".
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub count: usize,
    pub total_available: usize,
    pub candidates_considered: usize,
    pub neighbors_ranked: usize,
    pub filtered_active_relationships: usize,
    /// `None` when the threshold was disabled for this request.
    pub min_similarity: Option<f64>,
    pub k: usize,
    pub algorithm: &'static str,
}

/// A well-formed (possibly empty) paginated response.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationPage {
    pub recommendations: Vec<Recommendation>,
    pub metadata: PageMeta,
}

/// Recommendation quality band derived from vector completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quality {
    High,
    Medium,
    Low,
    None,
}

/// Profile-signal summary for one user.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityStats {
    pub vector_exists: bool,
    pub just_built: bool,
    pub completeness: f64,
    pub last_updated: Option<DateTime<Utc>>,
    /// Whether this user passes the completeness floor as a candidate.
    pub eligible: bool,
    pub quality: Quality,
    pub suggestions: Vec<String>,
}

pub struct Recommender {
    knn: Arc<KnnSearch>,
    builder: Arc<VectorBuilder>,
    vectors: Arc<dyn VectorStore>,
    profiles: Arc<dyn ProfileStore>,
    relationships: Arc<dyn RelationshipStore>,
    results: ResultCache<RecommendationPage>,
    config: EngineConfig,
}

impl Recommender {
    pub fn new(
        knn: Arc<KnnSearch>,
        builder: Arc<VectorBuilder>,
        vectors: Arc<dyn VectorStore>,
        profiles: Arc<dyn ProfileStore>,
        relationships: Arc<dyn RelationshipStore>,
        config: EngineConfig,
    ) -> Self {
        Self::with_clock(
            knn,
            builder,
            vectors,
            profiles,
            relationships,
            config,
            Arc::new(SystemClock),
        )
    }

    pub fn with_clock(
        knn: Arc<KnnSearch>,
        builder: Arc<VectorBuilder>,
        vectors: Arc<dyn VectorStore>,
        profiles: Arc<dyn ProfileStore>,
        relationships: Arc<dyn RelationshipStore>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let results = ResultCache::new(config.result_cache_ttl, clock);
        Self {
            knn,
            builder,
            vectors,
            profiles,
            relationships,
            results,
            config,
        }
    }

    /// Assemble a paginated recommendation page. Always well-formed: data
    /// problems shrink the page instead of failing the request.
    pub async fn recommend(
        &self,
        user_id: &str,
        options: &RecommendOptions,
    ) -> Result<RecommendationPage, EngineError> {
        let key = ResultKey::new(user_id, options);
        if let Some(page) = self.results.get(&key) {
            debug!(user = %user_id, "returning cached recommendation page");
            return Ok(page);
        }

        let knn_result = self.knn.find_neighbors(user_id, options.k).await?;
        let neighbors_ranked = knn_result.neighbors.len();

        let threshold = options
            .enforce_min_similarity
            .then_some(options.min_similarity);
        let passing = knn_result
            .neighbors
            .into_iter()
            .filter(|n| threshold.map_or(true, |t| n.similarity >= t));

        // Neighbors arrive sorted; filtering preserves the order, so the
        // page ordering stays deterministic.
        let mut records = Vec::new();
        let mut filtered_active = 0;
        for neighbor in passing {
            let status = self
                .relationships
                .status_between(user_id, &neighbor.user_id)
                .await?;
            if status.is_active() {
                filtered_active += 1;
                continue;
            }

            let Some(profile) = self.profiles.fetch_public_profile(&neighbor.user_id).await?
            else {
                warn!(user = %neighbor.user_id, "neighbor vector has no profile row, skipping");
                continue;
            };
            let display_name = profile
                .full_name
                .clone()
                .unwrap_or_else(|| "This user".to_string());
            records.push(Recommendation {
                user_id: neighbor.user_id,
                similarity: neighbor.similarity,
                explanation: similarity_explanation(neighbor.similarity, &display_name),
                profile,
            });
        }

        let total_available = records.len();
        let page: Vec<Recommendation> = records
            .into_iter()
            .skip(options.offset)
            .take(options.limit)
            .collect();

        let page = RecommendationPage {
            metadata: PageMeta {
                count: page.len(),
                total_available,
                candidates_considered: knn_result.candidates_considered,
                neighbors_ranked,
                filtered_active_relationships: filtered_active,
                min_similarity: threshold,
                k: options.k,
                algorithm: ALGORITHM,
            },
            recommendations: page,
        };

        info!(
            user = %user_id,
            returned = page.metadata.count,
            available = total_available,
            analyzed = page.metadata.candidates_considered,
            "assembled recommendation page"
        );
        self.results.put(key, page.clone());
        Ok(page)
    }

    /// Vector existence, completeness, and quality band for one user,
    /// building the vector lazily when absent. A build that fails because
    /// the profile is unreadable degrades to a "no data" answer.
    pub async fn similarity_stats(&self, user_id: &str) -> Result<SimilarityStats, EngineError> {
        let (vector, just_built) = match self.vectors.get(user_id).await? {
            Some(v) => (Some(v), false),
            None => match self.builder.build(user_id).await {
                Ok(v) => (Some(v), true),
                Err(EngineError::ProfileUnavailable(_)) => (None, false),
                Err(e) => return Err(e),
            },
        };

        let Some(vector) = vector else {
            return Ok(SimilarityStats {
                vector_exists: false,
                just_built: false,
                completeness: 0.0,
                last_updated: None,
                eligible: false,
                quality: Quality::None,
                suggestions: vec!["Complete your profile to get recommendations".to_string()],
            });
        };

        let completeness = vector.completeness;
        let quality = if completeness >= self.config.quality_high {
            Quality::High
        } else if completeness >= self.config.quality_medium {
            Quality::Medium
        } else {
            Quality::Low
        };
        let suggestions = if completeness < self.config.completeness_floor {
            vec![
                "Add sport preferences to your profile".to_string(),
                "Set your available hours for playing".to_string(),
                "Select preferred venues".to_string(),
                "Complete your faculty and campus information".to_string(),
            ]
        } else {
            Vec::new()
        };

        Ok(SimilarityStats {
            vector_exists: true,
            just_built,
            completeness,
            last_updated: Some(vector.last_updated),
            eligible: completeness >= self.config.completeness_floor,
            quality,
            suggestions,
        })
    }

    /// Drop cached pages for a user, e.g. after their vector is rebuilt.
    pub fn invalidate_user(&self, user_id: &str) {
        self.results.invalidate_user(user_id);
    }
}
