//! Build and persist user vectors from profile snapshots.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::storage::{ProfileStore, SimilarityCacheStore, VectorStore};
use crate::vector::{encoder, fingerprint, UserVector};

/// Rebuilds a user's vector wholesale from the current profile snapshot.
///
/// Never persists a partial vector: a fetch failure aborts the build before
/// anything is written. After a successful rebuild the user's pairwise
/// cache rows are purged; the fingerprint check would catch them lazily
/// anyway, this just keeps the table from accumulating dead rows.
pub struct VectorBuilder {
    profiles: Arc<dyn ProfileStore>,
    vectors: Arc<dyn VectorStore>,
    cache: Arc<dyn SimilarityCacheStore>,
}

impl VectorBuilder {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        vectors: Arc<dyn VectorStore>,
        cache: Arc<dyn SimilarityCacheStore>,
    ) -> Self {
        Self {
            profiles,
            vectors,
            cache,
        }
    }

    /// Build the vector from the current profile and replace the stored row.
    pub async fn build(&self, user_id: &str) -> Result<UserVector, EngineError> {
        let profile = self
            .profiles
            .fetch_profile(user_id)
            .await?
            .ok_or_else(|| EngineError::ProfileUnavailable(user_id.to_string()))?;

        let directory = self.profiles.venue_directory().await?;
        let (vector, completeness) = encoder::encode_profile(&profile, &directory);
        let fingerprints = fingerprint::fingerprints_for(&profile);

        let user_vector = UserVector {
            user_id: user_id.to_string(),
            vector,
            completeness,
            fingerprints,
            last_updated: Utc::now(),
        };
        self.vectors.put(&user_vector).await?;

        match self.cache.purge_user(user_id).await {
            Ok(removed) if removed > 0 => {
                info!(user = %user_id, removed, "purged stale pairwise cache rows");
            }
            Ok(_) => {}
            Err(e) => warn!(user = %user_id, error = %e, "pairwise cache purge failed"),
        }

        info!(user = %user_id, completeness, "vector rebuilt");
        Ok(user_vector)
    }

    /// Stored vector, or a lazy build on first use. Vector absence means
    /// "needs build", never "zero similarity".
    pub async fn get_or_build(&self, user_id: &str) -> Result<UserVector, EngineError> {
        if let Some(existing) = self.vectors.get(user_id).await? {
            return Ok(existing);
        }
        info!(user = %user_id, "no stored vector, building lazily");
        self.build(user_id).await
    }
}
