//! Storage contracts for the engine's collaborators.
//!
//! The engine reads profiles and relationship state, and owns two derived
//! stores: user vectors and the pairwise similarity cache. Everything is
//! behind small async traits so tests can substitute failing or in-memory
//! implementations.

pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::profile::{PublicProfile, RelationshipStatus, UserProfile, VenueDirectory};
use crate::vector::UserVector;

/// Read-only access to profile snapshots and the venue listing.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, EngineError>;

    async fn fetch_public_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<PublicProfile>, EngineError>;

    /// Venues in stable listing order (ordered by name).
    async fn venue_directory(&self) -> Result<VenueDirectory, EngineError>;
}

/// Persistence for derived user vectors. Rows are replaced wholesale.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserVector>, EngineError>;

    async fn put(&self, vector: &UserVector) -> Result<(), EngineError>;

    /// All vectors except `exclude` whose completeness is at or above the
    /// floor.
    async fn candidates(
        &self,
        exclude: &str,
        min_completeness: f64,
    ) -> Result<Vec<UserVector>, EngineError>;
}

/// Relationship state between two users, as the relationship collaborator
/// reports it.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    async fn status_between(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<RelationshipStatus, EngineError>;
}

/// One cached pairwise similarity. Keys are stored in canonical order so
/// (A, B) and (B, A) resolve to one row.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub user_id_a: String,
    pub user_id_b: String,
    pub similarity: f64,
    /// Combined segment fingerprints of each vector at computation time.
    pub fingerprint_a: String,
    pub fingerprint_b: String,
    pub computed_at: DateTime<Utc>,
}

/// Backing store for the pairwise similarity cache. Callers pass ids in
/// canonical order; see [`canonical_pair`].
#[async_trait]
pub trait SimilarityCacheStore: Send + Sync {
    async fn get(&self, user_id_a: &str, user_id_b: &str)
        -> Result<Option<CacheEntry>, EngineError>;

    /// Insert or overwrite the row for this pair.
    async fn put(&self, entry: &CacheEntry) -> Result<(), EngineError>;

    /// Delete every row touching this user. Returns the rows removed.
    async fn purge_user(&self, user_id: &str) -> Result<u64, EngineError>;
}

/// Order an unordered pair canonically: lexicographically smaller id first.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
