//! Engine error taxonomy.

use thiserror::Error;

/// Errors surfaced by the recommendation engine.
///
/// Cache read/write failures are deliberately absent: the pairwise cache is
/// a performance optimization and fails open to direct computation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The profile snapshot backing a vector build could not be fetched.
    /// Fatal for that single user's build; other builds are unaffected.
    #[error("profile unavailable for user {0}")]
    ProfileUnavailable(String),

    /// A user has no stored vector. Recovered by triggering a build;
    /// surfaced only when the rebuild itself fails.
    #[error("no stored vector for user {0}")]
    MissingVector(String),

    /// A stored vector row could not be decoded back into a vector.
    #[error("stored vector for user {user_id} is corrupt: {reason}")]
    CorruptVector { user_id: String, reason: String },

    /// A stored profile attribute payload failed to deserialize.
    #[error("invalid profile data for user {user_id}: {source}")]
    Decode {
        user_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
