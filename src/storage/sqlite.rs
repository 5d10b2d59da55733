//! SQLite implementation of every storage contract.
//!
//! One connection guarded by an async mutex; each operation is a short
//! synchronous statement, so the lock is never held across an await.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::EngineError;
use crate::profile::{
    PublicProfile, RelationshipStatus, SportPreference, UserProfile, VenueDirectory,
    WeeklyAvailability,
};
use crate::schema::VECTOR_LEN;
use crate::storage::{
    CacheEntry, ProfileStore, RelationshipStore, SimilarityCacheStore, VectorStore,
};
use crate::vector::{SegmentFingerprints, UserVector};

/// A user row as imported or edited by the profile-owning surfaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub campus: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub play_style: Option<String>,
    #[serde(default)]
    pub sport_preferences: Vec<SportPreference>,
    #[serde(default)]
    pub available_hours: WeeklyAvailability,
    #[serde(default)]
    pub preferred_venues: Vec<String>,
}

/// SQLite-backed store for profiles, venues, relationships, vectors, and
/// the pairwise similarity cache.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Fresh in-memory database, for tests and scratch runs.
    pub fn open_in_memory() -> Result<Self, EngineError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, EngineError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                full_name TEXT,
                avatar_url TEXT,
                faculty TEXT,
                campus TEXT,
                gender TEXT,
                play_style TEXT,
                sport_preferences TEXT,
                available_hours TEXT,
                preferred_venues TEXT,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS venues (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS friendships (
                user_id TEXT NOT NULL,
                friend_id TEXT NOT NULL,
                status TEXT NOT NULL,
                PRIMARY KEY (user_id, friend_id)
            );
            CREATE TABLE IF NOT EXISTS user_vectors (
                user_id TEXT PRIMARY KEY,
                vector BLOB NOT NULL,
                completeness REAL NOT NULL,
                availability_fp TEXT NOT NULL,
                sports_fp TEXT NOT NULL,
                region_fp TEXT NOT NULL,
                venues_fp TEXT NOT NULL,
                last_updated TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS similarity_cache (
                user_id_a TEXT NOT NULL,
                user_id_b TEXT NOT NULL,
                similarity REAL NOT NULL,
                fingerprint_a TEXT NOT NULL,
                fingerprint_b TEXT NOT NULL,
                computed_at TEXT NOT NULL,
                PRIMARY KEY (user_id_a, user_id_b)
            );",
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Insert or replace a user row.
    pub async fn upsert_user(&self, user: &StoredUser) -> Result<(), EngineError> {
        let sports = encode_json(&user.id, &user.sport_preferences)?;
        let hours = encode_json(&user.id, &user.available_hours)?;
        let venues = encode_json(&user.id, &user.preferred_venues)?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO users
                (id, full_name, avatar_url, faculty, campus, gender, play_style,
                 sport_preferences, available_hours, preferred_venues)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user.id,
                user.full_name,
                user.avatar_url,
                user.faculty,
                user.campus,
                user.gender,
                user.play_style,
                sports,
                hours,
                venues,
            ],
        )?;
        Ok(())
    }

    pub async fn upsert_venue(&self, id: &str, name: &str) -> Result<(), EngineError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO venues (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(())
    }

    pub async fn set_relationship(
        &self,
        user_id: &str,
        friend_id: &str,
        status: RelationshipStatus,
    ) -> Result<(), EngineError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO friendships (user_id, friend_id, status)
             VALUES (?1, ?2, ?3)",
            params![user_id, friend_id, status.as_str()],
        )?;
        Ok(())
    }

    pub async fn user_ids(&self) -> Result<Vec<String>, EngineError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id FROM users ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Number of rows in the similarity cache.
    pub async fn cache_len(&self) -> Result<u64, EngineError> {
        let conn = self.conn.lock().await;
        let count: u64 =
            conn.query_row("SELECT COUNT(*) FROM similarity_cache", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn encode_json<T: Serialize>(user_id: &str, value: &T) -> Result<String, EngineError> {
    serde_json::to_string(value).map_err(|source| EngineError::Decode {
        user_id: user_id.to_string(),
        source,
    })
}

fn decode_json<T: for<'de> Deserialize<'de> + Default>(
    user_id: &str,
    raw: Option<String>,
) -> Result<T, EngineError> {
    match raw {
        Some(text) if !text.is_empty() => {
            serde_json::from_str(&text).map_err(|source| EngineError::Decode {
                user_id: user_id.to_string(),
                source,
            })
        }
        _ => Ok(T::default()),
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, EngineError> {
        type Row = (
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        );
        let row: Option<Row> = {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT sport_preferences, faculty, campus, gender, play_style,
                        available_hours, preferred_venues
                 FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .optional()?
        };

        let Some((sports, faculty, campus, gender, play_style, hours, venues)) = row else {
            return Ok(None);
        };

        Ok(Some(UserProfile {
            user_id: user_id.to_string(),
            sport_preferences: decode_json(user_id, sports)?,
            faculty,
            campus,
            gender,
            play_style,
            available_hours: decode_json(user_id, hours)?,
            preferred_venues: decode_json(user_id, venues)?,
        }))
    }

    async fn fetch_public_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<PublicProfile>, EngineError> {
        let conn = self.conn.lock().await;
        let profile = conn
            .query_row(
                "SELECT full_name, avatar_url, faculty, campus, play_style
                 FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(PublicProfile {
                        user_id: user_id.to_string(),
                        full_name: row.get(0)?,
                        avatar_url: row.get(1)?,
                        faculty: row.get(2)?,
                        campus: row.get(3)?,
                        play_style: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    async fn venue_directory(&self) -> Result<VenueDirectory, EngineError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id FROM venues ORDER BY name, id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(VenueDirectory::new(ids))
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserVector>, EngineError> {
        let row = {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT vector, completeness, availability_fp, sports_fp, region_fp,
                        venues_fp, last_updated
                 FROM user_vectors WHERE user_id = ?1",
                params![user_id],
                row_to_raw_vector,
            )
            .optional()?
        };
        match row {
            Some(raw) => Ok(Some(raw.into_user_vector(user_id)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, vector: &UserVector) -> Result<(), EngineError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO user_vectors
                (user_id, vector, completeness, availability_fp, sports_fp,
                 region_fp, venues_fp, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                vector.user_id,
                vector.vector.as_slice(),
                vector.completeness,
                vector.fingerprints.availability,
                vector.fingerprints.sports,
                vector.fingerprints.region,
                vector.fingerprints.venues,
                vector.last_updated.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn candidates(
        &self,
        exclude: &str,
        min_completeness: f64,
    ) -> Result<Vec<UserVector>, EngineError> {
        let rows = {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(
                "SELECT user_id, vector, completeness, availability_fp, sports_fp,
                        region_fp, venues_fp, last_updated
                 FROM user_vectors
                 WHERE user_id != ?1 AND completeness >= ?2
                 ORDER BY user_id",
            )?;
            let rows = stmt
                .query_map(params![exclude, min_completeness], |row| {
                    let user_id: String = row.get(0)?;
                    let raw = RawVectorRow {
                        vector: row.get(1)?,
                        completeness: row.get(2)?,
                        availability_fp: row.get(3)?,
                        sports_fp: row.get(4)?,
                        region_fp: row.get(5)?,
                        venues_fp: row.get(6)?,
                        last_updated: row.get(7)?,
                    };
                    Ok((user_id, raw))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        rows.into_iter()
            .map(|(user_id, raw)| raw.into_user_vector(&user_id))
            .collect()
    }
}

#[async_trait]
impl RelationshipStore for SqliteStore {
    async fn status_between(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<RelationshipStatus, EngineError> {
        let conn = self.conn.lock().await;
        let status: Option<String> = conn
            .query_row(
                "SELECT status FROM friendships
                 WHERE (user_id = ?1 AND friend_id = ?2)
                    OR (user_id = ?2 AND friend_id = ?1)
                 LIMIT 1",
                params![user_a, user_b],
                |row| row.get(0),
            )
            .optional()?;
        Ok(status
            .map(|s| RelationshipStatus::parse(&s))
            .unwrap_or(RelationshipStatus::None))
    }
}

#[async_trait]
impl SimilarityCacheStore for SqliteStore {
    async fn get(
        &self,
        user_id_a: &str,
        user_id_b: &str,
    ) -> Result<Option<CacheEntry>, EngineError> {
        let row = {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT similarity, fingerprint_a, fingerprint_b, computed_at
                 FROM similarity_cache WHERE user_id_a = ?1 AND user_id_b = ?2",
                params![user_id_a, user_id_b],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?
        };
        let Some((similarity, fingerprint_a, fingerprint_b, computed_at)) = row else {
            return Ok(None);
        };
        Ok(Some(CacheEntry {
            user_id_a: user_id_a.to_string(),
            user_id_b: user_id_b.to_string(),
            similarity,
            fingerprint_a,
            fingerprint_b,
            computed_at: parse_timestamp(user_id_a, &computed_at)?,
        }))
    }

    async fn put(&self, entry: &CacheEntry) -> Result<(), EngineError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO similarity_cache
                (user_id_a, user_id_b, similarity, fingerprint_a, fingerprint_b, computed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.user_id_a,
                entry.user_id_b,
                entry.similarity,
                entry.fingerprint_a,
                entry.fingerprint_b,
                entry.computed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn purge_user(&self, user_id: &str) -> Result<u64, EngineError> {
        let conn = self.conn.lock().await;
        let removed = conn.execute(
            "DELETE FROM similarity_cache WHERE user_id_a = ?1 OR user_id_b = ?1",
            params![user_id],
        )?;
        Ok(removed as u64)
    }
}

struct RawVectorRow {
    vector: Vec<u8>,
    completeness: f64,
    availability_fp: String,
    sports_fp: String,
    region_fp: String,
    venues_fp: String,
    last_updated: String,
}

fn row_to_raw_vector(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawVectorRow> {
    Ok(RawVectorRow {
        vector: row.get(0)?,
        completeness: row.get(1)?,
        availability_fp: row.get(2)?,
        sports_fp: row.get(3)?,
        region_fp: row.get(4)?,
        venues_fp: row.get(5)?,
        last_updated: row.get(6)?,
    })
}

impl RawVectorRow {
    fn into_user_vector(self, user_id: &str) -> Result<UserVector, EngineError> {
        let len = self.vector.len();
        let vector: [u8; VECTOR_LEN] =
            self.vector
                .try_into()
                .map_err(|_| EngineError::CorruptVector {
                    user_id: user_id.to_string(),
                    reason: format!("expected {VECTOR_LEN} bytes, found {len}"),
                })?;
        Ok(UserVector {
            user_id: user_id.to_string(),
            vector,
            completeness: self.completeness,
            fingerprints: SegmentFingerprints {
                availability: self.availability_fp,
                sports: self.sports_fp,
                region: self.region_fp,
                venues: self.venues_fp,
            },
            last_updated: parse_timestamp(user_id, &self.last_updated)?,
        })
    }
}

fn parse_timestamp(user_id: &str, raw: &str) -> Result<DateTime<Utc>, EngineError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| EngineError::CorruptVector {
            user_id: user_id.to_string(),
            reason: format!("bad timestamp {raw:?}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::fingerprint::fingerprints_for;

    fn vector_for(user_id: &str, bits: &[usize]) -> UserVector {
        let mut vector = [0u8; VECTOR_LEN];
        for &i in bits {
            vector[i] = 1;
        }
        UserVector {
            user_id: user_id.to_string(),
            vector,
            completeness: bits.len() as f64 / 137.0,
            fingerprints: fingerprints_for(&UserProfile::default()),
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn vector_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let v = vector_for("alice", &[0, 33, 40]);
        VectorStore::put(&store, &v).await.unwrap();

        let loaded = VectorStore::get(&store, "alice").await.unwrap().unwrap();
        assert_eq!(loaded.vector, v.vector);
        assert_eq!(loaded.fingerprints, v.fingerprints);
        assert!((loaded.completeness - v.completeness).abs() < 1e-12);
    }

    #[tokio::test]
    async fn candidates_respect_completeness_floor() {
        let store = SqliteStore::open_in_memory().unwrap();
        VectorStore::put(&store, &vector_for("a", &[0])).await.unwrap(); // 1/137 < 0.05
        VectorStore::put(&store, &vector_for("b", &(0..10).collect::<Vec<_>>())).await.unwrap();
        VectorStore::put(&store, &vector_for("c", &(0..20).collect::<Vec<_>>())).await.unwrap();

        let pool = store.candidates("c", 0.05).await.unwrap();
        let ids: Vec<_> = pool.iter().map(|v| v.user_id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn relationship_lookup_checks_both_orientations() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .set_relationship("alice", "bob", RelationshipStatus::Pending)
            .await
            .unwrap();

        let status = store.status_between("bob", "alice").await.unwrap();
        assert_eq!(status, RelationshipStatus::Pending);
        let none = store.status_between("alice", "carol").await.unwrap();
        assert_eq!(none, RelationshipStatus::None);
    }

    #[tokio::test]
    async fn profile_roundtrip_preserves_attribute_payloads() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = StoredUser {
            id: "alice".to_string(),
            full_name: Some("Alice".to_string()),
            faculty: Some("COMPUTER SCIENCES".to_string()),
            campus: Some("SELANGOR".to_string()),
            sport_preferences: vec![SportPreference {
                name: "Basketball".to_string(),
                level: "Beginner".to_string(),
            }],
            ..Default::default()
        };
        store.upsert_user(&user).await.unwrap();

        let profile = store.fetch_profile("alice").await.unwrap().unwrap();
        assert_eq!(profile.sport_preferences.len(), 1);
        assert_eq!(profile.faculty.as_deref(), Some("COMPUTER SCIENCES"));

        let public = store.fetch_public_profile("alice").await.unwrap().unwrap();
        assert_eq!(public.full_name.as_deref(), Some("Alice"));
        assert!(store.fetch_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn venue_directory_orders_by_name() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_venue("v9", "Court Z").await.unwrap();
        store.upsert_venue("v1", "Court A").await.unwrap();

        let dir = store.venue_directory().await.unwrap();
        assert_eq!(dir.index_of("v1"), Some(0));
        assert_eq!(dir.index_of("v9"), Some(1));
    }

    #[tokio::test]
    async fn purge_user_removes_both_sides() {
        let store = SqliteStore::open_in_memory().unwrap();
        let entry = CacheEntry {
            user_id_a: "alice".to_string(),
            user_id_b: "bob".to_string(),
            similarity: 0.5,
            fingerprint_a: "fa".to_string(),
            fingerprint_b: "fb".to_string(),
            computed_at: Utc::now(),
        };
        SimilarityCacheStore::put(&store, &entry).await.unwrap();
        assert_eq!(store.cache_len().await.unwrap(), 1);

        assert_eq!(SimilarityCacheStore::purge_user(&store, "bob").await.unwrap(), 1);
        assert_eq!(store.cache_len().await.unwrap(), 0);
    }
}
