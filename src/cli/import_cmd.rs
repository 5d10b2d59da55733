//! `peermatch import` — load users, venues, and friendships from a JSON
//! snapshot, then rebuild every affected vector.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::cli::output::{self, Styled};
use crate::cli::Engine;
use crate::profile::RelationshipStatus;
use crate::storage::sqlite::StoredUser;

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    venues: Vec<VenueRecord>,
    #[serde(default)]
    users: Vec<StoredUser>,
    #[serde(default)]
    friendships: Vec<FriendshipRecord>,
}

#[derive(Debug, Deserialize)]
struct VenueRecord {
    #[serde(default)]
    id: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct FriendshipRecord {
    user_id: String,
    friend_id: String,
    status: String,
}

pub async fn run(db: Option<&Path>, file: &Path, rebuild: bool) -> Result<()> {
    let s = Styled::new();
    let engine = Engine::open(db)?;

    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading snapshot {}", file.display()))?;
    let snapshot: Snapshot =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", file.display()))?;

    for venue in &snapshot.venues {
        let id = venue
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        engine.store.upsert_venue(&id, &venue.name).await?;
    }

    for user in &snapshot.users {
        engine.store.upsert_user(user).await?;
    }

    let mut skipped_friendships = 0;
    for f in &snapshot.friendships {
        let status = RelationshipStatus::parse(&f.status);
        if status == RelationshipStatus::None && f.status != "none" {
            skipped_friendships += 1;
            continue;
        }
        engine
            .store
            .set_relationship(&f.user_id, &f.friend_id, status)
            .await?;
    }

    let mut rebuilt = 0;
    if rebuild {
        for user in &snapshot.users {
            engine.builder.build(&user.id).await.with_context(|| {
                format!("building vector for imported user {}", user.id)
            })?;
            rebuilt += 1;
        }
    }

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "venues": snapshot.venues.len(),
            "users": snapshot.users.len(),
            "friendships": snapshot.friendships.len() - skipped_friendships,
            "skipped_friendships": skipped_friendships,
            "vectors_rebuilt": rebuilt,
        }));
    } else if !output::is_quiet() {
        eprintln!(
            "  {} Imported {} venue(s), {} user(s), {} friendship(s).",
            s.ok_sym(),
            snapshot.venues.len(),
            snapshot.users.len(),
            snapshot.friendships.len() - skipped_friendships
        );
        if skipped_friendships > 0 {
            eprintln!(
                "  {} Skipped {skipped_friendships} friendship(s) with unknown status.",
                s.warn_sym()
            );
        }
        if rebuild {
            eprintln!("  {} Rebuilt {rebuilt} vector(s).", s.ok_sym());
        }
    }

    Ok(())
}
