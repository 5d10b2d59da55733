//! `peermatch cache` — inspect and purge the pairwise similarity cache.

use std::path::Path;

use anyhow::Result;

use crate::cli::output::{self, Styled};
use crate::cli::Engine;
use crate::storage::SimilarityCacheStore;

/// Drop every cached pair involving one user.
pub async fn run_purge(db: Option<&Path>, user_id: &str) -> Result<()> {
    let s = Styled::new();
    let engine = Engine::open(db)?;
    let removed = SimilarityCacheStore::purge_user(engine.store.as_ref(), user_id).await?;
    engine.recommender.invalidate_user(user_id);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "user_id": user_id,
            "removed": removed,
        }));
    } else if !output::is_quiet() {
        if removed > 0 {
            eprintln!("  {} Purged {removed} cached pair(s) for '{user_id}'.", s.ok_sym());
        } else {
            eprintln!("  No cached pairs for '{user_id}'.");
        }
    }
    Ok(())
}

/// Count cached pairs.
pub async fn run_status(db: Option<&Path>) -> Result<()> {
    let s = Styled::new();
    let engine = Engine::open(db)?;
    let pairs = engine.store.cache_len().await?;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "cached_pairs": pairs }));
    } else if !output::is_quiet() {
        output::print_section(&s, "Similarity cache");
        output::print_field("cached pairs", &pairs.to_string());
    }
    Ok(())
}
