//! `peermatch vector` — build and inspect per-user attribute vectors.

use std::path::Path;

use anyhow::Result;

use crate::cli::output::{self, Styled};
use crate::cli::Engine;
use crate::schema;
use crate::storage::VectorStore;

/// Rebuild one user's vector from their stored profile.
pub async fn run_build(db: Option<&Path>, user_id: &str) -> Result<()> {
    let s = Styled::new();
    let engine = Engine::open(db)?;
    let vector = engine.builder.build(user_id).await?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "user_id": vector.user_id,
            "completeness": vector.completeness,
            "last_updated": vector.last_updated.to_rfc3339(),
        }));
    } else if !output::is_quiet() {
        eprintln!(
            "  {} Built vector for '{user_id}' (completeness {:.3}).",
            s.ok_sym(),
            vector.completeness
        );
    }
    Ok(())
}

/// Show the stored vector, broken down by schema segment.
pub async fn run_show(db: Option<&Path>, user_id: &str) -> Result<()> {
    let s = Styled::new();
    let engine = Engine::open(db)?;
    let vector = engine.builder.get_or_build(user_id).await?;

    if output::is_json() {
        let segments: Vec<_> = schema::meaningful_segments()
            .map(|seg| {
                let set: Vec<usize> = (seg.start..seg.end())
                    .filter(|&i| vector.vector[i] != 0)
                    .collect();
                serde_json::json!({ "segment": seg.name, "set_positions": set })
            })
            .collect();
        output::print_json(&serde_json::json!({
            "user_id": vector.user_id,
            "completeness": vector.completeness,
            "last_updated": vector.last_updated.to_rfc3339(),
            "fingerprint": vector.fingerprints.combined(),
            "segments": segments,
        }));
        return Ok(());
    }

    output::print_section(&s, &format!("Vector for '{user_id}'"));
    output::print_field("completeness", &format!("{:.3}", vector.completeness));
    output::print_field("updated", &vector.last_updated.to_rfc3339());
    for seg in schema::meaningful_segments() {
        let set = (seg.start..seg.end())
            .filter(|&i| vector.vector[i] != 0)
            .count();
        let summary = if set == 0 {
            s.dim("empty")
        } else {
            s.green(&format!("{set} of {}", seg.len))
        };
        output::print_field(seg.name, &summary);
    }
    Ok(())
}

/// Completeness, eligibility, and quality for one user.
pub async fn run_stats(db: Option<&Path>, user_id: &str) -> Result<()> {
    let s = Styled::new();
    let engine = Engine::open(db)?;
    let stats = engine.recommender.similarity_stats(user_id).await?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&stats)?);
        return Ok(());
    }

    output::print_section(&s, &format!("Similarity stats for '{user_id}'"));
    output::print_field(
        "vector",
        if stats.vector_exists {
            "present"
        } else {
            "missing"
        },
    );
    output::print_field("completeness", &format!("{:.3}", stats.completeness));
    output::print_field("quality", &format!("{:?}", stats.quality));
    output::print_field("eligible", if stats.eligible { "yes" } else { "no" });
    if !stats.suggestions.is_empty() {
        eprintln!();
        for suggestion in &stats.suggestions {
            eprintln!("    {} {suggestion}", s.warn_sym());
        }
    }
    Ok(())
}

/// List every known user with their vector completeness.
pub async fn run_list(db: Option<&Path>) -> Result<()> {
    let s = Styled::new();
    let engine = Engine::open(db)?;

    let mut rows = Vec::new();
    for id in engine.store.user_ids().await? {
        let vector = VectorStore::get(engine.store.as_ref(), &id).await?;
        rows.push((id, vector.map(|v| v.completeness)));
    }

    if output::is_json() {
        let items: Vec<_> = rows
            .iter()
            .map(|(id, completeness)| {
                serde_json::json!({ "user_id": id, "completeness": completeness })
            })
            .collect();
        output::print_json(&serde_json::Value::Array(items));
        return Ok(());
    }

    output::print_section(&s, "Users");
    for (id, completeness) in rows {
        match completeness {
            Some(c) => output::print_field(&id, &format!("{c:.3}")),
            None => output::print_field(&id, &s.dim("no vector")),
        }
    }
    Ok(())
}
