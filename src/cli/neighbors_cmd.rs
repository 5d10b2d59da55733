//! `peermatch neighbors` — raw K-nearest-neighbor lookup, before any
//! recommendation filtering.

use std::path::Path;

use anyhow::Result;

use crate::cli::output::{self, Styled};
use crate::cli::Engine;

pub async fn run(db: Option<&Path>, user_id: &str, k: usize) -> Result<()> {
    let s = Styled::new();
    let engine = Engine::open(db)?;
    let result = engine.knn.find_neighbors(user_id, k).await?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&result)?);
        return Ok(());
    }

    output::print_section(
        &s,
        &format!(
            "Top {} of {} candidate(s) for '{user_id}'",
            result.neighbors.len(),
            result.candidates_considered
        ),
    );
    for neighbor in &result.neighbors {
        output::print_field(
            &neighbor.user_id,
            &format!(
                "{} {}",
                s.cyan(&format!("{:.4}", neighbor.similarity)),
                s.dim(&format!("completeness {:.3}", neighbor.completeness))
            ),
        );
    }
    if result.neighbors.is_empty() && !output::is_quiet() {
        eprintln!("    {}", s.dim("no candidates pass the completeness floor"));
    }
    Ok(())
}
