//! `peermatch recommend` — assemble a recommendation page for one user.

use std::path::Path;

use anyhow::Result;

use crate::cli::output::{self, Styled};
use crate::cli::Engine;
use crate::recommend::assembler::RecommendOptions;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    db: Option<&Path>,
    user_id: &str,
    limit: usize,
    offset: usize,
    k: Option<usize>,
    min_similarity: Option<f64>,
    no_threshold: bool,
) -> Result<()> {
    let s = Styled::new();
    let engine = Engine::open(db)?;

    let mut options = RecommendOptions::from_config(&engine.config);
    options.limit = limit;
    options.offset = offset;
    if let Some(k) = k {
        options.k = k;
    }
    if let Some(t) = min_similarity {
        options.min_similarity = t;
    }
    if no_threshold {
        options.enforce_min_similarity = false;
    }

    let page = engine.recommender.recommend(user_id, &options).await?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&page)?);
        return Ok(());
    }

    output::print_section(
        &s,
        &format!(
            "Recommendations for '{user_id}' ({} of {})",
            page.metadata.count, page.metadata.total_available
        ),
    );
    for rec in &page.recommendations {
        let name = rec.profile.full_name.as_deref().unwrap_or(&rec.user_id);
        output::print_field(name, &s.cyan(&format!("{:.4}", rec.similarity)));
        eprintln!("                     {}", s.dim(&rec.explanation));
    }
    if page.recommendations.is_empty() && !output::is_quiet() {
        eprintln!("    {}", s.dim("no eligible candidates"));
    }
    eprintln!();
    eprintln!(
        "  {}",
        s.dim(&format!(
            "analyzed {} candidate(s), threshold {}, algorithm {}",
            page.metadata.candidates_considered,
            page.metadata
                .min_similarity
                .map_or("off".to_string(), |t| format!("{t}")),
            page.metadata.algorithm
        ))
    );
    Ok(())
}
