//! `peermatch compare` — pairwise similarity with a per-segment breakdown.

use std::path::Path;

use anyhow::Result;

use crate::cli::output::{self, Styled};
use crate::cli::Engine;
use crate::similarity::jaccard;

pub async fn run(db: Option<&Path>, user_a: &str, user_b: &str) -> Result<()> {
    let s = Styled::new();
    let engine = Engine::open(db)?;

    let a = engine.builder.get_or_build(user_a).await?;
    let b = engine.builder.get_or_build(user_b).await?;
    let report = jaccard::report(&a, &b);

    if output::is_json() {
        output::print_json(&serde_json::to_value(&report)?);
        return Ok(());
    }

    output::print_section(&s, &format!("'{user_a}' vs '{user_b}'"));
    output::print_field("similarity", &s.cyan(&format!("{:.4}", report.similarity)));
    output::print_field("confidence", &format!("{:.4}", report.confidence));
    for seg in &report.segments {
        let detail = match seg.ratio {
            Some(ratio) => format!("{}/{} ({ratio:.2})", seg.intersection, seg.union),
            None => s.dim("no signal"),
        };
        output::print_field(seg.segment, &detail);
    }
    Ok(())
}
