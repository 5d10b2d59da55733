//! Natural-language explanations for recommendation records.

/// One-line "why" string for a recommended user, phrased by similarity
/// band.
pub fn similarity_explanation(similarity: f64, display_name: &str) -> String {
    let percent = (similarity * 100.0).round() as u32;

    if similarity >= 0.8 {
        format!("{display_name} has {percent}% similar preferences to you")
    } else if similarity >= 0.6 {
        format!("{display_name} shares {percent}% of your sports preferences")
    } else if similarity >= 0.4 {
        format!("{display_name} has a {percent}% similar profile to you")
    } else {
        format!("{display_name} ({percent}% profile similarity)")
    }
}
