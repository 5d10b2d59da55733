//! Per-segment change fingerprints.
//!
//! Each fingerprint is the FNV-1a hash of a canonical rendering of the raw
//! segment input, so reordered-but-equal inputs hash identically. A cache
//! entry is stale exactly when a stored fingerprint no longer matches.

use std::hash::Hasher;

use fnv::FnvHasher;

use crate::profile::UserProfile;
use crate::schema::categories;
use crate::vector::SegmentFingerprints;

/// Compute all four segment fingerprints for a profile snapshot.
pub fn fingerprints_for(profile: &UserProfile) -> SegmentFingerprints {
    SegmentFingerprints {
        availability: availability_fingerprint(profile),
        sports: sports_fingerprint(profile),
        region: region_fingerprint(profile),
        venues: venues_fingerprint(profile),
    }
}

fn sports_fingerprint(profile: &UserProfile) -> String {
    let mut pairs: Vec<String> = profile
        .sport_preferences
        .iter()
        .map(|p| format!("{}|{}", p.name, p.level))
        .collect();
    pairs.sort();
    fnv_hex(&pairs.join(";"))
}

fn availability_fingerprint(profile: &UserProfile) -> String {
    // Canonical form: resolved (day, slot) offsets, sorted and deduplicated.
    // Entries that resolve to nothing never enter the vector, so they don't
    // enter the fingerprint either.
    let mut slots: Vec<(usize, usize)> = Vec::new();
    for (day, entries) in &profile.available_hours {
        let Some(day_idx) = categories::day_index(day) else {
            continue;
        };
        for entry in entries {
            if let Some(slot_idx) = entry.resolve() {
                slots.push((day_idx, slot_idx));
            }
        }
    }
    slots.sort_unstable();
    slots.dedup();
    let rendered: Vec<String> = slots.iter().map(|(d, s)| format!("{d}:{s}")).collect();
    fnv_hex(&rendered.join(";"))
}

fn region_fingerprint(profile: &UserProfile) -> String {
    fnv_hex(profile.campus.as_deref().unwrap_or(""))
}

fn venues_fingerprint(profile: &UserProfile) -> String {
    let mut ids = profile.preferred_venues.clone();
    ids.sort();
    ids.dedup();
    fnv_hex(&ids.join(";"))
}

fn fnv_hex(input: &str) -> String {
    let mut hasher = FnvHasher::default();
    hasher.write(input.as_bytes());
    format!("{:016x}", hasher.finish())
}
