//! Encode a profile snapshot into the 142-slot indicator vector.
//!
//! One pure function per segment. Each writes indicator bits into its own
//! window and leaves everything else untouched; absent or unknown values
//! leave the whole window zero. Only the sports window may set more than
//! one bit per categorical value.

use tracing::debug;

use crate::profile::{SportPreference, UserProfile, VenueDirectory, WeeklyAvailability};
use crate::schema::{self, categories, Segment, MEANINGFUL_LEN, VECTOR_LEN};
use crate::vector::Vector;

/// Encode the whole profile. Returns the vector and its completeness score.
pub fn encode_profile(profile: &UserProfile, venues: &VenueDirectory) -> (Vector, f64) {
    let mut vector = [0u8; VECTOR_LEN];

    encode_sports(&profile.sport_preferences, &mut vector);
    encode_label(schema::FACULTY, profile.faculty.as_deref(), categories::faculty_index, &mut vector);
    encode_label(schema::REGION, profile.campus.as_deref(), categories::region_index, &mut vector);
    encode_label(schema::GENDER, profile.gender.as_deref(), categories::gender_index, &mut vector);
    encode_label(
        schema::PLAY_STYLE,
        profile.play_style.as_deref(),
        categories::play_style_index,
        &mut vector,
    );
    encode_availability(&profile.available_hours, &mut vector);
    encode_venues(&profile.preferred_venues, venues, &mut vector);

    let score = completeness(&vector);
    (vector, score)
}

/// Sport × skill-level bits (the only window allowed multiple bits: one
/// per listed sport, each qualified by that sport's own level).
pub fn encode_sports(prefs: &[SportPreference], out: &mut Vector) {
    for pref in prefs {
        match categories::sport_skill_index(&pref.name, &pref.level) {
            Some(offset) => out[schema::SPORT_SKILLS.slot(offset)] = 1,
            None => debug!(
                sport = %pref.name,
                level = %pref.level,
                "unknown sport/skill pair, contributing no signal"
            ),
        }
    }
}

/// Generic single-label one-hot: at most one bit in the window.
fn encode_label(
    segment: Segment,
    value: Option<&str>,
    lookup: fn(&str) -> Option<usize>,
    out: &mut Vector,
) {
    let Some(value) = value else {
        return;
    };
    match lookup(value) {
        Some(offset) => out[segment.slot(offset)] = 1,
        None => debug!(segment = segment.name, %value, "unknown category label, contributing no signal"),
    }
}

/// Day × time-slot bits. Both input shapes (slot label, clock range) are
/// resolved through [`crate::profile::AvailabilityEntry::resolve`].
pub fn encode_availability(hours: &WeeklyAvailability, out: &mut Vector) {
    for (day, entries) in hours {
        let Some(day_idx) = categories::day_index(day) else {
            debug!(%day, "unknown day name, contributing no signal");
            continue;
        };
        for entry in entries {
            match entry.resolve() {
                Some(slot_idx) => {
                    let offset = day_idx * categories::TIME_SLOT_LABELS.len() + slot_idx;
                    out[schema::TIME_SLOTS.slot(offset)] = 1;
                }
                None => debug!(%day, ?entry, "unresolvable availability entry, dropped"),
            }
        }
    }
}

/// Preferred-venue bits, resolved against the stable venue listing. Venues
/// past the window capacity are ignored.
pub fn encode_venues(venue_ids: &[String], directory: &VenueDirectory, out: &mut Vector) {
    for id in venue_ids {
        match directory.index_of(id) {
            Some(offset) if offset < schema::VENUES.len => {
                out[schema::VENUES.slot(offset)] = 1;
            }
            Some(_) => debug!(venue = %id, "venue beyond window capacity, dropped"),
            None => debug!(venue = %id, "venue not in listing, contributing no signal"),
        }
    }
}

/// Non-zero meaningful slots over the meaningful width.
pub fn completeness(vector: &Vector) -> f64 {
    let non_zero = vector[..MEANINGFUL_LEN].iter().filter(|&&v| v != 0).count();
    non_zero as f64 / MEANINGFUL_LEN as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::AvailabilityEntry;

    fn sport(name: &str, level: &str) -> SportPreference {
        SportPreference {
            name: name.to_string(),
            level: level.to_string(),
        }
    }

    #[test]
    fn sports_set_one_bit_per_listed_sport() {
        let mut v = [0u8; VECTOR_LEN];
        encode_sports(
            &[sport("Basketball", "Beginner"), sport("Tennis", "Advanced")],
            &mut v,
        );
        assert_eq!(v[0], 1); // Basketball-Beginner
        assert_eq!(v[29], 1); // Tennis-Advanced
        assert_eq!(v.iter().filter(|&&b| b != 0).count(), 2);
    }

    #[test]
    fn unknown_sport_is_silently_ignored() {
        let mut v = [0u8; VECTOR_LEN];
        encode_sports(&[sport("Cricket", "Beginner")], &mut v);
        assert!(v.iter().all(|&b| b == 0));
    }

    #[test]
    fn full_profile_hits_documented_slots() {
        let profile = UserProfile {
            user_id: "u1".to_string(),
            sport_preferences: vec![sport("Basketball", "Beginner")],
            faculty: Some("COMPUTER SCIENCES".to_string()),
            campus: Some("SELANGOR".to_string()),
            gender: Some("Female".to_string()),
            play_style: Some("competitive".to_string()),
            available_hours: WeeklyAvailability::from([(
                "monday".to_string(),
                vec![AvailabilityEntry::Label("9-11".to_string())],
            )]),
            preferred_venues: vec!["v1".to_string()],
        };
        let directory = VenueDirectory::new(vec!["v1".to_string()]);

        let (v, score) = encode_profile(&profile, &directory);
        assert_eq!(v[0], 1); // Basketball-Beginner
        assert_eq!(v[33], 1); // COMPUTER SCIENCES
        assert_eq!(v[40], 1); // SELANGOR
        assert_eq!(v[54], 1); // Female
        assert_eq!(v[58], 1); // competitive
        assert_eq!(v[59], 1); // monday 9-11
        assert_eq!(v[108], 1); // first venue
        assert!((score - 7.0 / MEANINGFUL_LEN as f64).abs() < 1e-12);
        // Padding untouched.
        assert!(v[MEANINGFUL_LEN..].iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_profile_encodes_all_zero() {
        let profile = UserProfile {
            user_id: "u1".to_string(),
            ..Default::default()
        };
        let (v, score) = encode_profile(&profile, &VenueDirectory::default());
        assert!(v.iter().all(|&b| b == 0));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn availability_flattens_day_and_slot() {
        let mut v = [0u8; VECTOR_LEN];
        let hours = WeeklyAvailability::from([
            (
                "Sunday".to_string(),
                vec![AvailabilityEntry::Label("21-23".to_string())],
            ),
            (
                "wednesday".to_string(),
                vec![AvailabilityEntry::Clock {
                    start: "13:00".to_string(),
                    end: "15:00".to_string(),
                }],
            ),
        ]);
        encode_availability(&hours, &mut v);
        // sunday (6) * 7 + slot 6 = offset 48 -> index 107
        assert_eq!(v[107], 1);
        // wednesday (2) * 7 + slot 2 = offset 16 -> index 75
        assert_eq!(v[75], 1);
        assert_eq!(v.iter().filter(|&&b| b != 0).count(), 2);
    }
}
