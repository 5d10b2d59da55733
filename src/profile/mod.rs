//! Raw profile attribute types consumed by the vector builder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::categories;

/// One sport the user plays, qualified by their skill level in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportPreference {
    pub name: String,
    pub level: String,
}

/// One availability entry for a day.
///
/// Historical data carries two shapes: a named slot label (`"9-11"`) or a
/// start/end clock pair (`{"start": "09:00", "end": "11:00"}`). Both are
/// resolved once at ingestion into a canonical slot offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AvailabilityEntry {
    Label(String),
    Clock { start: String, end: String },
}

impl AvailabilityEntry {
    /// Resolve to a slot offset in 0..7, or `None` when the label is
    /// unknown or the clock range does not fit exactly one fixed slot.
    pub fn resolve(&self) -> Option<usize> {
        match self {
            AvailabilityEntry::Label(label) => categories::slot_index_for_label(label),
            AvailabilityEntry::Clock { start, end } => {
                let start_hour = parse_hour(start)?;
                let end_hour = parse_hour(end)?;
                categories::slot_index_for_clock(start_hour, end_hour)
            }
        }
    }
}

fn parse_hour(clock: &str) -> Option<u32> {
    clock.split(':').next()?.trim().parse().ok()
}

/// Day name → availability entries. BTreeMap keeps serialization stable.
pub type WeeklyAvailability = BTreeMap<String, Vec<AvailabilityEntry>>;

/// The profile snapshot a vector is built from. All attributes are
/// optional; missing ones contribute no signal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub sport_preferences: Vec<SportPreference>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub campus: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub play_style: Option<String>,
    #[serde(default)]
    pub available_hours: WeeklyAvailability,
    #[serde(default)]
    pub preferred_venues: Vec<String>,
}

/// The public profile fields attached to a recommendation record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicProfile {
    pub user_id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub faculty: Option<String>,
    pub campus: Option<String>,
    pub play_style: Option<String>,
}

/// Relationship state between two users, as reported by the relationship
/// collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    None,
    Pending,
    Accepted,
    Declined,
}

impl RelationshipStatus {
    /// Active relationships exclude a user from recommendations. Declined
    /// ones do not: those users are deliberately eligible to be offered
    /// again.
    pub fn is_active(self) -> bool {
        matches!(self, RelationshipStatus::Pending | RelationshipStatus::Accepted)
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => RelationshipStatus::Pending,
            "accepted" => RelationshipStatus::Accepted,
            "declined" => RelationshipStatus::Declined,
            _ => RelationshipStatus::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipStatus::None => "none",
            RelationshipStatus::Pending => "pending",
            RelationshipStatus::Accepted => "accepted",
            RelationshipStatus::Declined => "declined",
        }
    }
}

/// Stable venue listing used to give each venue an ordinal slot in the
/// vector's venue window. Built from venues ordered by name so the
/// assignment survives restarts.
#[derive(Debug, Clone, Default)]
pub struct VenueDirectory {
    ids: Vec<String>,
}

impl VenueDirectory {
    pub fn new(ids_in_stable_order: Vec<String>) -> Self {
        Self { ids: ids_in_stable_order }
    }

    /// Ordinal index of a venue id, if listed.
    pub fn index_of(&self, venue_id: &str) -> Option<usize> {
        self.ids.iter().position(|id| id == venue_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
