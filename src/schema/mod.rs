//! Declarative vector schema: segment windows and category tables.
//!
//! The 142-slot layout is defined once here; the attribute mapper, the
//! similarity breakdown, and the storage row width are all driven from it.
//! Positions are binary indicators; the final five slots are reserved
//! padding and never inspected by similarity math.

pub mod categories;

/// Total vector width, padding included.
pub const VECTOR_LEN: usize = 142;

/// Width of the meaningful prefix. Positions at and beyond this index are
/// reserved capacity, always zero, and excluded from all similarity math.
pub const MEANINGFUL_LEN: usize = 137;

/// Bumped whenever a segment window or category table changes shape.
pub const SCHEMA_VERSION: u32 = 1;

/// One contiguous sub-range of the vector reserved for a single attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub name: &'static str,
    pub start: usize,
    pub len: usize,
}

impl Segment {
    /// One past the last slot of this segment.
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    /// Absolute vector index for an offset inside this segment.
    pub const fn slot(&self, offset: usize) -> usize {
        self.start + offset
    }
}

/// Sport × skill-level one-hot pairs (11 sports × 3 levels).
pub const SPORT_SKILLS: Segment = Segment { name: "sport_skills", start: 0, len: 33 };
/// Faculty one-hot.
pub const FACULTY: Segment = Segment { name: "faculty", start: 33, len: 7 };
/// Region/state one-hot.
pub const REGION: Segment = Segment { name: "region", start: 40, len: 13 };
/// Gender one-hot.
pub const GENDER: Segment = Segment { name: "gender", start: 53, len: 4 };
/// Play-style one-hot (casual / competitive).
pub const PLAY_STYLE: Segment = Segment { name: "play_style", start: 57, len: 2 };
/// Day × time-slot one-hot (7 days × 7 slots).
pub const TIME_SLOTS: Segment = Segment { name: "time_slots", start: 59, len: 49 };
/// Preferred-venue one-hot, ordered by the stable venue listing.
pub const VENUES: Segment = Segment { name: "venues", start: 108, len: 29 };
/// Reserved capacity. Always zero.
pub const PADDING: Segment = Segment { name: "padding", start: 137, len: 5 };

/// All segments in slot order.
pub const SEGMENTS: [Segment; 8] = [
    SPORT_SKILLS,
    FACULTY,
    REGION,
    GENDER,
    PLAY_STYLE,
    TIME_SLOTS,
    VENUES,
    PADDING,
];

/// The segments that carry real profile signal (everything but padding).
pub fn meaningful_segments() -> impl Iterator<Item = &'static Segment> {
    SEGMENTS.iter().filter(|s| s.name != PADDING.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_tile_the_vector_exactly() {
        let mut cursor = 0;
        for seg in &SEGMENTS {
            assert_eq!(seg.start, cursor, "segment {} leaves a gap or overlaps", seg.name);
            assert!(seg.len > 0);
            cursor = seg.end();
        }
        assert_eq!(cursor, VECTOR_LEN);
    }

    #[test]
    fn padding_is_the_tail() {
        assert_eq!(PADDING.start, MEANINGFUL_LEN);
        assert_eq!(PADDING.end(), VECTOR_LEN);
    }

    #[test]
    fn meaningful_width_matches_category_tables() {
        let meaningful: usize = meaningful_segments().map(|s| s.len).sum();
        assert_eq!(meaningful, MEANINGFUL_LEN);

        assert_eq!(SPORT_SKILLS.len, categories::SPORTS.len() * categories::SKILL_LEVELS.len());
        assert_eq!(FACULTY.len, categories::FACULTIES.len());
        assert_eq!(REGION.len, categories::REGIONS.len());
        assert_eq!(GENDER.len, categories::GENDERS.len());
        assert_eq!(PLAY_STYLE.len, categories::PLAY_STYLES.len());
        assert_eq!(TIME_SLOTS.len, categories::DAYS.len() * categories::TIME_SLOT_LABELS.len());
    }
}
