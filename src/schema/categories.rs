//! Fixed category tables and label-to-index lookups.
//!
//! Lookups are lenient: a label not present in a table maps to `None` and
//! the caller contributes no signal for it. New product categories added
//! before this table is updated simply aren't vectorized yet.

/// Sports, in slot order. Each sport owns three consecutive slots, one per
/// skill level.
pub const SPORTS: [&str; 11] = [
    "Basketball",
    "Badminton",
    "Football",
    "Frisbee",
    "Futsal",
    "Hockey",
    "Rugby",
    "Squash",
    "Table Tennis",
    "Tennis",
    "Volleyball",
];

/// Skill levels, in slot order within each sport's window.
pub const SKILL_LEVELS: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];

pub const FACULTIES: [&str; 7] = [
    "COMPUTER SCIENCES",
    "ENGINEERING",
    "ARTS",
    "MASSCOM",
    "SPORT SCIENCES AND RECREATION",
    "LANGUAGE",
    "APB",
];

pub const REGIONS: [&str; 13] = [
    "SELANGOR",
    "SARAWAK",
    "SABAH",
    "JOHOR",
    "KEDAH",
    "KELANTAN",
    "PAHANG",
    "PERAK",
    "PERLIS",
    "MELAKA",
    "TERENGGANU",
    "PENANG",
    "NEGERI SEMBILAN",
];

pub const GENDERS: [&str; 4] = ["Male", "Female", "Other", "Prefer not to say"];

pub const PLAY_STYLES: [&str; 2] = ["casual", "competitive"];

/// Days in slot order. Input day names are matched case-insensitively.
pub const DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// The seven fixed two-hour slots per day, in slot order.
pub const TIME_SLOT_LABELS: [&str; 7] = [
    "9-11", "11-13", "13-15", "15-17", "17-19", "19-21", "21-23",
];

/// Clock-hour bounds for each slot, parallel to [`TIME_SLOT_LABELS`].
pub const SLOT_HOURS: [(u32, u32); 7] = [
    (9, 11),
    (11, 13),
    (13, 15),
    (15, 17),
    (17, 19),
    (19, 21),
    (21, 23),
];

/// Slot offset for a sport + skill-level pair, or `None` if either label is
/// unknown.
pub fn sport_skill_index(sport: &str, level: &str) -> Option<usize> {
    let sport_idx = SPORTS.iter().position(|s| *s == sport)?;
    let level_idx = SKILL_LEVELS.iter().position(|l| *l == level)?;
    Some(sport_idx * SKILL_LEVELS.len() + level_idx)
}

pub fn faculty_index(faculty: &str) -> Option<usize> {
    FACULTIES.iter().position(|f| *f == faculty)
}

pub fn region_index(region: &str) -> Option<usize> {
    REGIONS.iter().position(|r| *r == region)
}

pub fn gender_index(gender: &str) -> Option<usize> {
    GENDERS.iter().position(|g| *g == gender)
}

pub fn play_style_index(style: &str) -> Option<usize> {
    PLAY_STYLES.iter().position(|p| *p == style)
}

/// Day offset for a (case-insensitive) day name.
pub fn day_index(day: &str) -> Option<usize> {
    let lower = day.to_ascii_lowercase();
    DAYS.iter().position(|d| *d == lower)
}

/// Slot offset for a named slot label such as `"9-11"`.
pub fn slot_index_for_label(label: &str) -> Option<usize> {
    TIME_SLOT_LABELS.iter().position(|l| *l == label)
}

/// Slot offset for a start/end clock-hour pair.
///
/// The pair must fit entirely inside exactly one fixed slot; anything that
/// straddles slot boundaries is dropped rather than given partial credit.
pub fn slot_index_for_clock(start_hour: u32, end_hour: u32) -> Option<usize> {
    if start_hour >= end_hour {
        return None;
    }
    SLOT_HOURS
        .iter()
        .position(|&(lo, hi)| start_hour >= lo && end_hour <= hi)
}
