//! Behavioural tells that point at one or a few specific ghosts.
use serde::{Deserialize, Serialize};

use crate::constants::GHOST_LIST_SEPARATOR;

/// A single unique-evidence entry. `ghost` is a `", "`-separated name list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueEvidence {
    pub id: String,
    pub label: String,
    pub ghost: String,
}

impl UniqueEvidence {
    #[must_use]
    pub fn new(id: &str, label: &str, ghost: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            ghost: ghost.to_string(),
        }
    }

    pub fn ghosts(&self) -> impl Iterator<Item = &str> {
        self.ghost
            .split(GHOST_LIST_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    #[must_use]
    pub fn names_ghost(&self, name: &str) -> bool {
        self.ghosts().any(|g| g == name)
    }

    /// True when the descriptor points at exactly one ghost.
    #[must_use]
    pub fn is_exclusive(&self) -> bool {
        self.ghosts().count() == 1
    }
}

const BUILT_IN: &[(&str, &str, &str)] = &[
    ("hunts_after_smudge_1", "Hunts 1 minute after smudge", "Demon"),
    ("hunts_after_smudge_3", "Hunts 3 minutes after smudge", "Spirit"),
    ("no_salt", "Doesn't walk through salt", "Wraith"),
    ("throws_far", "Objects thrown far and often", "Poltergeist"),
    ("disappears_photo", "Disappears when photographed", "Phantom"),
    ("less_visible_hunt", "Less visible during hunts", "Phantom"),
    ("more_visible_hunt", "More visible during hunts", "Oni"),
    ("breath_breaker_off", "Can see ghosts breath when breaker is off", "Hantu"),
    ("poor_detection", "Doesn't detect players easily", "Yokai"),
    ("fast_near_electronics", "Fast near electronic equipment", "Raiju"),
    ("silent_footsteps", "Footsteps silent until close", "Myling"),
    (
        "alternating_speed",
        "Alternates between slightly slower and slightly faster",
        "The Twins",
    ),
    ("changes_model", "Changes model mid hunt", "Obake"),
    ("slows_on_meds", "Slows down taking sanity meds mid haunt", "Moroi"),
    ("fast_far_slow_close", "Fast from far, slow when close", "Deogen"),
    ("cant_turn_lights", "Can't turn lights on", "Mare"),
    ("screams_parabolic", "Screams in parabolic mic", "Banshee"),
    (
        "hunt_speed_decreases",
        "Hunts faster than normal, slows down with time",
        "Thaye",
    ),
    ("double_slam", "Double slam doors", "Yurei"),
    ("never_changes_rooms", "Never changes rooms", "Goryo"),
    ("hunts_after_candles", "Hunts after blowing out 3 candles", "Onryo"),
    ("no_hunt_in_room", "Won't hunt while you're in the room", "Shade"),
    ("speed_with_breaker", "Fast w fuse box off/slow w on", "Jinn"),
    (
        "speed_when_hiding",
        "Slow when hiding, fast when it sees you",
        "Revenant",
    ),
];

/// Lookup table of unique evidence, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UniqueEvidenceTable(pub Vec<UniqueEvidence>);

impl UniqueEvidenceTable {
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// The table bundled with the application.
    #[must_use]
    pub fn built_in() -> Self {
        Self(
            BUILT_IN
                .iter()
                .map(|(id, label, ghost)| UniqueEvidence::new(id, label, ghost))
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&UniqueEvidence> {
        self.0.iter().find(|e| e.id == id)
    }

    pub fn for_ghost<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a UniqueEvidence> + 'a {
        self.0.iter().filter(move |e| e.names_ghost(name))
    }

    /// Entries whose label contains `query`, ignoring case. A blank query returns everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&UniqueEvidence> {
        let needle = query.trim().to_lowercase();
        self.0
            .iter()
            .filter(|e| needle.is_empty() || e.label.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UniqueEvidence> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
