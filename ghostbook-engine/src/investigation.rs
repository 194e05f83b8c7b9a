//! Session view model: selections plus manual exclusions, search and sort.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::catalog::Ghost;
use crate::evidence::Evidence;
use crate::filter::{is_ghost_filtered_out, matches, speed_bucket_matches};
use crate::selection::{SelectionAction, Selections, SpeedBucket, TriState};
use crate::unique_evidence::{UniqueEvidence, UniqueEvidenceTable};

/// Card list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Default,
    Fastest,
    Slowest,
    SanityHighest,
    SanityLowest,
    Alphabetical,
    AlphabeticalReversed,
}

impl SortOrder {
    pub const ALL: [Self; 7] = [
        Self::Default,
        Self::Fastest,
        Self::Slowest,
        Self::SanityHighest,
        Self::SanityLowest,
        Self::Alphabetical,
        Self::AlphabeticalReversed,
    ];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Fastest => "fastest",
            Self::Slowest => "slowest",
            Self::SanityHighest => "sanity_highest",
            Self::SanityLowest => "sanity_lowest",
            Self::Alphabetical => "alphabetical",
            Self::AlphabeticalReversed => "alphabetical_reversed",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort order `{0}`")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|o| o.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownSortOrder(s.to_string()))
    }
}

/// Stable sort of `ghosts` by `order`. Ghosts without speed data sort last
/// in both speed orders; missing sanity counts as 0.
pub fn sort_ghosts(ghosts: &mut [&Ghost], order: SortOrder) {
    match order {
        SortOrder::Default => {}
        SortOrder::Fastest => ghosts.sort_by(|a, b| {
            let a = a.fastest_speed().unwrap_or(f64::NEG_INFINITY);
            let b = b.fastest_speed().unwrap_or(f64::NEG_INFINITY);
            b.total_cmp(&a)
        }),
        SortOrder::Slowest => ghosts.sort_by(|a, b| {
            let a = a.slowest_speed().unwrap_or(f64::INFINITY);
            let b = b.slowest_speed().unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        }),
        SortOrder::SanityHighest => ghosts.sort_by(|a, b| {
            let a = a.effective_sanity_high().unwrap_or(0.0);
            let b = b.effective_sanity_high().unwrap_or(0.0);
            b.total_cmp(&a)
        }),
        SortOrder::SanityLowest => ghosts.sort_by(|a, b| {
            let a = a.effective_sanity_low().unwrap_or(0.0);
            let b = b.effective_sanity_low().unwrap_or(0.0);
            a.total_cmp(&b)
        }),
        SortOrder::Alphabetical => ghosts.sort_by(|a, b| compare_names(a, b)),
        SortOrder::AlphabeticalReversed => ghosts.sort_by(|a, b| compare_names(b, a)),
    }
}

fn compare_names(a: &Ghost, b: &Ghost) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Chips that belong to ghosts matching the search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchHints {
    pub evidence: BTreeSet<Evidence>,
    pub speed: BTreeSet<SpeedBucket>,
    pub unique: BTreeSet<String>,
}

impl SearchHints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evidence.is_empty() && self.speed.is_empty() && self.unique.is_empty()
    }
}

/// A unique-evidence entry as the filter panel lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueEvidenceRow<'a> {
    pub entry: &'a UniqueEvidence,
    pub state: TriState,
    /// Every ghost the entry names is already ruled out by the unique facet.
    pub filtered_out: bool,
    pub label_match: bool,
}

/// Everything the player has set up for the current contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Investigation {
    #[serde(default)]
    pub selections: Selections,
    #[serde(default)]
    pub excluded: BTreeSet<String>,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: SortOrder,
}

impl Investigation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: SelectionAction) {
        self.selections = self.selections.reduce(action);
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub const fn set_sort(&mut self, order: SortOrder) {
        self.sort = order;
    }

    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    /// Rule a ghost out by hand. Unique evidence that now points only at
    /// excluded ghosts is marked excluded too.
    pub fn exclude_ghost(&mut self, name: &str, table: &UniqueEvidenceTable) {
        self.excluded.insert(name.to_string());
        for entry in table.for_ghost(name) {
            let all_out = entry.ghosts().all(|g| self.excluded.contains(g));
            if entry.is_exclusive() || all_out {
                self.selections.unique.set(entry.id.clone(), TriState::Excluded);
            }
        }
        log::debug!("excluded ghost {name}; {} ruled out", self.excluded.len());
    }

    /// Undo [`Self::exclude_ghost`]. Unique evidence excluded only on this
    /// ghost's account returns to neutral.
    pub fn restore_ghost(&mut self, name: &str, table: &UniqueEvidenceTable) {
        if !self.excluded.remove(name) {
            return;
        }
        for entry in table.for_ghost(name) {
            if self.selections.unique.get(entry.id.as_str()) != TriState::Excluded {
                continue;
            }
            let others_excluded = entry
                .ghosts()
                .any(|g| g != name && self.excluded.contains(g));
            if !others_excluded {
                self.selections.unique.set(entry.id.clone(), TriState::Neutral);
            }
        }
        log::debug!("restored ghost {name}");
    }

    /// Clears every facet and the search box; manual exclusions stay.
    pub fn reset_all(&mut self) {
        self.selections = self.selections.reduce(SelectionAction::ResetAll);
        self.search.clear();
    }

    #[must_use]
    pub fn is_search_match(&self, ghost: &Ghost) -> bool {
        ghost.name_matches(&self.search)
    }

    /// The cards to show, in display order. Search matches are always shown
    /// and float to the top; other excluded ghosts are hidden.
    #[must_use]
    pub fn visible_ghosts<'a>(&self, ghosts: &'a [Ghost], table: &UniqueEvidenceTable) -> Vec<&'a Ghost> {
        let mut visible: Vec<&Ghost> = ghosts
            .iter()
            .filter(|g| {
                self.is_search_match(g)
                    || (!self.is_excluded(&g.name) && matches(g, &self.selections, table))
            })
            .collect();
        sort_ghosts(&mut visible, self.sort);
        if !self.search.trim().is_empty() {
            visible.sort_by_key(|g| !self.is_search_match(g));
        }
        visible
    }

    /// The unique-evidence panel in display order: live entries before dead
    /// ones, then label matches for `label_query`, then entries naming a
    /// ghost that matches the ghost search, then by where their earliest
    /// ghost sits in the current card order.
    ///
    /// Only the unique facet decides whether an entry is dead, so picking
    /// evidence or speeds never sinks a tell.
    #[must_use]
    pub fn unique_evidence_rows<'a>(
        &self,
        ghosts: &[Ghost],
        table: &'a UniqueEvidenceTable,
        label_query: &str,
    ) -> Vec<UniqueEvidenceRow<'a>> {
        let unique_only = Selections {
            unique: self.selections.unique.clone(),
            ..Selections::default()
        };
        let label_hits: HashSet<&str> = if label_query.trim().is_empty() {
            HashSet::new()
        } else {
            table.search(label_query).into_iter().map(|e| e.id.as_str()).collect()
        };
        let mut card_order: Vec<&Ghost> = ghosts.iter().collect();
        sort_ghosts(&mut card_order, self.sort);
        let position: HashMap<&str, usize> = card_order
            .iter()
            .enumerate()
            .map(|(i, g)| (g.name.as_str(), i))
            .collect();
        let ghost_query = self.search.trim().to_lowercase();

        let mut rows: Vec<(UniqueEvidenceRow<'a>, bool, usize)> = table
            .iter()
            .map(|entry| {
                let filtered_out = entry
                    .ghosts()
                    .all(|name| is_ghost_filtered_out(name, &unique_only, ghosts, table));
                let names_searched_ghost = !ghost_query.is_empty()
                    && entry.ghosts().any(|name| name.to_lowercase().contains(&ghost_query));
                let first_card = entry
                    .ghosts()
                    .filter_map(|name| position.get(name).copied())
                    .min()
                    .unwrap_or(usize::MAX);
                let row = UniqueEvidenceRow {
                    entry,
                    state: self.selections.unique.get(entry.id.as_str()),
                    filtered_out,
                    label_match: label_hits.contains(entry.id.as_str()),
                };
                (row, names_searched_ghost, first_card)
            })
            .collect();
        rows.sort_by_key(|(row, names_searched_ghost, first_card)| {
            (row.filtered_out, !row.label_match, !names_searched_ghost, *first_card)
        });
        rows.into_iter().map(|(row, _, _)| row).collect()
    }

    /// Chips to mark for the current search.
    #[must_use]
    pub fn search_hints(&self, ghosts: &[Ghost], table: &UniqueEvidenceTable) -> SearchHints {
        let mut hints = SearchHints::default();
        for ghost in ghosts.iter().filter(|g| self.is_search_match(g)) {
            hints.evidence.extend(ghost.evidence.iter().copied());
            if ghost.speeds().next().is_some() {
                hints.speed.extend(
                    SpeedBucket::ALL
                        .into_iter()
                        .filter(|b| speed_bucket_matches(ghost, *b, TriState::Included)),
                );
            }
            hints
                .unique
                .extend(table.for_ghost(&ghost.name).map(|e| e.id.clone()));
        }
        hints
    }
}
