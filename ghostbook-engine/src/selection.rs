//! Tri-state facet selections and the reducer that updates them.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::evidence::Evidence;

/// State of one facet key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    #[default]
    Neutral,
    Included,
    Excluded,
}

impl TriState {
    /// neutral -> included -> excluded -> neutral
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::Neutral => Self::Included,
            Self::Included => Self::Excluded,
            Self::Excluded => Self::Neutral,
        }
    }

    #[must_use]
    pub const fn toggle_include(self) -> Self {
        match self {
            Self::Included => Self::Neutral,
            Self::Neutral | Self::Excluded => Self::Included,
        }
    }

    #[must_use]
    pub const fn toggle_exclude(self) -> Self {
        match self {
            Self::Excluded => Self::Neutral,
            Self::Neutral | Self::Included => Self::Excluded,
        }
    }

    #[must_use]
    pub const fn is_neutral(self) -> bool {
        matches!(self, Self::Neutral)
    }
}

/// Movement-speed buckets, all measured against [`crate::constants::NORMAL_SPEED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBucket {
    Slow,
    Normal,
    Fast,
    /// Line-of-sight speedup.
    Los,
}

impl SpeedBucket {
    pub const ALL: [Self; 4] = [Self::Slow, Self::Normal, Self::Fast, Self::Los];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
            Self::Los => "los",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Slow => "Slow (< 1.7 m/s)",
            Self::Normal => "Normal (1.7 m/s)",
            Self::Fast => "Fast (> 1.7 m/s)",
            Self::Los => "LOS Speed Up",
        }
    }
}

/// Hunt-sanity buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanityBucket {
    High,
    Medium,
    Fifty,
    Low,
}

impl SanityBucket {
    pub const ALL: [Self; 4] = [Self::High, Self::Medium, Self::Fifty, Self::Low];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Fifty => "fifty",
            Self::Low => "low",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "100%-80%",
            Self::Medium => "80%-60%",
            Self::Fifty => "50%",
            Self::Low => "< 40%",
        }
    }
}

impl fmt::Display for SpeedBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl fmt::Display for SanityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Raised when a bucket id is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {facet} bucket `{value}`")]
pub struct UnknownBucket {
    pub facet: &'static str,
    pub value: String,
}

impl FromStr for SpeedBucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownBucket {
                facet: "speed",
                value: s.to_string(),
            })
    }
}

impl FromStr for SanityBucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownBucket {
                facet: "sanity",
                value: s.to_string(),
            })
    }
}

/// Non-neutral states for one facet. Neutral keys are never stored, so an
/// absent key and an explicit neutral cannot be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetSelection<K> {
    states: BTreeMap<K, TriState>,
}

impl<K: Ord + Serialize> Serialize for FacetSelection<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.states.serialize(serializer)
    }
}

impl<'de, K: Ord + Deserialize<'de>> Deserialize<'de> for FacetSelection<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let states = BTreeMap::<K, TriState>::deserialize(deserializer)?;
        Ok(states.into_iter().collect())
    }
}

impl<K> Default for FacetSelection<K> {
    fn default() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }
}

impl<K: Ord> FacetSelection<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> TriState
    where
        K: std::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.states.get(key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: K, state: TriState) {
        if state.is_neutral() {
            self.states.remove(&key);
        } else {
            self.states.insert(key, state);
        }
    }

    fn update(&mut self, key: K, step: impl FnOnce(TriState) -> TriState) {
        let next = step(self.get(&key));
        self.set(key, next);
    }

    pub fn cycle(&mut self, key: K) {
        self.update(key, TriState::cycle);
    }

    pub fn toggle_include(&mut self, key: K) {
        self.update(key, TriState::toggle_include);
    }

    pub fn toggle_exclude(&mut self, key: K) {
        self.update(key, TriState::toggle_exclude);
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Non-neutral keys with their states, in key order.
    pub fn active(&self) -> impl Iterator<Item = (&K, TriState)> {
        self.states.iter().map(|(k, s)| (k, *s))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }
}

impl<K: Ord> FromIterator<(K, TriState)> for FacetSelection<K> {
    fn from_iter<I: IntoIterator<Item = (K, TriState)>>(iter: I) -> Self {
        let mut selection = Self::new();
        for (key, state) in iter {
            selection.set(key, state);
        }
        selection
    }
}

/// Address of a single chip across all four facets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "facet", content = "key", rename_all = "snake_case")]
pub enum FacetKey {
    Evidence(Evidence),
    Speed(SpeedBucket),
    Sanity(SanityBucket),
    Unique(String),
}

/// Which facet a bulk action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Evidence,
    Speed,
    Sanity,
    Unique,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionAction {
    Cycle(FacetKey),
    ToggleInclude(FacetKey),
    ToggleExclude(FacetKey),
    Set { key: FacetKey, state: TriState },
    ClearFacet { facet: Facet },
    ResetAll,
}

/// Immutable snapshot of all four facets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Selections {
    #[serde(default)]
    pub evidence: FacetSelection<Evidence>,
    #[serde(default)]
    pub speed: FacetSelection<SpeedBucket>,
    #[serde(default)]
    pub sanity: FacetSelection<SanityBucket>,
    #[serde(default)]
    pub unique: FacetSelection<String>,
}

impl Selections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evidence.is_empty()
            && self.speed.is_empty()
            && self.sanity.is_empty()
            && self.unique.is_empty()
    }

    #[must_use]
    pub fn state_of(&self, key: &FacetKey) -> TriState {
        match key {
            FacetKey::Evidence(ev) => self.evidence.get(ev),
            FacetKey::Speed(bucket) => self.speed.get(bucket),
            FacetKey::Sanity(bucket) => self.sanity.get(bucket),
            FacetKey::Unique(id) => self.unique.get(id.as_str()),
        }
    }

    /// Returns the snapshot that results from applying `action`.
    #[must_use]
    pub fn reduce(&self, action: SelectionAction) -> Self {
        let mut next = self.clone();
        match action {
            SelectionAction::Cycle(key) => next.step(key, TriState::cycle),
            SelectionAction::ToggleInclude(key) => next.step(key, TriState::toggle_include),
            SelectionAction::ToggleExclude(key) => next.step(key, TriState::toggle_exclude),
            SelectionAction::Set { key, state } => next.step(key, |_| state),
            SelectionAction::ClearFacet { facet } => match facet {
                Facet::Evidence => next.evidence.clear(),
                Facet::Speed => next.speed.clear(),
                Facet::Sanity => next.sanity.clear(),
                Facet::Unique => next.unique.clear(),
            },
            SelectionAction::ResetAll => next = Self::default(),
        }
        next
    }

    fn step(&mut self, key: FacetKey, f: impl FnOnce(TriState) -> TriState) {
        match key {
            FacetKey::Evidence(ev) => self.evidence.update(ev, f),
            FacetKey::Speed(bucket) => self.speed.update(bucket, f),
            FacetKey::Sanity(bucket) => self.sanity.update(bucket, f),
            FacetKey::Unique(id) => self.unique.update(id, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_is_never_stored() {
        let mut facet = FacetSelection::new();
        facet.set(Evidence::Writing, TriState::Included);
        facet.set(Evidence::Writing, TriState::Neutral);
        assert!(facet.is_empty());
        assert_eq!(facet, FacetSelection::default());
    }

    #[test]
    fn cycle_returns_to_start_after_three_steps() {
        let start = Selections::new().reduce(SelectionAction::Set {
            key: FacetKey::Speed(SpeedBucket::Fast),
            state: TriState::Excluded,
        });
        let key = FacetKey::Evidence(Evidence::Dots);
        let once = start.reduce(SelectionAction::Cycle(key.clone()));
        assert_eq!(once.state_of(&key), TriState::Included);
        let twice = once.reduce(SelectionAction::Cycle(key.clone()));
        assert_eq!(twice.state_of(&key), TriState::Excluded);
        let thrice = twice.reduce(SelectionAction::Cycle(key));
        assert_eq!(thrice, start);
    }

    #[test]
    fn include_and_exclude_toggles_are_separate_controls() {
        let key = FacetKey::Unique("no_salt".to_string());
        let s = Selections::new().reduce(SelectionAction::ToggleExclude(key.clone()));
        assert_eq!(s.state_of(&key), TriState::Excluded);
        let s = s.reduce(SelectionAction::ToggleInclude(key.clone()));
        assert_eq!(s.state_of(&key), TriState::Included);
        let s = s.reduce(SelectionAction::ToggleInclude(key.clone()));
        assert!(s.is_empty());
    }

    #[test]
    fn reduce_leaves_the_original_untouched() {
        let original = Selections::new();
        let next = original.reduce(SelectionAction::Cycle(FacetKey::Sanity(SanityBucket::Low)));
        assert!(original.is_empty());
        assert_eq!(next.sanity.len(), 1);
        let cleared = next.reduce(SelectionAction::ClearFacet {
            facet: Facet::Sanity,
        });
        assert!(cleared.is_empty());
    }

    #[test]
    fn explicit_neutral_in_json_is_dropped() {
        let json = r#"{"evidence": {"EMF 5": "included", "Writing": "neutral"}, "speed": {"fast": "excluded"}}"#;
        let selections: Selections = serde_json::from_str(json).unwrap();
        assert_eq!(selections.evidence.len(), 1);
        assert_eq!(selections.evidence.get(&Evidence::Writing), TriState::Neutral);
        assert_eq!(selections.speed.get(&SpeedBucket::Fast), TriState::Excluded);
        assert!(selections.unique.is_empty());
    }

    #[test]
    fn bucket_ids_parse() {
        assert_eq!("LOS".parse::<SpeedBucket>(), Ok(SpeedBucket::Los));
        assert_eq!("fifty".parse::<SanityBucket>(), Ok(SanityBucket::Fifty));
        assert!("warp".parse::<SpeedBucket>().is_err());
    }
}
