//! Ghost records and the catalog they are loaded into.
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::MIMIC_NAME;
use crate::evidence::Evidence;

const BUNDLED_CATALOG: &str = include_str!("../data/ghosts.json");

/// One entry of the ghost catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ghost {
    #[serde(rename = "ghost")]
    pub name: String,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    /// Evidence hidden on nightmare difficulty. Display-only.
    #[serde(default)]
    pub nightmare_evidence: Vec<Evidence>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub min_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub alt_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_los: Option<bool>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub hunt_sanity_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub hunt_sanity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub hunt_sanity_high: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub extra_information: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<String>,
}

impl Ghost {
    /// Bare record with only a name; the rest is filled in by the caller.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            evidence: Vec::new(),
            nightmare_evidence: Vec::new(),
            min_speed: None,
            max_speed: None,
            alt_speed: None,
            has_los: None,
            hunt_sanity_low: None,
            hunt_sanity: None,
            hunt_sanity_high: None,
            description: String::new(),
            extra_information: Vec::new(),
            wiki: None,
        }
    }

    #[must_use]
    pub fn is_mimic(&self) -> bool {
        self.name == MIMIC_NAME
    }

    /// Whether the ghost can present `evidence`, counting the Mimic's fake orbs.
    #[must_use]
    pub fn can_have_evidence(&self, evidence: Evidence) -> bool {
        self.evidence.contains(&evidence) || (self.is_mimic() && evidence == Evidence::GhostOrbs)
    }

    #[must_use]
    pub fn is_nightmare_evidence(&self, evidence: Evidence) -> bool {
        self.nightmare_evidence.contains(&evidence)
    }

    /// Defined speeds in min, max, alt order.
    pub fn speeds(&self) -> impl Iterator<Item = f64> {
        [self.min_speed, self.max_speed, self.alt_speed]
            .into_iter()
            .flatten()
    }

    #[must_use]
    pub fn fastest_speed(&self) -> Option<f64> {
        self.speeds().reduce(f64::max)
    }

    #[must_use]
    pub fn slowest_speed(&self) -> Option<f64> {
        self.speeds().reduce(f64::min)
    }

    /// Sort key for the lowest hunt threshold: low, then mid, then high.
    #[must_use]
    pub fn effective_sanity_low(&self) -> Option<f64> {
        self.hunt_sanity_low
            .or(self.hunt_sanity)
            .or(self.hunt_sanity_high)
    }

    #[must_use]
    pub const fn effective_sanity_mid(&self) -> Option<f64> {
        self.hunt_sanity
    }

    /// Sort key for the highest hunt threshold: high, then mid, then low.
    #[must_use]
    pub fn effective_sanity_high(&self) -> Option<f64> {
        self.hunt_sanity_high
            .or(self.hunt_sanity)
            .or(self.hunt_sanity_low)
    }

    /// Threshold the `low` sanity bucket reads: low, else mid. Never high.
    #[must_use]
    pub fn sanity_band_low(&self) -> Option<f64> {
        nonzero(self.hunt_sanity_low).or(self.hunt_sanity)
    }

    /// Threshold the `high` and `medium` buckets read: high, else mid. Never low.
    #[must_use]
    pub fn sanity_band_high(&self) -> Option<f64> {
        nonzero(self.hunt_sanity_high).or(self.hunt_sanity)
    }

    /// Case-insensitive substring match on the name; blank queries never match.
    #[must_use]
    pub fn name_matches(&self, query: &str) -> bool {
        let query = query.trim();
        !query.is_empty() && self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Accepts numbers or numeric strings; anything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_leading_number(&s),
        _ => None,
    })
}

/// Parses the longest numeric prefix of `text`, so `"50%"` reads as 50.
#[must_use]
pub fn parse_leading_number(text: &str) -> Option<f64> {
    static LEADING_NUMBER: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = LEADING_NUMBER
        .get_or_init(|| Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").ok())
        .as_ref()?;
    let found = pattern.find(text)?;
    found
        .as_str()
        .trim_start()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog lists `{0}` more than once")]
    DuplicateGhost(String),
}

/// The full ghost list, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GhostCatalog {
    pub ghosts: Vec<Ghost>,
}

impl GhostCatalog {
    #[must_use]
    pub const fn empty() -> Self {
        Self { ghosts: Vec::new() }
    }

    /// Load a catalog from its JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a ghost name repeats.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        log::debug!("loaded ghost catalog with {} entries", catalog.ghosts.len());
        Ok(catalog)
    }

    /// Build a catalog from records already in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if a ghost name repeats.
    pub fn from_ghosts(ghosts: Vec<Ghost>) -> Result<Self, CatalogError> {
        let catalog = Self { ghosts };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled JSON is corrupt.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::with_capacity(self.ghosts.len());
        for ghost in &self.ghosts {
            if !seen.insert(ghost.name.as_str()) {
                return Err(CatalogError::DuplicateGhost(ghost.name.clone()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Ghost> {
        self.ghosts.iter().find(|g| g.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ghost> {
        self.ghosts.iter()
    }
}

impl<'a> IntoIterator for &'a GhostCatalog {
    type Item = &'a Ghost;
    type IntoIter = std::slice::Iter<'a, Ghost>;

    fn into_iter(self) -> Self::IntoIter {
        self.ghosts.iter()
    }
}

/// What the UI shell sees of the catalog load.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CatalogState {
    #[default]
    Loading,
    Ready(GhostCatalog),
    Failed(String),
}

impl CatalogState {
    #[must_use]
    pub const fn catalog(&self) -> Option<&GhostCatalog> {
        match self {
            Self::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl<E: std::fmt::Display> From<Result<GhostCatalog, E>> for CatalogState {
    fn from(result: Result<GhostCatalog, E>) -> Self {
        match result {
            Ok(catalog) => Self::Ready(catalog),
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_number_matches_loose_float_parsing() {
        assert_eq!(parse_leading_number("50%"), Some(50.0));
        assert_eq!(parse_leading_number(" 1.7 m/s"), Some(1.7));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("2e1x"), Some(20.0));
        assert_eq!(parse_leading_number("3e"), Some(3.0));
        assert_eq!(parse_leading_number("+2."), Some(2.0));
        assert_eq!(parse_leading_number("\t-0.5 slower"), Some(-0.5));
        assert_eq!(parse_leading_number("speed 1.7"), None);
        assert_eq!(parse_leading_number("fast"), None);
        assert_eq!(parse_leading_number(""), None);
        assert_eq!(parse_leading_number("-"), None);
    }

    #[test]
    fn malformed_numbers_read_as_absent() {
        let json = r#"{
            "ghosts": [
                {
                    "ghost": "Odd",
                    "evidence": ["EMF 5"],
                    "min_speed": "varies",
                    "max_speed": "2.5",
                    "alt_speed": true,
                    "hunt_sanity": "50%"
                }
            ]
        }"#;
        let catalog = GhostCatalog::from_json(json).unwrap();
        let ghost = &catalog.ghosts[0];
        assert_eq!(ghost.min_speed, None);
        assert_eq!(ghost.max_speed, Some(2.5));
        assert_eq!(ghost.alt_speed, None);
        assert_eq!(ghost.hunt_sanity, Some(50.0));
        assert_eq!(ghost.speeds().collect::<Vec<_>>(), vec![2.5]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let json = r#"{"ghosts": [{"ghost": "Shade"}, {"ghost": "Shade"}]}"#;
        let err = GhostCatalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateGhost(name) if name == "Shade"));
    }

    #[test]
    fn mimic_presents_ghost_orbs() {
        let mut mimic = Ghost::named(MIMIC_NAME);
        mimic.evidence = vec![Evidence::SpiritBox, Evidence::Ultraviolet, Evidence::Freezing];
        assert!(mimic.can_have_evidence(Evidence::GhostOrbs));
        assert!(!mimic.can_have_evidence(Evidence::Emf5));

        let shade = Ghost::named("Shade");
        assert!(!shade.can_have_evidence(Evidence::GhostOrbs));
    }

    #[test]
    fn effective_sanity_falls_back_in_order() {
        let mut mare = Ghost::named("Mare");
        mare.hunt_sanity_low = Some(40.0);
        mare.hunt_sanity_high = Some(60.0);
        assert_eq!(mare.effective_sanity_low(), Some(40.0));
        assert_eq!(mare.effective_sanity_high(), Some(60.0));
        assert_eq!(mare.effective_sanity_mid(), None);

        let mut spirit = Ghost::named("Spirit");
        spirit.hunt_sanity = Some(50.0);
        assert_eq!(spirit.effective_sanity_low(), Some(50.0));
        assert_eq!(spirit.effective_sanity_high(), Some(50.0));
    }

    #[test]
    fn load_state_reports_failure_message() {
        let state: CatalogState = GhostCatalog::from_json("{").into();
        assert!(state.error().is_some_and(|msg| msg.contains("parsed")));
        assert!(state.catalog().is_none());
        assert!(CatalogState::default().is_loading());
    }

    #[test]
    fn bundled_catalog_loads() {
        let catalog = GhostCatalog::bundled().unwrap();
        assert!(catalog.len() >= 20);
        assert!(catalog.get(MIMIC_NAME).is_some());
    }
}
