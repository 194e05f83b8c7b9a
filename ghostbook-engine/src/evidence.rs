//! The seven standard evidence types.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Evidence {
    #[serde(rename = "EMF 5")]
    Emf5,
    #[serde(rename = "Spirit Box")]
    SpiritBox,
    #[serde(rename = "Ultraviolet")]
    Ultraviolet,
    #[serde(rename = "Ghost Orbs")]
    GhostOrbs,
    #[serde(rename = "Writing")]
    Writing,
    #[serde(rename = "Freezing")]
    Freezing,
    #[serde(rename = "DOTs")]
    Dots,
}

impl Evidence {
    /// Display order used by the evidence chip row.
    pub const ALL: [Self; 7] = [
        Self::Emf5,
        Self::SpiritBox,
        Self::Ultraviolet,
        Self::GhostOrbs,
        Self::Writing,
        Self::Freezing,
        Self::Dots,
    ];

    /// Catalog tag, as it appears in the ghost JSON.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Emf5 => "EMF 5",
            Self::SpiritBox => "Spirit Box",
            Self::Ultraviolet => "Ultraviolet",
            Self::GhostOrbs => "Ghost Orbs",
            Self::Writing => "Writing",
            Self::Freezing => "Freezing",
            Self::Dots => "DOTs",
        }
    }

    /// Long-form label shown next to the chip.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Emf5 => "EMF Level 5",
            Self::SpiritBox => "Spirit Box",
            Self::Ultraviolet => "Ultraviolet",
            Self::GhostOrbs => "Ghost Orb",
            Self::Writing => "Ghost Writing",
            Self::Freezing => "Freezing Temperatures",
            Self::Dots => "D.O.T.S Projector",
        }
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Raised when a string is not one of the seven evidence tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown evidence `{0}`")]
pub struct UnknownEvidence(pub String);

impl FromStr for Evidence {
    type Err = UnknownEvidence;

    /// Accepts the catalog tag or the long label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|ev| ev.tag().eq_ignore_ascii_case(needle) || ev.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownEvidence(s.to_string()))
    }
}
