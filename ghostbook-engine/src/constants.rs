//! Centralized reference values for Ghostbook filter and timer logic.
//!
//! The bucket edges and durations mirror what players see in game. They live
//! here and not in the catalog JSON, so a data update cannot move them.

// Ghost identity ------------------------------------------------------------
/// The one ghost whose matching rules are special-cased.
pub const MIMIC_NAME: &str = "The Mimic";

// Speed ---------------------------------------------------------------------
/// Default hunt speed in metres per second; the edge of every speed bucket.
pub const NORMAL_SPEED: f64 = 1.7;

// Hunt sanity bands (percent) -------------------------------------------------
pub(crate) const SANITY_HIGH_FLOOR: f64 = 80.0;
pub(crate) const SANITY_HIGH_CEILING: f64 = 100.0;
pub(crate) const SANITY_MEDIUM_FLOOR: f64 = 60.0;
pub(crate) const SANITY_MEDIUM_CEILING: f64 = 80.0;
pub(crate) const SANITY_FIFTY: f64 = 50.0;
pub(crate) const SANITY_LOW_CEILING: f64 = 40.0;

// Timers --------------------------------------------------------------------
pub const SMUDGE_TIMER_ID: &str = "smudge";
pub const HUNT_COOLDOWN_TIMER_ID: &str = "huntCooldown";
pub const SMUDGE_DURATION_SECS: u64 = 180;
pub const HUNT_COOLDOWN_DURATION_SECS: u64 = 25;
pub const DEFAULT_TICK_MILLIS: u64 = 1_000;

// Unique evidence -----------------------------------------------------------
/// Separator between ghost names in a unique-evidence descriptor.
pub(crate) const GHOST_LIST_SEPARATOR: &str = ", ";
