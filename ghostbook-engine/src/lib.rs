//! Ghostbook Engine
//!
//! Platform-agnostic core logic for the Ghostbook investigation companion.
//! This crate provides the ghost catalog, tri-state evidence filtering and the
//! countdown timers without UI or platform-specific dependencies. The tokio
//! timer worker is available behind the `async` feature.

pub mod catalog;
pub mod constants;
pub mod evidence;
pub mod filter;
pub mod investigation;
pub mod selection;
pub mod timer;
pub mod unique_evidence;
#[cfg(feature = "async")]
pub mod worker;

// Re-export commonly used types
pub use catalog::{CatalogError, CatalogState, Ghost, GhostCatalog, parse_leading_number};
pub use evidence::{Evidence, UnknownEvidence};
pub use filter::{
    evidence_matches, in_sanity_bucket, is_choice_impossible, is_ghost_filtered_out, matches,
    remaining, sanity_matches, speed_bucket_matches, speed_matches, unique_matches,
};
pub use investigation::{
    Investigation, SearchHints, SortOrder, UniqueEvidenceRow, UnknownSortOrder, sort_ghosts,
};
pub use selection::{
    Facet, FacetKey, FacetSelection, SanityBucket, SelectionAction, Selections, SpeedBucket,
    TriState, UnknownBucket,
};
pub use timer::{
    ResetData, RunningTimer, StartData, TimerBook, TimerPreset, TimerRequest, TimerSnapshot,
    format_clock,
};
pub use unique_evidence::{UniqueEvidence, UniqueEvidenceTable};
#[cfg(feature = "async")]
pub use worker::{
    TimerEvents, TimerHandle, TimerListeners, TimerWorkerConfig, WorkerError, spawn_timer_worker,
    spawn_timer_worker_with_task,
};

/// Trait for abstracting where the catalog comes from.
/// Platform-specific implementations should provide this
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the ghost catalog from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or parsed.
    fn load_catalog(&self) -> Result<GhostCatalog, Self::Error>;

    /// Load the unique-evidence table. Defaults to the compiled-in table.
    ///
    /// # Errors
    ///
    /// Returns an error if a platform-specific table cannot be loaded.
    fn load_unique_evidence(&self) -> Result<UniqueEvidenceTable, Self::Error> {
        Ok(UniqueEvidenceTable::built_in())
    }
}

/// Loader for the catalog compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLoader;

impl CatalogLoader for BundledLoader {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<GhostCatalog, Self::Error> {
        GhostCatalog::bundled()
    }
}

/// Entry point tying a loader to the rest of the engine
pub struct Ghostbook<L>
where
    L: CatalogLoader,
{
    loader: L,
}

impl<L> Ghostbook<L>
where
    L: CatalogLoader,
{
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load the catalog into the state the UI shell observes. Failures become
    /// [`CatalogState::Failed`]; there is no retry.
    pub fn load(&self) -> CatalogState {
        let state = CatalogState::from(self.loader.load_catalog());
        if let Some(message) = state.error() {
            log::warn!("ghost catalog failed to load: {message}");
        }
        state
    }

    /// # Errors
    ///
    /// Returns an error if the loader cannot supply the table.
    pub fn unique_evidence(&self) -> Result<UniqueEvidenceTable, L::Error> {
        self.loader.load_unique_evidence()
    }

    /// Fresh investigation state for a new contract.
    #[must_use]
    pub fn new_investigation(&self) -> Investigation {
        Investigation::new()
    }
}

impl Default for Ghostbook<BundledLoader> {
    fn default() -> Self {
        Self::new(BundledLoader)
    }
}
