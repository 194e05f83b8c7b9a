//! Filter engine: decides whether a ghost is consistent with the current
//! tri-state selections.
//!
//! Every facet predicate is a conjunction over the non-neutral keys of its
//! selection, so an empty selection is vacuously satisfied. The four facet
//! predicates are ANDed together by [`matches`].

use crate::catalog::Ghost;
use crate::constants::{
    NORMAL_SPEED, SANITY_FIFTY, SANITY_HIGH_CEILING, SANITY_HIGH_FLOOR, SANITY_LOW_CEILING,
    SANITY_MEDIUM_CEILING, SANITY_MEDIUM_FLOOR,
};
use crate::evidence::Evidence;
use crate::selection::{FacetSelection, SanityBucket, Selections, SpeedBucket, TriState};
use crate::unique_evidence::UniqueEvidenceTable;

/// True when the ghost survives every non-neutral selection.
#[must_use]
pub fn matches(ghost: &Ghost, selections: &Selections, table: &UniqueEvidenceTable) -> bool {
    evidence_matches(ghost, &selections.evidence, None)
        && speed_matches(ghost, &selections.speed)
        && unique_matches(ghost, &selections.unique, table)
        && sanity_matches(ghost, &selections.sanity)
}

/// Evidence facet. `skip` leaves one key out, for impossibility checks.
#[must_use]
pub fn evidence_matches(
    ghost: &Ghost,
    selection: &FacetSelection<Evidence>,
    skip: Option<Evidence>,
) -> bool {
    selection
        .active()
        .filter(|(ev, _)| Some(**ev) != skip)
        .all(|(ev, state)| holds(state, ghost.can_have_evidence(*ev)))
}

#[must_use]
pub fn speed_matches(ghost: &Ghost, selection: &FacetSelection<SpeedBucket>) -> bool {
    selection
        .active()
        .all(|(bucket, state)| speed_bucket_matches(ghost, *bucket, state))
}

/// A single speed bucket. Ghosts without any defined speed always pass, and
/// the Mimic passes every included bucket.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn speed_bucket_matches(ghost: &Ghost, bucket: SpeedBucket, state: TriState) -> bool {
    if state.is_neutral() {
        return true;
    }
    if ghost.is_mimic() && state == TriState::Included {
        return true;
    }
    let speeds: Vec<f64> = ghost.speeds().collect();
    if speeds.is_empty() {
        return true;
    }
    let included = state == TriState::Included;
    match bucket {
        SpeedBucket::Slow if included => speeds.iter().any(|s| *s < NORMAL_SPEED),
        SpeedBucket::Slow => speeds.iter().all(|s| *s >= NORMAL_SPEED),
        // "normal" wants every speed at 1.7, unlike slow/fast which want any.
        SpeedBucket::Normal if included => speeds.iter().all(|s| *s == NORMAL_SPEED),
        SpeedBucket::Normal => speeds.iter().any(|s| *s != NORMAL_SPEED),
        SpeedBucket::Fast if included => speeds.iter().any(|s| *s > NORMAL_SPEED),
        SpeedBucket::Fast => speeds.iter().all(|s| *s <= NORMAL_SPEED),
        SpeedBucket::Los if included => ghost.has_los == Some(true),
        SpeedBucket::Los => ghost.has_los == Some(false),
    }
}

/// Unique-evidence facet. The Mimic can copy any tell, so it passes every
/// key in either state.
#[must_use]
pub fn unique_matches(
    ghost: &Ghost,
    selection: &FacetSelection<String>,
    table: &UniqueEvidenceTable,
) -> bool {
    if ghost.is_mimic() {
        return true;
    }
    selection.active().all(|(id, state)| {
        let listed = table.get(id).is_some_and(|entry| entry.names_ghost(&ghost.name));
        holds(state, listed)
    })
}

#[must_use]
pub fn sanity_matches(ghost: &Ghost, selection: &FacetSelection<SanityBucket>) -> bool {
    selection
        .active()
        .all(|(bucket, state)| holds(state, in_sanity_bucket(ghost, *bucket)))
}

/// Bucket membership. The high and low bands fall back to the mid threshold
/// only, never across to the opposite end.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn in_sanity_bucket(ghost: &Ghost, bucket: SanityBucket) -> bool {
    match bucket {
        SanityBucket::High => ghost
            .sanity_band_high()
            .is_some_and(|v| (SANITY_HIGH_FLOOR..=SANITY_HIGH_CEILING).contains(&v)),
        SanityBucket::Medium => ghost
            .sanity_band_high()
            .is_some_and(|v| (SANITY_MEDIUM_FLOOR..=SANITY_MEDIUM_CEILING).contains(&v)),
        SanityBucket::Fifty => ghost.effective_sanity_mid() == Some(SANITY_FIFTY),
        SanityBucket::Low => ghost
            .sanity_band_low()
            .is_some_and(|v| v > 0.0 && v <= SANITY_LOW_CEILING),
    }
}

/// Ghosts that pass the current selections, in catalog order.
#[must_use]
pub fn remaining<'a>(
    ghosts: &'a [Ghost],
    selections: &Selections,
    table: &UniqueEvidenceTable,
) -> Vec<&'a Ghost> {
    ghosts
        .iter()
        .filter(|g| matches(g, selections, table))
        .collect()
}

/// Would including `evidence` leave nothing? Every other selection is
/// applied, while `evidence` itself is ignored even if already set.
#[must_use]
pub fn is_choice_impossible(
    evidence: Evidence,
    selections: &Selections,
    ghosts: &[Ghost],
    table: &UniqueEvidenceTable,
) -> bool {
    !ghosts
        .iter()
        .filter(|g| {
            evidence_matches(g, &selections.evidence, Some(evidence))
                && speed_matches(g, &selections.speed)
                && unique_matches(g, &selections.unique, table)
                && sanity_matches(g, &selections.sanity)
        })
        .any(|g| g.can_have_evidence(evidence))
}

/// True when no ghost called `name` passes the selections.
#[must_use]
pub fn is_ghost_filtered_out(
    name: &str,
    selections: &Selections,
    ghosts: &[Ghost],
    table: &UniqueEvidenceTable,
) -> bool {
    !ghosts
        .iter()
        .any(|g| g.name == name && matches(g, selections, table))
}

const fn holds(state: TriState, has: bool) -> bool {
    match state {
        TriState::Included => has,
        TriState::Excluded => !has,
        TriState::Neutral => true,
    }
}
