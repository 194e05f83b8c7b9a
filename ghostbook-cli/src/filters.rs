use ghostbook_engine::{
    Evidence, FacetKey, GhostCatalog, Investigation, SanityBucket, SelectionAction, SortOrder,
    SpeedBucket, TriState, UniqueEvidenceTable,
};
use thiserror::Error;

use crate::util::split_csv;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("empty {facet} token")]
    EmptyToken { facet: &'static str },
    #[error("unknown {facet} `{value}`")]
    UnknownKey { facet: &'static str, value: String },
    #[error("unknown sort order `{0}`")]
    UnknownSort(String),
}

/// Raw command-line facet selections, each a comma-separated token list.
#[derive(Debug, Clone, Default)]
pub struct FilterArgs<'a> {
    pub evidence: &'a str,
    pub speed: &'a str,
    pub sanity: &'a str,
    pub unique: &'a str,
    pub search: &'a str,
    pub exclude_ghosts: &'a str,
    pub sort: &'a str,
}

/// `+key` includes, `-key` excludes, a bare key includes.
pub fn parse_token(token: &str) -> (TriState, &str) {
    let token = token.trim();
    if let Some(rest) = token.strip_prefix('-') {
        (TriState::Excluded, rest.trim())
    } else if let Some(rest) = token.strip_prefix('+') {
        (TriState::Included, rest.trim())
    } else {
        (TriState::Included, token)
    }
}

fn facet_tokens(
    raw: &str,
    facet: &'static str,
    resolve: impl Fn(&str) -> Option<FacetKey>,
) -> Result<Vec<SelectionAction>, SelectionError> {
    split_csv(raw)
        .iter()
        .map(|token| {
            let (state, key) = parse_token(token);
            if key.is_empty() {
                return Err(SelectionError::EmptyToken { facet });
            }
            let key = resolve(key).ok_or_else(|| SelectionError::UnknownKey {
                facet,
                value: key.to_string(),
            })?;
            Ok(SelectionAction::Set { key, state })
        })
        .collect()
}

/// Every selection action described by `args`, in facet order.
pub fn selection_actions(
    args: &FilterArgs<'_>,
    table: &UniqueEvidenceTable,
) -> Result<Vec<SelectionAction>, SelectionError> {
    let mut actions = facet_tokens(args.evidence, "evidence", |key| {
        key.parse::<Evidence>().ok().map(FacetKey::Evidence)
    })?;
    actions.extend(facet_tokens(args.speed, "speed bucket", |key| {
        key.parse::<SpeedBucket>().ok().map(FacetKey::Speed)
    })?);
    actions.extend(facet_tokens(args.sanity, "sanity bucket", |key| {
        key.parse::<SanityBucket>().ok().map(FacetKey::Sanity)
    })?);
    actions.extend(facet_tokens(args.unique, "unique evidence", |key| {
        table.get(key).map(|entry| FacetKey::Unique(entry.id.clone()))
    })?);
    Ok(actions)
}

/// Build the investigation the command line describes. Unknown ghost names
/// in the exclusion list are skipped with a warning.
pub fn build_investigation(
    args: &FilterArgs<'_>,
    catalog: &GhostCatalog,
    table: &UniqueEvidenceTable,
) -> Result<Investigation, SelectionError> {
    let mut investigation = Investigation::new();
    for action in selection_actions(args, table)? {
        investigation.apply(action);
    }
    for name in split_csv(args.exclude_ghosts) {
        match catalog.iter().find(|g| g.name.eq_ignore_ascii_case(&name)) {
            Some(ghost) => investigation.exclude_ghost(&ghost.name, table),
            None => log::warn!("ignoring unknown ghost `{name}`"),
        }
    }
    investigation.set_search(args.search.trim());
    let sort = if args.sort.trim().is_empty() {
        SortOrder::Default
    } else {
        args.sort
            .parse::<SortOrder>()
            .map_err(|err| SelectionError::UnknownSort(err.0))?
    };
    investigation.set_sort(sort);
    Ok(investigation)
}
