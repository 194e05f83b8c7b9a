use ghostbook_engine::{
    Evidence, FacetKey, Ghost, GhostCatalog, Investigation, SanityBucket, SelectionAction,
    Selections, SortOrder, SpeedBucket, TriState, UniqueEvidenceTable, is_choice_impossible,
    matches, remaining,
};

fn bundled() -> (GhostCatalog, UniqueEvidenceTable) {
    (GhostCatalog::bundled().unwrap(), UniqueEvidenceTable::built_in())
}

fn set(selections: &Selections, key: FacetKey, state: TriState) -> Selections {
    selections.reduce(SelectionAction::Set { key, state })
}

fn names(ghosts: &[&Ghost]) -> Vec<String> {
    ghosts.iter().map(|g| g.name.clone()).collect()
}

fn speed_ghost(name: &str, min: f64, max: f64) -> Ghost {
    let mut ghost = Ghost::named(name);
    ghost.min_speed = Some(min);
    ghost.max_speed = Some(max);
    ghost
}

#[test]
fn normal_and_fast_split_demon_and_wraith() {
    let ghosts = vec![speed_ghost("Demon", 1.7, 1.7), speed_ghost("Wraith", 1.7, 2.5)];
    let table = UniqueEvidenceTable::empty();

    let normal = set(&Selections::new(), FacetKey::Speed(SpeedBucket::Normal), TriState::Included);
    assert_eq!(names(&remaining(&ghosts, &normal, &table)), vec!["Demon"]);

    let fast = set(&Selections::new(), FacetKey::Speed(SpeedBucket::Fast), TriState::Included);
    assert_eq!(names(&remaining(&ghosts, &fast, &table)), vec!["Wraith"]);
}

#[test]
fn empty_selection_keeps_whole_catalog() {
    let (catalog, table) = bundled();
    assert_eq!(remaining(&catalog.ghosts, &Selections::new(), &table).len(), catalog.len());
}

#[test]
fn including_more_evidence_never_widens_the_result() {
    let (catalog, table) = bundled();
    let mut selections = Selections::new();
    let mut previous = remaining(&catalog.ghosts, &selections, &table).len();
    for evidence in [Evidence::SpiritBox, Evidence::Freezing, Evidence::Emf5] {
        selections = set(&selections, FacetKey::Evidence(evidence), TriState::Included);
        let now = remaining(&catalog.ghosts, &selections, &table);
        assert!(now.len() <= previous);
        previous = now.len();
    }
    let left = remaining(&catalog.ghosts, &selections, &table);
    assert_eq!(names(&left), vec!["The Twins"]);
}

#[test]
fn rejected_ghosts_stay_rejected_under_any_extra_facet() {
    let (catalog, table) = bundled();
    let base = [Evidence::SpiritBox, Evidence::Freezing, Evidence::Emf5]
        .into_iter()
        .fold(Selections::new(), |acc, ev| {
            set(&acc, FacetKey::Evidence(ev), TriState::Included)
        });
    let rejected: Vec<&Ghost> = catalog
        .iter()
        .filter(|g| !matches(g, &base, &table))
        .collect();
    assert_eq!(rejected.len(), catalog.len() - 1);

    let extra_keys: Vec<FacetKey> = SpeedBucket::ALL
        .into_iter()
        .map(FacetKey::Speed)
        .chain(SanityBucket::ALL.into_iter().map(FacetKey::Sanity))
        .chain(table.iter().map(|e| FacetKey::Unique(e.id.clone())))
        .chain(
            [Evidence::Dots, Evidence::GhostOrbs, Evidence::Writing]
                .into_iter()
                .map(FacetKey::Evidence),
        )
        .collect();

    for state in [TriState::Included, TriState::Excluded] {
        let mut stacked = base.clone();
        for key in &extra_keys {
            let single = set(&base, key.clone(), state);
            stacked = set(&stacked, key.clone(), state);
            for ghost in &rejected {
                assert!(!matches(ghost, &single, &table), "{} with {key:?}", ghost.name);
                assert!(!matches(ghost, &stacked, &table), "{} stacked to {key:?}", ghost.name);
            }
        }
    }
}

#[test]
fn mimic_survives_ghost_orbs_and_speed_picks() {
    let (catalog, table) = bundled();
    let orbs = set(&Selections::new(), FacetKey::Evidence(Evidence::GhostOrbs), TriState::Included);
    assert!(names(&remaining(&catalog.ghosts, &orbs, &table)).contains(&"The Mimic".to_string()));

    let slow = set(&Selections::new(), FacetKey::Speed(SpeedBucket::Slow), TriState::Included);
    assert_eq!(
        names(&remaining(&catalog.ghosts, &slow, &table)),
        vec!["Revenant", "Hantu", "The Twins", "The Mimic", "Moroi", "Deogen", "Thaye"]
    );

    let tell = set(
        &Selections::new(),
        FacetKey::Unique("no_salt".to_string()),
        TriState::Included,
    );
    assert_eq!(
        names(&remaining(&catalog.ghosts, &tell, &table)),
        vec!["Wraith", "The Mimic"]
    );
}

#[test]
fn line_of_sight_exclusion_keeps_flat_hunters() {
    let (catalog, table) = bundled();
    let no_los = set(&Selections::new(), FacetKey::Speed(SpeedBucket::Los), TriState::Excluded);
    assert_eq!(
        names(&remaining(&catalog.ghosts, &no_los, &table)),
        vec!["Jinn", "Revenant", "Hantu", "The Mimic", "Deogen", "Thaye"]
    );
}

#[test]
fn early_hunters_by_sanity() {
    let (catalog, table) = bundled();
    let high = set(&Selections::new(), FacetKey::Sanity(SanityBucket::High), TriState::Included);
    let left = names(&remaining(&catalog.ghosts, &high, &table));
    assert!(left.contains(&"Demon".to_string()));
    assert!(left.contains(&"Yokai".to_string()));
    assert!(!left.contains(&"Spirit".to_string()));
}

#[test]
fn choice_becomes_impossible_once_evidence_conflicts() {
    let (catalog, table) = bundled();
    let mut selections = Selections::new();
    for evidence in [Evidence::Emf5, Evidence::SpiritBox, Evidence::Freezing] {
        selections = set(&selections, FacetKey::Evidence(evidence), TriState::Included);
    }
    assert!(is_choice_impossible(Evidence::Writing, &selections, &catalog.ghosts, &table));
    assert!(!is_choice_impossible(Evidence::Freezing, &selections, &catalog.ghosts, &table));
}

#[test]
fn investigation_round_trip_on_bundled_data() {
    let (catalog, table) = bundled();
    let mut investigation = Investigation::new();
    investigation.apply(SelectionAction::Cycle(FacetKey::Evidence(Evidence::Ultraviolet)));
    investigation.exclude_ghost("Demon", &table);
    investigation.set_sort(SortOrder::Alphabetical);

    let visible = names(&investigation.visible_ghosts(&catalog.ghosts, &table));
    assert!(!visible.contains(&"Demon".to_string()));
    assert_eq!(visible.first().map(String::as_str), Some("Banshee"));
    assert_eq!(
        investigation.selections.unique.get("hunts_after_smudge_1"),
        TriState::Excluded
    );

    investigation.set_search("demon");
    let visible = names(&investigation.visible_ghosts(&catalog.ghosts, &table));
    assert_eq!(visible.first().map(String::as_str), Some("Demon"));

    let round_trip: Investigation =
        serde_json::from_str(&serde_json::to_string(&investigation).unwrap()).unwrap();
    assert_eq!(round_trip, investigation);
}
