use research_core::db::open_db_in_memory;
use research_core::{
    filter_records, Actor, FilterCriteria, FilterError, Publication, PublicationDraft,
    PublicationService, PublicationType, RecordStore, Role, SqliteRecordStore, UserDraft,
    UserService,
};

fn seeded_publications() -> Vec<Publication> {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let user = UserService::new(store)
        .register(UserDraft {
            first_names: "Ana".to_string(),
            last_names: "Vera".to_string(),
            national_id: "1312345678".to_string(),
            email: "ana@uleam.edu.ec".to_string(),
            phone: "0991234567".to_string(),
            role: Role::Researcher,
            faculty: "Ingeniería".to_string(),
            specialty: None,
        })
        .unwrap();
    let actor = Actor::from(&user);
    let service = PublicationService::new(store);
    let rows = [
        ("Rural networks", PublicationType::Review, 2019, Some("10.1000/abc")),
        ("Network slicing", PublicationType::ConferencePaper, 2021, None),
        ("Soil microbiome", PublicationType::Review, 2021, None),
        ("Fisheries networks", PublicationType::Editorial, 2023, Some("10.5555/net")),
        ("Coastal erosion", PublicationType::Review, 2023, None),
    ];
    for (title, kind, year, doi) in rows {
        let mut draft = PublicationDraft::new(title, "A. Vera", kind, year, "en");
        draft.doi = doi.map(str::to_string);
        service.create(&actor, draft).unwrap();
    }
    store.load().unwrap()
}

fn is_subsequence(hits: &[&Publication], all: &[Publication]) -> bool {
    let mut remaining = all.iter();
    hits.iter()
        .all(|hit| remaining.any(|candidate| candidate.id == hit.id))
}

#[test]
fn results_are_order_preserving_subsequences() {
    let all = seeded_publications();
    let criteria = [
        FilterCriteria::new(),
        FilterCriteria::new().search("network"),
        FilterCriteria::new().equals("type", "review"),
        FilterCriteria::new().year("year", 2021),
        FilterCriteria::new().contains("doi", "10."),
        FilterCriteria::new()
            .search("NET")
            .year("year", 2023)
            .equals("validation", "unset"),
    ];

    for criterion in &criteria {
        let hits = filter_records(&all, criterion).unwrap();
        assert!(is_subsequence(&hits, &all), "order broken for {criterion:?}");
    }
}

#[test]
fn blank_criteria_match_everything() {
    let all = seeded_publications();
    let hits = filter_records(
        &all,
        &FilterCriteria::new().search("   ").contains("title", ""),
    )
    .unwrap();
    assert_eq!(hits.len(), all.len());
}

#[test]
fn absent_optional_field_never_matches() {
    let all = seeded_publications();
    let hits = filter_records(&all, &FilterCriteria::new().contains("doi", "10")).unwrap();
    let titles: Vec<&str> = hits.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Rural networks", "Fisheries networks"]);
}

#[test]
fn enum_fields_match_exactly() {
    let all = seeded_publications();
    let hits = filter_records(&all, &FilterCriteria::new().equals("type", "rev")).unwrap();
    assert!(hits.is_empty());
    let hits = filter_records(&all, &FilterCriteria::new().equals("type", "review")).unwrap();
    assert_eq!(hits.len(), 3);
}

#[test]
fn unknown_fields_and_mismatched_criteria_are_rejected() {
    let all = seeded_publications();

    assert_eq!(
        filter_records(&all, &FilterCriteria::new().equals("color", "red")).unwrap_err(),
        FilterError::UnknownField("color".to_string())
    );
    assert!(matches!(
        filter_records(&all, &FilterCriteria::new().contains("year", "20")).unwrap_err(),
        FilterError::UnsupportedCriterion { .. }
    ));
    assert!(matches!(
        filter_records(&all, &FilterCriteria::new().equals("year", "twenty")).unwrap_err(),
        FilterError::InvalidValue { .. }
    ));
}
