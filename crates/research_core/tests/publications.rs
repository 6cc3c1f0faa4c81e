use research_core::db::open_db_in_memory;
use research_core::{
    Actor, Collection, ConfigService, FilterCriteria, PublicationDraft, PublicationService,
    PublicationType, Role, SqliteRecordStore, SystemConfig, User, UserDraft, UserService,
    ValidationFlag, WorkServiceError,
};

fn register(store: SqliteRecordStore<'_>, national_id: &str, email: &str, last: &str) -> User {
    UserService::new(store)
        .register(UserDraft {
            first_names: "Ana".to_string(),
            last_names: last.to_string(),
            national_id: national_id.to_string(),
            email: email.to_string(),
            phone: "0987654321".to_string(),
            role: Role::Researcher,
            faculty: "Ingeniería".to_string(),
            specialty: None,
        })
        .unwrap()
}

fn article(title: &str, year: i32) -> PublicationDraft {
    let mut draft = PublicationDraft::new(title, "A. Vera, L. Mera", PublicationType::Article, year, "es");
    draft.journal = Some("Revista Espam Ciencia".to_string());
    draft
}

#[test]
fn create_assigns_owner_and_unset_flag() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = register(store, "1312345678", "ana@uleam.edu.ec", "Vera");
    let service = PublicationService::new(store);

    let created = service
        .create(&Actor::from(&owner), article("Edge caching", 2024))
        .unwrap();

    assert_eq!(created.owner_id, owner.id);
    assert_eq!(created.owner_name, "Ana Vera");
    assert_eq!(created.validation, ValidationFlag::Unset);
    assert_eq!(service.get(created.id).unwrap(), Some(created));
}

#[test]
fn stored_impact_factor_reads_back_exactly() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = register(store, "1312345678", "ana@uleam.edu.ec", "Vera");
    let service = PublicationService::new(store);
    let mut draft = article("Precise metrics", 2024);
    draft.impact_factor = Some(4037.2527929984994);

    let created = service.create(&Actor::from(&owner), draft).unwrap();
    let stored = service.get(created.id).unwrap().unwrap();

    assert_eq!(stored.impact_factor, Some(4037.2527929984994));
    assert_eq!(stored, created);
}

#[test]
fn create_rejects_invalid_form_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = register(store, "1312345678", "ana@uleam.edu.ec", "Vera");
    let service = PublicationService::new(store);
    let mut draft = article("", 1800);
    draft.doi = Some("doi.org/x".to_string());

    match service.create(&Actor::from(&owner), draft).unwrap_err() {
        WorkServiceError::Form(errors) => {
            assert!(errors.contains("title"));
            assert!(errors.contains("year"));
            assert!(errors.contains("doi"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        research_core::RecordStore::load_raw(&store, Collection::Publications).unwrap(),
        None
    );
}

#[test]
fn create_requires_registered_owner() {
    let conn = open_db_in_memory().unwrap();
    let service = PublicationService::new(SqliteRecordStore::new(&conn));
    let ghost = Actor {
        user_id: 77,
        display_name: "Ghost".to_string(),
        role: Role::Researcher,
    };

    let err = service.create(&ghost, article("Orphan", 2020)).unwrap_err();
    assert!(matches!(err, WorkServiceError::OwnerNotFound(77)));
}

#[test]
fn editing_preserves_identifier_creation_time_and_validation() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = register(store, "1312345678", "ana@uleam.edu.ec", "Vera");
    let actor = Actor::from(&owner);
    let service = PublicationService::new(store);
    let first = service.create(&actor, article("First", 2021)).unwrap();
    let created = service.create(&actor, article("Draft title", 2021)).unwrap();
    research_core::ValidationService::new(store)
        .decide_publication(
            &Actor::operator("ops"),
            created.id,
            research_core::Decision::Validate,
        )
        .unwrap();

    let updated = service
        .update(&actor, created.id, article("Final title", 2022))
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.owner_id, created.owner_id);
    assert!(updated.validation.is_validated());
    assert_eq!(updated.title, "Final title");
    assert_eq!(updated.year, 2022);

    let all = service.explore(&FilterCriteria::new()).unwrap();
    let ids: Vec<i64> = all.iter().map(|publication| publication.id).collect();
    assert_eq!(ids, vec![first.id, created.id]);
}

#[test]
fn only_owner_or_admin_may_edit_or_delete() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = register(store, "1312345678", "ana@uleam.edu.ec", "Vera");
    let stranger = register(store, "1398765432", "luis@uleam.edu.ec", "Mera");
    let service = PublicationService::new(store);
    let created = service
        .create(&Actor::from(&owner), article("Mine", 2023))
        .unwrap();

    let err = service
        .update(&Actor::from(&stranger), created.id, article("Hijacked", 2023))
        .unwrap_err();
    assert!(matches!(err, WorkServiceError::Forbidden(_)));
    let err = service
        .delete(&Actor::from(&stranger), created.id)
        .unwrap_err();
    assert!(matches!(err, WorkServiceError::Forbidden(_)));
    assert_eq!(service.get(created.id).unwrap().unwrap().title, "Mine");

    let removed = service
        .delete(&Actor::operator("ops"), created.id)
        .unwrap();
    assert_eq!(removed.id, created.id);
    assert_eq!(service.get(created.id).unwrap(), None);
    assert!(matches!(
        service.delete(&Actor::operator("ops"), created.id).unwrap_err(),
        WorkServiceError::NotFound { id, .. } if id == created.id
    ));
}

#[test]
fn list_mine_is_scoped_to_owner_unless_admin() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let ana = register(store, "1312345678", "ana@uleam.edu.ec", "Vera");
    let luis = register(store, "1398765432", "luis@uleam.edu.ec", "Mera");
    let service = PublicationService::new(store);
    service.create(&Actor::from(&ana), article("Ana one", 2020)).unwrap();
    service.create(&Actor::from(&luis), article("Luis one", 2021)).unwrap();
    service.create(&Actor::from(&ana), article("Ana two", 2022)).unwrap();

    let mine = service
        .list_mine(&Actor::from(&ana), &FilterCriteria::new())
        .unwrap();
    let titles: Vec<&str> = mine.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Ana one", "Ana two"]);

    let filtered = service
        .list_mine(&Actor::from(&ana), &FilterCriteria::new().year("year", 2022))
        .unwrap();
    assert_eq!(filtered.len(), 1);

    let everything = service
        .list_mine(&Actor::operator("ops"), &FilterCriteria::new())
        .unwrap();
    assert_eq!(everything.len(), 3);
}

#[test]
fn explore_combines_search_and_field_criteria() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = register(store, "1312345678", "ana@uleam.edu.ec", "Vera");
    let actor = Actor::from(&owner);
    let service = PublicationService::new(store);
    service.create(&actor, article("Rural networks", 2020)).unwrap();
    let mut book = PublicationDraft::new("Networks in practice", "A. Vera", PublicationType::Book, 2021, "en");
    book.publisher = Some("ULEAM Press".to_string());
    service.create(&actor, book).unwrap();
    service.create(&actor, article("Soil chemistry", 2021)).unwrap();

    let hits = service
        .explore(
            &FilterCriteria::new()
                .search("NETWORK")
                .equals("type", "book"),
        )
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Networks in practice");

    let err = service
        .explore(&FilterCriteria::new().year("title", 2020))
        .unwrap_err();
    assert!(matches!(err, WorkServiceError::Filter(_)));
}

#[test]
fn maintenance_mode_blocks_non_admin_writes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = register(store, "1312345678", "ana@uleam.edu.ec", "Vera");
    ConfigService::new(store)
        .update_config(
            &Actor::operator("ops"),
            SystemConfig {
                maintenance: true,
                ..SystemConfig::default()
            },
        )
        .unwrap();
    let service = PublicationService::new(store);

    let err = service
        .create(&Actor::from(&owner), article("Blocked", 2020))
        .unwrap_err();
    assert!(matches!(err, WorkServiceError::MaintenanceMode));
}
