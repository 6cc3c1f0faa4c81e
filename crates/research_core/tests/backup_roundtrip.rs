use research_core::db::{open_db, open_db_in_memory};
use research_core::{
    Actor, BackupBlob, BackupError, BackupService, CalendarDate, Collection, ConfigService,
    Decision, Project, ProjectDraft, ProjectService, ProjectStatus, ProjectType, Publication,
    PublicationDraft, PublicationService, PublicationType, RecordStore, Role, SqliteRecordStore,
    SystemConfig, User, UserDraft, UserService, ValidationService,
};

fn seed(store: SqliteRecordStore<'_>) {
    let user = UserService::new(store)
        .register(UserDraft {
            first_names: "Ana".to_string(),
            last_names: "Vera".to_string(),
            national_id: "1312345678".to_string(),
            email: "ana@uleam.edu.ec".to_string(),
            phone: "0991234567".to_string(),
            role: Role::Researcher,
            faculty: "Ingeniería".to_string(),
            specialty: Some("Redes".to_string()),
        })
        .unwrap();
    let actor = Actor::from(&user);
    let mut article = PublicationDraft::new("Edge caching", "A. Vera", PublicationType::Article, 2024, "es");
    article.journal = Some("Revista".to_string());
    article.impact_factor = Some(1.25);
    let publication = PublicationService::new(store).create(&actor, article).unwrap();
    ProjectService::new(store)
        .create(
            &actor,
            ProjectDraft::new(
                "Coastal sensors",
                ProjectType::Development,
                "A. Vera",
                CalendarDate::new(2023, 6, 1).unwrap(),
                ProjectStatus::InExecution,
            ),
        )
        .unwrap();
    ValidationService::new(store)
        .decide_publication(&Actor::operator("ops"), publication.id, Decision::Validate)
        .unwrap();
}

fn snapshot(store: &SqliteRecordStore<'_>) -> (Vec<User>, Vec<Publication>, Vec<Project>) {
    (
        store.load().unwrap(),
        store.load().unwrap(),
        store.load().unwrap(),
    )
}

#[test]
fn export_then_import_reproduces_collections() {
    let dir = tempfile::tempdir().unwrap();
    let source_conn = open_db(dir.path().join("source.db")).unwrap();
    let source = SqliteRecordStore::new(&source_conn);
    seed(source);
    let operator = Actor::operator("ops");

    let json = BackupService::new(source)
        .export_backup(&operator)
        .unwrap()
        .to_json()
        .unwrap();

    let target_conn = open_db(dir.path().join("target.db")).unwrap();
    let target = SqliteRecordStore::new(&target_conn);
    let summary = BackupService::new(target)
        .import_backup(&operator, &json)
        .unwrap();

    assert_eq!(summary.users, 1);
    assert_eq!(summary.publications, 1);
    assert_eq!(summary.projects, 1);
    assert_eq!(snapshot(&target), snapshot(&source));
}

#[test]
fn backup_json_uses_collection_keys() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    seed(store);

    let json = BackupService::new(store)
        .export_backup(&Actor::operator("ops"))
        .unwrap()
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["users"].as_array().unwrap().len(), 1);
    assert_eq!(value["publications"][0]["type"], "article");
    assert_eq!(value["publications"][0]["validation"]["status"], "validated");
    assert_eq!(value["projects"][0]["start_date"], "2023-06-01");
    assert!(value["exported_at"].as_i64().unwrap() > 0);
}

#[test]
fn invalid_backup_leaves_storage_untouched() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    seed(store);
    let before = snapshot(&store);

    let err = BackupService::new(store)
        .import_backup(&Actor::operator("ops"), r#"{"users": [{"id": "oops"}]}"#)
        .unwrap_err();

    assert!(matches!(err, BackupError::Parse(_)));
    assert_eq!(snapshot(&store), before);
}

#[test]
fn missing_arrays_restore_as_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    seed(store);

    let summary = BackupService::new(store)
        .import_backup(&Actor::operator("ops"), r#"{"users": []}"#)
        .unwrap();

    assert_eq!(summary.publications, 0);
    let (users, publications, projects) = snapshot(&store);
    assert!(users.is_empty() && publications.is_empty() && projects.is_empty());
}

#[test]
fn clear_all_keeps_configuration() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    seed(store);
    let operator = Actor::operator("ops");
    let config = SystemConfig {
        system_name: "Registro".to_string(),
        ..SystemConfig::default()
    };
    ConfigService::new(store)
        .update_config(&operator, config.clone())
        .unwrap();

    BackupService::new(store).clear_all(&operator).unwrap();

    let (users, publications, projects) = snapshot(&store);
    assert!(users.is_empty() && publications.is_empty() && projects.is_empty());
    assert_eq!(store.load_raw(Collection::Users).unwrap(), None);
    assert_eq!(ConfigService::new(store).load_config().unwrap(), config);
}

#[test]
fn backup_operations_require_admin() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let visitor = Actor {
        user_id: 5,
        display_name: "Visitor".to_string(),
        role: Role::Lecturer,
    };
    let service = BackupService::new(store);

    assert!(matches!(
        service.export_backup(&visitor).unwrap_err(),
        BackupError::Forbidden
    ));
    assert!(matches!(
        service.import_backup(&visitor, "{}").unwrap_err(),
        BackupError::Forbidden
    ));
    assert!(matches!(
        service.clear_all(&visitor).unwrap_err(),
        BackupError::Forbidden
    ));
}

#[test]
fn blob_parses_from_json_text() {
    let blob = BackupBlob::from_json(r#"{"exported_at": 7}"#).unwrap();
    assert_eq!(blob.exported_at, 7);
    assert!(blob.users.is_empty());
}
