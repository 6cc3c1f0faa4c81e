use research_core::db::open_db_in_memory;
use research_core::model::validation::ValidationTransitionError;
use research_core::{
    Actor, CalendarDate, Decision, ProjectDraft, ProjectService, ProjectStatus, ProjectType,
    PublicationDraft, PublicationService, PublicationType, Role, SqliteRecordStore, User,
    UserDraft, UserService, ValidationService, WorkServiceError,
};

fn researcher(store: SqliteRecordStore<'_>) -> User {
    UserService::new(store)
        .register(UserDraft {
            first_names: "Rosa".to_string(),
            last_names: "Macías".to_string(),
            national_id: "1312345678".to_string(),
            email: "rosa@uleam.edu.ec".to_string(),
            phone: "0991112233".to_string(),
            role: Role::Researcher,
            faculty: "Ciencias del Mar".to_string(),
            specialty: None,
        })
        .unwrap()
}

fn admin() -> Actor {
    Actor {
        user_id: 1,
        display_name: "Admin Uno".to_string(),
        role: Role::Admin,
    }
}

fn chapter(title: &str) -> PublicationDraft {
    PublicationDraft::new(title, "R. Macías", PublicationType::BookChapter, 2024, "es")
}

#[test]
fn decision_records_actor_and_is_terminal() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = researcher(store);
    let publication = PublicationService::new(store)
        .create(&Actor::from(&owner), chapter("Mangrove survey"))
        .unwrap();
    let validation = ValidationService::new(store);

    let decided = validation
        .decide_publication(&admin(), publication.id, Decision::Validate)
        .unwrap();
    let stamp = decided.validation.stamp().unwrap();
    assert_eq!(stamp.actor_id, 1);
    assert_eq!(stamp.actor_name, "Admin Uno");
    assert!(stamp.decided_at > 0);

    let err = validation
        .decide_publication(&admin(), publication.id, Decision::Reject)
        .unwrap_err();
    assert!(matches!(
        err,
        WorkServiceError::Validation(ValidationTransitionError::AlreadyDecided("validated"))
    ));

    let stored = PublicationService::new(store)
        .get(publication.id)
        .unwrap()
        .unwrap();
    assert!(stored.validation.is_validated());
    assert_eq!(stored.validation.stamp(), Some(stamp));
}

#[test]
fn only_admins_decide() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = researcher(store);
    let publication = PublicationService::new(store)
        .create(&Actor::from(&owner), chapter("Self approval"))
        .unwrap();

    let err = ValidationService::new(store)
        .decide_publication(&Actor::from(&owner), publication.id, Decision::Validate)
        .unwrap_err();
    assert!(matches!(err, WorkServiceError::Forbidden(_)));
}

#[test]
fn deciding_missing_record_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let validation = ValidationService::new(SqliteRecordStore::new(&conn));

    let err = validation
        .decide_project(&admin(), 404, Decision::Reject)
        .unwrap_err();
    assert!(matches!(err, WorkServiceError::NotFound { id: 404, .. }));
}

#[test]
fn pending_queue_lists_only_undecided_records_in_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = researcher(store);
    let actor = Actor::from(&owner);
    let publications = PublicationService::new(store);
    let first = publications.create(&actor, chapter("First")).unwrap();
    let second = publications.create(&actor, chapter("Second")).unwrap();
    let third = publications.create(&actor, chapter("Third")).unwrap();
    let project = ProjectService::new(store)
        .create(
            &actor,
            ProjectDraft::new(
                "Reef monitoring",
                ProjectType::Research,
                "R. Macías",
                CalendarDate::new(2024, 2, 1).unwrap(),
                ProjectStatus::Planning,
            ),
        )
        .unwrap();
    let validation = ValidationService::new(store);
    validation
        .decide_publication(&admin(), second.id, Decision::Reject)
        .unwrap();

    let queue = validation.pending().unwrap();
    let ids: Vec<i64> = queue.publications.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first.id, third.id]);
    assert_eq!(queue.projects.len(), 1);
    assert_eq!(queue.len(), 3);

    let rejected = validation
        .decide_project(&admin(), project.id, Decision::Reject)
        .unwrap();
    assert!(rejected.validation.is_rejected());
    assert!(validation.pending().unwrap().projects.is_empty());
}

#[test]
fn owner_edit_after_rejection_keeps_flag() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let owner = researcher(store);
    let actor = Actor::from(&owner);
    let publications = PublicationService::new(store);
    let created = publications.create(&actor, chapter("Draft")).unwrap();
    ValidationService::new(store)
        .decide_publication(&admin(), created.id, Decision::Reject)
        .unwrap();

    let edited = publications
        .update(&actor, created.id, chapter("Revised"))
        .unwrap();
    assert!(edited.validation.is_rejected());
}
