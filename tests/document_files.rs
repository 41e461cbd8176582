use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use keybasket::session::catalog::{Basket, BasketId, Catalog, Keyword, KeywordId};
use keybasket::session::feedback::FeedbackKind;
use keybasket::session::study::{DropOutcome, DropTarget, Mode, StudySession};
use keybasket::store::json_store::DocumentStore;
use keybasket::store::schema::{DocumentError, IMPORTED_SUBJECT, parse_document};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_into(session: &mut StudySession, store: &DocumentStore, path: &Path) -> Result<usize, DocumentError> {
    let doc = store.import_from(path)?;
    let (subject, catalog, cleared) = doc.into_parts();
    session.replace_document(subject, catalog);
    Ok(cleared)
}

#[test]
fn science_fixture_loads_with_assignments() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().to_path_buf());
    let mut session = StudySession::new();

    let cleared = load_into(&mut session, &store, &fixture("science.json")).unwrap();
    assert_eq!(cleared, 0);
    assert_eq!(session.subject(), "Science 101");
    assert_eq!(session.mode(), Mode::Edit);

    let biology = BasketId(1712000000100);
    let names: Vec<&str> = session
        .basket_keywords(biology)
        .iter()
        .map(|k| k.name.as_str())
        .collect();
    assert_eq!(names, vec!["Cell", "Mitochondria"]);

    let pool: Vec<&str> = session.pool_keywords().iter().map(|k| k.name.as_str()).collect();
    assert_eq!(pool, vec!["Photon"]);
}

#[test]
fn loaded_document_plays_only_assigned_keywords() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().to_path_buf());
    let mut session = StudySession::new();
    load_into(&mut session, &store, &fixture("science.json")).unwrap();

    session.enter_play().unwrap();
    assert_eq!(session.round_size(), 3);
    assert_eq!(session.remaining_count(), 3);

    // The unassigned keyword is not part of the drill.
    assert!(!session.begin_drag(KeywordId(1712000000004)));

    let now = Instant::now();
    let chemistry = DropTarget::Basket(BasketId(1712000000200));
    let biology = DropTarget::Basket(BasketId(1712000000100));

    assert!(session.begin_drag(KeywordId(1712000000002)));
    assert_eq!(
        session.complete_drop_at(chemistry, now),
        DropOutcome::Correct(KeywordId(1712000000002))
    );
    assert!(session.begin_drag(KeywordId(1712000000001)));
    assert_eq!(
        session.complete_drop_at(chemistry, now),
        DropOutcome::Incorrect(KeywordId(1712000000001))
    );
    assert!(session.begin_drag(KeywordId(1712000000001)));
    session.complete_drop_at(biology, now);
    assert!(session.begin_drag(KeywordId(1712000000003)));
    session.complete_drop_at(biology, now);

    assert!(session.is_complete());
    assert_eq!(session.mistakes(), 1);
    assert_eq!(session.solved_count(), 3);
    assert!(session.pool_keywords().is_empty());
}

#[test]
fn export_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().join("docs"));
    let mut session = StudySession::new();
    load_into(&mut session, &store, &fixture("science.json")).unwrap();

    let doc = keybasket::store::schema::Document::from_session(&session);
    let path = store.default_export_path(session.subject());
    store.export_to(&path, &doc).unwrap();
    assert_eq!(path.file_name().unwrap(), "science_101_keywords.json");

    let mut reloaded = StudySession::new();
    load_into(&mut reloaded, &store, &path).unwrap();
    assert_eq!(reloaded.subject(), session.subject());
    assert_eq!(reloaded.catalog(), session.catalog());

    assert_eq!(store.list_documents(), vec![path]);
}

#[test]
fn exported_json_uses_original_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().to_path_buf());
    let mut session = StudySession::new();
    load_into(&mut session, &store, &fixture("science.json")).unwrap();

    let path = dir.path().join("out.json");
    store
        .export_to(&path, &keybasket::store::schema::Document::from_session(&session))
        .unwrap();
    let text = fs::read_to_string(&path).unwrap();

    assert!(text.contains("\"assignedBasket\": 1712000000100"));
    assert!(text.contains("\"assignedBasket\": null"));
    assert!(text.contains("\"version\": \"1.0\""));
    assert!(text.starts_with("{\n  \"subject\": \"Science 101\","));
}

#[test]
fn dangling_assignments_are_cleared_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().to_path_buf());
    let mut session = StudySession::new();

    let cleared = load_into(&mut session, &store, &fixture("dangling.json")).unwrap();
    assert_eq!(cleared, 1);
    assert_eq!(session.subject(), IMPORTED_SUBJECT);

    let orphan = session.catalog().keyword(KeywordId(10)).unwrap();
    assert_eq!(orphan.assigned_basket, None);
    let kept = session.catalog().keyword(KeywordId(11)).unwrap();
    assert_eq!(kept.assigned_basket, Some(BasketId(20)));
}

#[test]
fn rejected_documents_leave_session_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().to_path_buf());
    let mut session = StudySession::new();
    load_into(&mut session, &store, &fixture("science.json")).unwrap();
    let before = session.clone();

    let err = load_into(&mut session, &store, &fixture("duplicate_ids.json")).unwrap_err();
    assert!(matches!(err, DocumentError::DuplicateKeyword(KeywordId(1))));
    assert_eq!(session, before);

    let err = load_into(&mut session, &store, &fixture("string_ids.json")).unwrap_err();
    assert!(matches!(err, DocumentError::Json(_)));
    assert_eq!(session, before);

    let err = load_into(&mut session, &store, &dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, DocumentError::Read { .. }));
    assert_eq!(session, before);
}

#[test]
fn oversized_ids_are_rejected_and_editing_continues() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().to_path_buf());
    let mut session = StudySession::new();
    load_into(&mut session, &store, &fixture("science.json")).unwrap();
    let before = session.clone();

    let err = load_into(&mut session, &store, &fixture("huge_ids.json")).unwrap_err();
    assert!(matches!(err, DocumentError::IdOutOfRange(u64::MAX)));
    assert_eq!(session, before);

    assert!(session.add_keyword("Next").is_some());
}

#[test]
fn exhausted_ids_never_wrap() {
    let (catalog, _) = Catalog::from_parts(
        vec![Keyword {
            id: KeywordId(u64::MAX),
            name: "Big".to_string(),
            assigned_basket: None,
        }],
        Vec::new(),
    );
    let mut session = StudySession::new();
    session.replace_document("Overflow".to_string(), catalog);

    assert_eq!(session.add_keyword("Next"), None);
    assert_eq!(session.catalog().keywords().len(), 1);
}

#[test]
fn malformed_text_is_rejected() {
    for text in ["", "{", "not json at all", "[1, 2, 3]", "{\"keywords\": 5}"] {
        assert!(
            parse_document(text.as_bytes()).is_err(),
            "accepted malformed input {text:?}"
        );
    }
}

#[test]
fn classic_walkthrough() {
    let (catalog, _) = Catalog::from_parts(
        vec![
            Keyword {
                id: KeywordId(1),
                name: "Photosynthesis".to_string(),
                assigned_basket: Some(BasketId(10)),
            },
            Keyword {
                id: KeywordId(2),
                name: "Mitosis".to_string(),
                assigned_basket: Some(BasketId(10)),
            },
        ],
        vec![Basket {
            id: BasketId(10),
            name: "Biology".to_string(),
            color: "hsl(90, 70%, 85%)".to_string(),
        }],
    );
    let mut session = StudySession::with_feedback_ttl(Duration::from_millis(1500));
    session.replace_document("Biology basics".to_string(), catalog);

    session.enter_play().unwrap();
    assert_eq!(session.play_queue().len(), 2);
    assert_eq!(session.mistakes(), 0);

    let t0 = Instant::now();
    session.begin_drag(KeywordId(1));
    session.complete_drop_at(DropTarget::Basket(BasketId(10)), t0);
    assert_eq!(session.play_queue().len(), 1);
    assert_eq!(session.mistakes(), 0);
    assert_eq!(session.feedback(t0), Some(FeedbackKind::Correct));

    let t1 = t0 + Duration::from_millis(500);
    session.begin_drag(KeywordId(2));
    session.complete_drop_at(DropTarget::Basket(BasketId(99)), t1);
    assert_eq!(session.play_queue(), &[KeywordId(2)]);
    assert_eq!(session.mistakes(), 1);
    assert_eq!(session.feedback(t1), Some(FeedbackKind::Incorrect));

    // The second message owns the deadline: still visible past the first
    // message's expiry, gone after its own.
    assert_eq!(
        session.feedback(t0 + Duration::from_millis(1600)),
        Some(FeedbackKind::Incorrect)
    );
    assert!(session.expire_feedback(t1 + Duration::from_millis(1500)));
    assert_eq!(session.feedback(t1 + Duration::from_millis(1500)), None);
}
