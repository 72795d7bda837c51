use chrono::{Duration, Utc};
use revisit_core::{
    order_for_session, CardStore, FoldingCollator, PhaseSchedule, Quality, Review, Session,
    SessionConfig,
};
use revisit_json::JsonStore;
use std::fs;

#[tokio::test]
async fn cards_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("cards.json");

    let id = {
        let store = JsonStore::open_file(file.clone()).await.unwrap();
        let card = store.add_card("perro", "dog").await.unwrap();
        let mut updated = card.clone();
        updated.repetitions = 2;
        updated.interval = 6;
        updated.ease_factor = 2.36;
        store.persist(card.id, &updated).await.unwrap();
        store
            .insert_review(&Review::new(card.id, Quality::Good, Utc::now(), 6, 2.36))
            .await
            .unwrap();
        card.id
    };

    let store = JsonStore::open_file(file).await.unwrap();
    let card = store.get_card(id).await.unwrap();
    assert_eq!(card.front, "perro");
    assert_eq!(card.repetitions, 2);
    assert_eq!(card.ease_factor, 2.36);
    assert_eq!(store.list_reviews().await.unwrap().len(), 1);
}

#[tokio::test]
async fn load_due_filters_by_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open_file(dir.path().join("s.json")).await.unwrap();

    let due = store.add_card("a", "1").await.unwrap();
    let later = store.add_card("b", "2").await.unwrap();
    let mut pushed = later.clone();
    pushed.due_at = Utc::now() + Duration::days(3);
    store.persist(later.id, &pushed).await.unwrap();

    let now = Utc::now();
    let cards = store.load_due(now).await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id, due.id);
    assert_eq!(store.load_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn missing_card_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open_file(dir.path().join("s.json")).await.unwrap();
    let ghost = revisit_core::Card::new("x", "y");
    assert!(store.persist(ghost.id, &ghost).await.is_err());
    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn backups_are_rotated() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("s.json");
    let backups = dir.path().join("bk");
    let store = JsonStore::open_with(file, backups.clone(), 2).await.unwrap();
    for i in 0..5 {
        store.add_card(&format!("q{i}"), "a").await.unwrap();
    }
    let n = fs::read_dir(&backups).unwrap().count();
    assert!(n <= 2, "kept {n} backups");
}

#[tokio::test]
async fn backup_failure_does_not_fail_the_write() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("s.json");
    let backups = dir.path().join("bk");
    let store = JsonStore::open_with(file.clone(), backups.clone(), 3).await.unwrap();

    // A plain file where the backups directory should be.
    fs::remove_dir_all(&backups).unwrap();
    fs::write(&backups, b"not a directory").unwrap();

    let card = store.add_card("gato", "cat").await.unwrap();
    assert_eq!(store.get_card(card.id).await.unwrap().front, "gato");

    let raw = fs::read_to_string(&file).unwrap();
    assert!(raw.contains("gato"));
}

#[tokio::test]
async fn study_session_over_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open_file(dir.path().join("s.json")).await.unwrap();
    for f in ["uno", "dos"] {
        store.add_card(f, "").await.unwrap();
    }

    let now = Utc::now();
    let schedule = PhaseSchedule::flat();
    let due = store.load_due(now).await.unwrap();
    let ordered = order_for_session(due, &schedule, &FoldingCollator::new());

    let mut session = Session::new(schedule, SessionConfig::study());
    session.start(ordered).unwrap();
    let first = session.current().unwrap().id;
    session.submit_review(&store, Quality::Good, now).await.unwrap();

    assert_eq!(store.get_card(first).await.unwrap().interval, 1);
    assert!(session.undo(&store).await.unwrap());
    assert_eq!(store.get_card(first).await.unwrap().interval, 0);
    assert!(store.list_reviews().await.unwrap().is_empty());
}
