//! Integration tests for session persistence.
//!
//! Drives a [`Session`] against a real [`FileStore`] in a temporary
//! directory and checks what survives a restart.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use portal::session::{Session, SessionConfig};
use portal::storage::{FileStore, KeyValueStore, MESSAGES_KEY, TASKS_KEY};
use portal_proto::inline::InlineImage;
use portal_proto::message::Sender;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn config() -> SessionConfig {
    SessionConfig {
        debounce: Duration::from_millis(200),
        ..SessionConfig::default()
    }
}

fn open_session(dir: &std::path::Path) -> Session {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir).expect("open store"));
    Session::open(store, &config())
}

fn task_texts(session: &Session) -> Vec<String> {
    session
        .tasks()
        .tasks()
        .iter()
        .map(|t| t.text.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn state_survives_restart_after_debounce() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = open_session(dir.path());
        let first = session.add_task("Replace faucet", None).unwrap();
        session.add_task("Patch drywall", None).unwrap();
        session.complete_task(&first).unwrap();
        session
            .send_message(Some("When can you come?"), None, Sender::Customer)
            .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!session.has_pending_writes());
    }

    let session = open_session(dir.path());
    assert_eq!(task_texts(&session), vec!["Replace faucet", "Patch drywall"]);
    assert!(session.tasks().tasks()[0].completed);
    assert_eq!(session.thread().len(), 1);
    assert_eq!(
        session.thread().messages()[0].text.as_deref(),
        Some("When can you come?")
    );
}

#[tokio::test(start_paused = true)]
async fn flush_persists_without_waiting() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = open_session(dir.path());
        session.add_task("Seal window", None).unwrap();
        session.flush();
    }
    let session = open_session(dir.path());
    assert_eq!(task_texts(&session), vec!["Seal window"]);
}

#[tokio::test(start_paused = true)]
async fn dropped_session_loses_unflushed_changes() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = open_session(dir.path());
        session.add_task("Saved", None).unwrap();
        session.flush();
        session.add_task("Not saved", None).unwrap();
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    let session = open_session(dir.path());
    assert_eq!(task_texts(&session), vec!["Saved"]);
}

#[tokio::test(start_paused = true)]
async fn documents_use_camel_case_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(dir.path());
    let id = session
        .add_task("Fix gate", Some(InlineImage::from_base64("image/jpeg", "AAAA")))
        .unwrap();
    session.annotate_task(&id, Some("Hinge ordered")).unwrap();
    session
        .send_message(None, Some(InlineImage::from_base64("image/jpeg", "BBBB")), Sender::Support)
        .unwrap();
    session.flush();

    let tasks = std::fs::read_to_string(dir.path().join("tasks.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&tasks).unwrap();
    let task = &value[0];
    assert_eq!(task["text"], "Fix gate");
    assert_eq!(task["installerNote"], "Hinge ordered");
    assert_eq!(task["completed"], false);
    assert_eq!(task["image"], "data:image/jpeg;base64,AAAA");

    let messages = std::fs::read_to_string(dir.path().join("messages.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&messages).unwrap();
    assert_eq!(value[0]["sender"], "support");
    assert!(value[0]["timestamp"].is_string());
}

#[tokio::test(start_paused = true)]
async fn corrupt_document_loads_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tasks.json"), "{not json").unwrap();

    let mut session = open_session(dir.path());
    assert!(session.tasks().is_empty());
    session.add_task("Fresh start", None).unwrap();
    session.flush();

    let store = FileStore::open(dir.path()).unwrap();
    let text = store.get(TASKS_KEY).unwrap().unwrap();
    assert!(text.contains("Fresh start"));
    assert!(store.get(MESSAGES_KEY).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn quota_failure_keeps_previous_document() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::with_quota(dir.path(), 400).unwrap());
    let mut session = Session::open(Arc::clone(&store), &config());

    session.add_task("Small task", None).unwrap();
    session.flush();
    let before = store.get(TASKS_KEY).unwrap().unwrap();

    session.add_task(&"x".repeat(1_000), None).unwrap();
    session.flush();

    // The in-memory list keeps the change; storage keeps the last good copy.
    assert_eq!(session.tasks().len(), 2);
    assert_eq!(store.get(TASKS_KEY).unwrap().unwrap(), before);
}

#[tokio::test(start_paused = true)]
async fn repeated_ids_in_storage_keep_the_first_task() {
    let dir = tempfile::tempdir().unwrap();
    let doc = r#"[
        {"id":"dup","text":"Original","date":"1/1/2026","completed":false},
        {"id":"dup","text":"Copy","date":"1/2/2026","completed":false},
        {"id":"other","text":"Other","date":"1/3/2026","completed":false}
    ]"#;
    std::fs::write(dir.path().join("tasks.json"), doc).unwrap();

    let mut session = open_session(dir.path());
    assert_eq!(task_texts(&session), vec!["Original", "Other"]);

    let dup = session.tasks().tasks()[0].id.clone();
    session.complete_task(&dup).unwrap();
    assert_eq!(session.tasks().open_len(), 1);
}
