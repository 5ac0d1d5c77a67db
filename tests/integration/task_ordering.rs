//! Integration tests for task ordering through the view layer.
//!
//! Reordering works on the open view: completed tasks keep their slots
//! in the stored list and are never moved past.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use portal::app::{App, PanelFocus};
use portal::config::PortalConfig;
use portal::session::{Session, SessionConfig};
use portal::storage::{self, MemoryStore, TASKS_KEY};
use portal::tasks::{TaskError, TaskList};
use portal_proto::task::Task;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn list_of(texts: &[&str]) -> TaskList {
    let mut list = TaskList::new();
    for text in texts {
        list.add(text, None).unwrap();
    }
    list
}

fn open_texts(list: &TaskList) -> Vec<&str> {
    list.open().map(|t| t.text.as_str()).collect()
}

fn all_texts(list: &TaskList) -> Vec<&str> {
    list.tasks().iter().map(|t| t.text.as_str()).collect()
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
}

// ---------------------------------------------------------------------------
// TaskList
// ---------------------------------------------------------------------------

#[test]
fn reorder_skips_over_completed_tasks() {
    let mut list = list_of(&["A", "B", "C", "D"]);
    let b = list.tasks()[1].id.clone();
    list.complete(&b).unwrap();
    assert_eq!(open_texts(&list), vec!["A", "C", "D"]);

    // Move "A" (open index 0) to open index 2, after "D".
    list.reorder(0, 2).unwrap();
    assert_eq!(open_texts(&list), vec!["C", "D", "A"]);
    assert_eq!(all_texts(&list).len(), 4);
    assert!(list.completed().any(|t| t.text == "B"));
}

#[test]
fn reorder_out_of_range_changes_nothing() {
    let mut list = list_of(&["A", "B"]);
    let a = list.tasks()[0].id.clone();
    list.complete(&a).unwrap();

    let err = list.reorder(0, 1).unwrap_err();
    assert_eq!(err, TaskError::IndexOutOfRange { index: 1, len: 1 });
    assert_eq!(all_texts(&list), vec!["A", "B"]);
}

#[test]
fn completing_does_not_change_relative_order() {
    let mut list = list_of(&["A", "B", "C"]);
    let b = list.tasks()[1].id.clone();
    list.complete(&b).unwrap();
    assert_eq!(open_texts(&list), vec!["A", "C"]);
    assert_eq!(all_texts(&list), vec!["A", "B", "C"]);
}

// ---------------------------------------------------------------------------
// Through the App
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn keyboard_reorder_is_persisted() {
    let store = Arc::new(MemoryStore::new());
    let session_config = SessionConfig {
        debounce: Duration::from_millis(100),
        ..SessionConfig::default()
    };
    let mut session = Session::open(store.clone(), &session_config);
    for text in ["Order parts", "Book visit", "Pay invoice"] {
        session.add_task(text, None).unwrap();
    }
    let mut app = App::new(session, &PortalConfig::default());

    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, PanelFocus::Tasks);

    // Select "Pay invoice" and move it to the top.
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('K'));
    press(&mut app, KeyCode::Char('K'));
    assert_eq!(app.selected_task, 0);

    tokio::time::sleep(Duration::from_millis(150)).await;
    let saved: Vec<Task> = storage::load(store.as_ref(), TASKS_KEY, Vec::new());
    let texts: Vec<&str> = saved.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["Pay invoice", "Order parts", "Book visit"]);
}

#[tokio::test(start_paused = true)]
async fn selection_stays_in_range_after_completion() {
    let mut session = Session::open(Arc::new(MemoryStore::new()), &SessionConfig::default());
    session.add_task("A", None).unwrap();
    session.add_task("B", None).unwrap();
    let mut app = App::new(session, &PortalConfig::default());

    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.session.tasks().open_len(), 0);
    assert_eq!(app.selected_task, 0);

    // Nothing left to complete or move.
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('J'));
    assert_eq!(app.session.tasks().completed().count(), 2);
}
