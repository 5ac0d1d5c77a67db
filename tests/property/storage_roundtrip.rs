//! Property-based tests for the task list and its storage.
//!
//! Uses proptest to verify:
//! 1. After any sequence of task operations, the list saved to a store
//!    loads back identical.
//! 2. Reordering never moves completed tasks and never loses a task.
//! 3. A quota-limited store never holds more than its quota, and a
//!    rejected write leaves the previous value readable.
//! 4. Arbitrary stored text loads as either the decoded list or the
//!    fallback, never a panic.

#![allow(clippy::unwrap_used)]

use portal::storage::{self, KeyValueStore, MemoryStore, TASKS_KEY};
use portal::tasks::TaskList;
use portal_proto::codec;
use portal_proto::task::Task;
use proptest::prelude::*;

/// One user action on the task list.
#[derive(Debug, Clone)]
enum Op {
    Add(String),
    Complete(usize),
    Reorder(usize, usize),
    Annotate(usize, Option<String>),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => "[a-zA-Z ]{0,30}".prop_map(Op::Add),
        1 => (0usize..12).prop_map(Op::Complete),
        2 => (0usize..12, 0usize..12).prop_map(|(a, b)| Op::Reorder(a, b)),
        1 => (0usize..12, prop::option::of("[a-z ]{0,20}")).prop_map(|(i, n)| Op::Annotate(i, n)),
    ]
}

/// Applies `op`, ignoring rejected operations.
fn apply(list: &mut TaskList, op: &Op) {
    match op {
        Op::Add(text) => {
            let _ = list.add(text, None);
        }
        Op::Complete(i) => {
            if let Some(id) = list.tasks().get(*i).map(|t| t.id.clone()) {
                let _ = list.complete(&id);
            }
        }
        Op::Reorder(from, to) => {
            let _ = list.reorder(*from, *to);
        }
        Op::Annotate(i, note) => {
            if let Some(id) = list.tasks().get(*i).map(|t| t.id.clone()) {
                let _ = list.annotate(&id, note.as_deref());
            }
        }
    }
}

fn build(ops: &[Op]) -> TaskList {
    let mut list = TaskList::new();
    for op in ops {
        apply(&mut list, op);
    }
    list
}

proptest! {
    #[test]
    fn saved_list_loads_back_identical(ops in prop::collection::vec(arb_op(), 0..40)) {
        let list = build(&ops);
        let store = MemoryStore::new();
        prop_assert!(storage::save(&store, TASKS_KEY, list.tasks()));
        let back: Vec<Task> = storage::load(&store, TASKS_KEY, Vec::new());
        prop_assert_eq!(back, list.snapshot());
    }

    #[test]
    fn reorder_keeps_completed_in_place(
        ops in prop::collection::vec(arb_op(), 0..40),
        from in 0usize..12,
        to in 0usize..12,
    ) {
        let mut list = build(&ops);
        let before = list.snapshot();
        let result = list.reorder(from, to);
        let after = list.snapshot();

        prop_assert_eq!(before.len(), after.len());
        for (old, new) in before.iter().zip(&after) {
            if old.completed {
                prop_assert_eq!(&old.id, &new.id);
            }
        }
        if result.is_err() {
            prop_assert_eq!(before, after);
        } else {
            let mut old_ids: Vec<_> = before.iter().map(|t| t.id.clone()).collect();
            let mut new_ids: Vec<_> = after.iter().map(|t| t.id.clone()).collect();
            old_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            new_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            prop_assert_eq!(old_ids, new_ids);
        }
    }

    #[test]
    fn quota_is_never_exceeded(
        quota in 16usize..512,
        writes in prop::collection::vec(("[a-c]", "[a-z]{0,200}"), 1..20),
    ) {
        let store = MemoryStore::with_quota(quota);
        for (key, value) in &writes {
            let previous = store.get(key).unwrap();
            if store.set(key, value).is_err() {
                prop_assert_eq!(store.get(key).unwrap(), previous);
            }
            prop_assert!(store.used_bytes() <= quota);
        }
    }

    #[test]
    fn arbitrary_stored_text_loads_or_falls_back(text in ".{0,300}") {
        let store = MemoryStore::new();
        store.set(TASKS_KEY, &text).unwrap();
        let loaded: Vec<Task> = storage::load(&store, TASKS_KEY, Vec::new());
        match codec::decode::<Vec<Task>>(&text) {
            Ok(decoded) => prop_assert_eq!(loaded, decoded),
            Err(_) => prop_assert!(loaded.is_empty()),
        }
    }
}
