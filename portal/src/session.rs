//! A portal session: both stores plus their persistence.
//!
//! [`Session`] is built once per run. It seeds the task list and the
//! message thread from storage, and after every successful mutation it
//! schedules a debounced save of the collection that changed. Rejected
//! mutations schedule nothing.

use std::sync::Arc;
use std::time::Duration;

use portal_proto::inline::InlineImage;
use portal_proto::message::{Message, Sender};
use portal_proto::task::{Task, TaskId};

use crate::chat::{ChatError, MessageThread};
use crate::storage::{self, Debouncer, KeyValueStore, MESSAGES_KEY, TASKS_KEY};
use crate::tasks::list::DEFAULT_DATE_FORMAT;
use crate::tasks::{TaskError, TaskList};

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period before a change is written to storage.
    pub debounce: Duration,
    /// chrono format for new task dates.
    pub date_format: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: storage::debounce::DEFAULT_DELAY,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Owns the task list, the message thread and their debounced writers.
///
/// Must be created and used inside a tokio runtime.
pub struct Session {
    tasks: TaskList,
    thread: MessageThread,
    task_saver: Debouncer<Vec<Task>>,
    message_saver: Debouncer<Vec<Message>>,
}

impl Session {
    /// Loads both collections from `store` and wires their writers to it.
    ///
    /// Missing or corrupt collections start empty.
    pub fn open(store: Arc<dyn KeyValueStore>, config: &SessionConfig) -> Self {
        let tasks: Vec<Task> = storage::load(store.as_ref(), TASKS_KEY, Vec::new());
        let messages: Vec<Message> = storage::load(store.as_ref(), MESSAGES_KEY, Vec::new());
        tracing::info!(
            tasks = tasks.len(),
            messages = messages.len(),
            "session loaded"
        );

        let task_store = Arc::clone(&store);
        let task_saver = Debouncer::new(config.debounce, move |tasks: Vec<Task>| {
            storage::save(task_store.as_ref(), TASKS_KEY, &tasks);
        });
        let message_saver = Debouncer::new(config.debounce, move |messages: Vec<Message>| {
            storage::save(store.as_ref(), MESSAGES_KEY, &messages);
        });

        Self {
            tasks: TaskList::from_tasks(tasks).with_date_format(config.date_format.clone()),
            thread: MessageThread::from_messages(messages),
            task_saver,
            message_saver,
        }
    }

    /// The task list.
    #[must_use]
    pub const fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    /// The message thread.
    #[must_use]
    pub const fn thread(&self) -> &MessageThread {
        &self.thread
    }

    /// Adds a task and schedules a save.
    ///
    /// # Errors
    ///
    /// See [`TaskList::add`].
    pub fn add_task(&mut self, text: &str, image: Option<InlineImage>) -> Result<TaskId, TaskError> {
        let id = self.tasks.add(text, image)?.id.clone();
        self.persist_tasks();
        Ok(id)
    }

    /// Completes a task and schedules a save.
    ///
    /// # Errors
    ///
    /// See [`TaskList::complete`].
    pub fn complete_task(&mut self, id: &TaskId) -> Result<(), TaskError> {
        self.tasks.complete(id)?;
        self.persist_tasks();
        Ok(())
    }

    /// Reorders open tasks and schedules a save.
    ///
    /// # Errors
    ///
    /// See [`TaskList::reorder`].
    pub fn reorder_tasks(&mut self, from: usize, to: usize) -> Result<(), TaskError> {
        self.tasks.reorder(from, to)?;
        self.persist_tasks();
        Ok(())
    }

    /// Sets a task's installer note and schedules a save.
    ///
    /// # Errors
    ///
    /// See [`TaskList::annotate`].
    pub fn annotate_task(&mut self, id: &TaskId, note: Option<&str>) -> Result<(), TaskError> {
        self.tasks.annotate(id, note)?;
        self.persist_tasks();
        Ok(())
    }

    /// Appends a message and schedules a save.
    ///
    /// # Errors
    ///
    /// See [`MessageThread::append`].
    pub fn send_message(
        &mut self,
        text: Option<&str>,
        image: Option<InlineImage>,
        sender: Sender,
    ) -> Result<(), ChatError> {
        self.thread.append(text, image, sender)?;
        self.message_saver.schedule(self.thread.snapshot());
        Ok(())
    }

    /// Whether any write is still waiting for its debounce delay.
    #[must_use]
    pub fn has_pending_writes(&self) -> bool {
        self.task_saver.is_pending() || self.message_saver.is_pending()
    }

    /// Writes any pending snapshots now.
    pub fn flush(&mut self) {
        let tasks = self.task_saver.flush();
        let messages = self.message_saver.flush();
        if tasks || messages {
            tracing::info!(tasks, messages, "session flushed");
        }
    }

    fn persist_tasks(&mut self) {
        self.task_saver.schedule(self.tasks.snapshot());
    }
}
