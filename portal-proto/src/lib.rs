//! Persisted data model for the customer portal.
//!
//! Types in this crate are the exact shape written to the key-value store:
//! `tasks` holds a JSON array of [`task::Task`], `messages` a JSON array of
//! [`message::Message`].

pub mod codec;
pub mod inline;
pub mod message;
pub mod task;
