//! Portal: customer task list, support thread and contact card.

pub mod app;
pub mod attachment;
pub mod chat;
pub mod config;
pub mod session;
pub mod storage;
pub mod tasks;
pub mod ui;
