//! mnemotree-core — Spaced-repetition scheduling for a tree of learning items.
//!
//! This crate defines the data model, the retention model, and the
//! ledger-driven replay that the mnemotree CLI builds on. Scheduling state is
//! always derived from an item's review log, never edited directly.

pub mod error;
pub mod ledger;
pub mod model;
pub mod projection;
pub mod replay;
pub mod retention;
pub mod selector;
pub mod statistics;
pub mod store;
pub mod tree;

pub use error::ScheduleError;
pub use model::{LearningItem, LifecycleStatus, Millis, Rating, ReviewLogEntry, SchedulingState};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
pub use tree::KnowledgeTree;
