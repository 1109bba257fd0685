//! Per-item review history.
//!
//! The ledger is the source of truth for an item's schedule. It keeps
//! entries in insertion order, accepts timestamps in any order, and hands
//! the replay engine a chronological view.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::model::{Millis, Rating, ReviewLogEntry};

/// Insertion-ordered review log of one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<ReviewLogEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rating at `at`. Backdated and future-dated entries are allowed.
    pub fn append(&mut self, rating: Rating, at: Millis) -> ReviewLogEntry {
        let entry = ReviewLogEntry::new(rating, at);
        self.entries.push(entry.clone());
        entry
    }

    /// Insert an entry that already has an identifier (e.g. from an import).
    pub fn insert(&mut self, entry: ReviewLogEntry) {
        self.entries.push(entry);
    }

    /// Delete the entry with `entry_id`. `item_id` is only used for the error.
    pub fn remove(
        &mut self,
        item_id: &str,
        entry_id: &str,
    ) -> Result<ReviewLogEntry, ScheduleError> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| ScheduleError::EntryNotFound {
                item: item_id.to_string(),
                entry: entry_id.to_string(),
            })?;
        Ok(self.entries.remove(pos))
    }

    /// Entries ascending by review time; ties keep insertion order.
    pub fn sorted(&self) -> Vec<&ReviewLogEntry> {
        let mut sorted: Vec<&ReviewLogEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.reviewed_at);
        sorted
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ReviewLogEntry] {
        &self.entries
    }

    pub fn get(&self, entry_id: &str) -> Option<&ReviewLogEntry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    /// Latest review time, regardless of insertion order.
    pub fn latest(&self) -> Option<Millis> {
        self.entries.iter().map(|e| e.reviewed_at).max()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ReviewLogEntry> for Ledger {
    fn from_iter<I: IntoIterator<Item = ReviewLogEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
