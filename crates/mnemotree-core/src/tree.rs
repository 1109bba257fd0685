//! The knowledge tree snapshot.
//!
//! A `KnowledgeTree` is the whole collection the persistence layer loads and
//! saves: a map from identifier to item, where `parent_id` links form a
//! single-rooted tree. Every operation that touches a review log keeps the
//! item's scheduling state equal to a replay of that log.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::model::{LearningItem, LifecycleStatus, Millis, Rating, ReviewLogEntry, ROOT_ID};
use crate::projection::{project_calendar, CalendarDay};
use crate::replay::{apply_review, replay_item};
use crate::selector::select_due;

/// Identifier → item map with tree maintenance operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeTree {
    items: BTreeMap<String, LearningItem>,
}

/// What a validation warning is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Broken parent links, roots or keys.
    Structure,
    /// Stored scheduling state differs from a replay of the log.
    StateDrift,
}

/// A warning from tree validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item ID (if applicable).
    pub item_id: Option<String>,
    pub kind: WarningKind,
    /// Warning message.
    pub message: String,
}

impl KnowledgeTree {
    /// A tree containing only the synthetic root.
    pub fn new(now: Millis) -> Self {
        let mut items = BTreeMap::new();
        items.insert(ROOT_ID.to_string(), LearningItem::root(now));
        Self { items }
    }

    /// Build a tree from loose items, keyed by their own ids.
    pub fn from_items(items: impl IntoIterator<Item = LearningItem>) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
        }
    }

    pub fn root(&self) -> Option<&LearningItem> {
        self.items.values().find(|i| i.parent_id.is_none())
    }

    pub fn get(&self, id: &str) -> Option<&LearningItem> {
        self.items.get(id)
    }

    /// All items, ordered by identifier.
    pub fn items(&self) -> impl Iterator<Item = &LearningItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Direct children of `id`, ordered by title.
    pub fn children(&self, id: &str) -> Vec<&LearningItem> {
        let mut children: Vec<&LearningItem> = self
            .items
            .values()
            .filter(|i| i.parent_id.as_deref() == Some(id))
            .collect();
        children.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        children
    }

    /// Pre-order walk from the root with each item's depth (root = 0).
    ///
    /// Items unreachable from the root are not visited.
    pub fn walk(&self) -> Vec<(usize, &LearningItem)> {
        let mut out = Vec::with_capacity(self.items.len());
        let Some(root) = self.root() else {
            return out;
        };
        let mut visited = HashSet::new();
        let mut stack = vec![(0usize, root)];
        while let Some((depth, item)) = stack.pop() {
            if !visited.insert(item.id.as_str()) {
                continue;
            }
            out.push((depth, item));
            for child in self.children(&item.id).into_iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Add an item under `parent_id` and return its identifier.
    pub fn add_item(
        &mut self,
        parent_id: &str,
        title: &str,
        suspended: bool,
        now: Millis,
    ) -> Result<String, ScheduleError> {
        if !self.items.contains_key(parent_id) {
            return Err(ScheduleError::InvalidParent(parent_id.to_string()));
        }
        let item = LearningItem::new(parent_id, title, suspended, now);
        let id = item.id.clone();
        tracing::debug!("added item {id} under {parent_id}");
        self.items.insert(id.clone(), item);
        Ok(id)
    }

    /// Remove an item together with its whole subtree.
    ///
    /// Returns the removed identifiers, the requested item first.
    pub fn remove_item(&mut self, id: &str) -> Result<Vec<String>, ScheduleError> {
        let item = self
            .items
            .get(id)
            .ok_or_else(|| ScheduleError::ItemNotFound(id.to_string()))?;
        if item.is_root() {
            return Err(ScheduleError::RootImmutable);
        }

        let mut by_parent: HashMap<&str, Vec<&str>> = HashMap::new();
        for item in self.items.values() {
            if let Some(parent) = item.parent_id.as_deref() {
                by_parent.entry(parent).or_default().push(item.id.as_str());
            }
        }

        let mut removed = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = vec![id];
        while let Some(next) = queue.pop() {
            if !seen.insert(next) {
                continue;
            }
            removed.push(next.to_string());
            if let Some(children) = by_parent.get(next) {
                queue.extend(children.iter().copied());
            }
        }

        for removed_id in &removed {
            self.items.remove(removed_id);
        }
        tracing::debug!("removed {} item(s) rooted at {id}", removed.len());
        Ok(removed)
    }

    /// Exclude an item from review until it is unsuspended.
    pub fn suspend(&mut self, id: &str) -> Result<(), ScheduleError> {
        let item = self.schedulable_mut(id)?;
        item.state.status = LifecycleStatus::Suspended;
        Ok(())
    }

    /// Return a suspended item to the schedule its log implies.
    pub fn unsuspend(&mut self, id: &str) -> Result<(), ScheduleError> {
        let item = self.schedulable_mut(id)?;
        item.state = replay_item(item);
        Ok(())
    }

    /// Record a review happening at `now`.
    ///
    /// Applies a single model step when `now` is not earlier than the last
    /// replayed review, and falls back to a full replay otherwise.
    pub fn review_now(
        &mut self,
        id: &str,
        rating: Rating,
        now: Millis,
    ) -> Result<ReviewLogEntry, ScheduleError> {
        let item = self.schedulable_mut(id)?;
        let suspended = item.is_suspended();
        let entry = if now >= item.state.last_review {
            let next = apply_review(&item.state, rating, now);
            let entry = item.review_log.append(rating, now);
            item.state = next;
            entry
        } else {
            let entry = item.review_log.append(rating, now);
            item.state = replay_item(item);
            entry
        };
        if suspended {
            item.state.status = LifecycleStatus::Suspended;
        }
        tracing::debug!(
            "reviewed {id} as {rating}, next due {}",
            item.state.due
        );
        Ok(entry)
    }

    /// Insert a review at an arbitrary time and replay the item's log.
    pub fn log_review(
        &mut self,
        id: &str,
        rating: Rating,
        at: Millis,
    ) -> Result<ReviewLogEntry, ScheduleError> {
        let item = self.schedulable_mut(id)?;
        let entry = item.review_log.append(rating, at);
        Self::replay_into(item);
        Ok(entry)
    }

    /// Delete one log entry and replay the item's log.
    ///
    /// Deleting the last entry returns the item to `New` unless it is suspended.
    pub fn delete_review(
        &mut self,
        id: &str,
        entry_id: &str,
    ) -> Result<ReviewLogEntry, ScheduleError> {
        let item = self.schedulable_mut(id)?;
        let removed = item.review_log.remove(id, entry_id)?;
        Self::replay_into(item);
        Ok(removed)
    }

    /// Replay every item's log, returning how many states changed.
    pub fn resync(&mut self) -> usize {
        let mut changed = 0;
        for item in self.items.values_mut().filter(|i| !i.is_root()) {
            let before = item.state;
            Self::replay_into(item);
            if item.state != before {
                tracing::info!("resynced drifted state of {}", item.id);
                changed += 1;
            }
        }
        changed
    }

    /// Items due for review at `now`, most overdue first.
    pub fn due(&self, now: Millis) -> Vec<&LearningItem> {
        select_due(self.items.values(), now)
    }

    /// Calendar of confirmed and projected reviews over the next `horizon_days`.
    pub fn calendar<Tz: TimeZone>(
        &self,
        now: Millis,
        horizon_days: u32,
        tz: &Tz,
    ) -> Result<Vec<CalendarDay>, ScheduleError> {
        project_calendar(self.items.values(), now, horizon_days, tz)
    }

    /// Check tree structure and that every stored state matches its log.
    pub fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let structure = |item_id: Option<&str>, message: String| ValidationWarning {
            item_id: item_id.map(str::to_string),
            kind: WarningKind::Structure,
            message,
        };

        for (key, item) in &self.items {
            if key != &item.id {
                warnings.push(structure(
                    Some(key.as_str()),
                    format!("stored under key {key} but has id {}", item.id),
                ));
            }
        }

        // Roots
        let roots: Vec<&str> = self
            .items
            .values()
            .filter(|i| i.parent_id.is_none())
            .map(|i| i.id.as_str())
            .collect();
        match roots.len() {
            0 => warnings.push(structure(None, "tree has no root".into())),
            1 => {}
            _ => warnings.push(structure(
                None,
                format!("tree has {} roots: {}", roots.len(), roots.join(", ")),
            )),
        }

        // Parent links and cycles
        for item in self.items.values() {
            let Some(parent) = item.parent_id.as_deref() else {
                continue;
            };
            if !self.items.contains_key(parent) {
                warnings.push(structure(
                    Some(item.id.as_str()),
                    format!("parent {parent} does not exist"),
                ));
            } else if self.on_cycle(&item.id) {
                warnings.push(structure(
                    Some(item.id.as_str()),
                    "item is part of a parent cycle".into(),
                ));
            }
        }

        // Scheduling state vs. replay
        for item in self.items.values().filter(|i| !i.is_root()) {
            if let Some(message) = drift(item) {
                warnings.push(ValidationWarning {
                    item_id: Some(item.id.clone()),
                    kind: WarningKind::StateDrift,
                    message,
                });
            }
        }

        for w in &warnings {
            tracing::warn!(
                "{}: {}",
                w.item_id.as_deref().unwrap_or("tree"),
                w.message
            );
        }
        warnings
    }

    fn on_cycle(&self, id: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = id;
        while let Some(parent) = self.items.get(current).and_then(|i| i.parent_id.as_deref()) {
            if parent == id {
                return true;
            }
            // A cycle further up that does not pass through `id`.
            if !seen.insert(parent) {
                return false;
            }
            current = parent;
        }
        false
    }

    fn schedulable_mut(&mut self, id: &str) -> Result<&mut LearningItem, ScheduleError> {
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| ScheduleError::ItemNotFound(id.to_string()))?;
        if item.is_root() {
            return Err(ScheduleError::RootImmutable);
        }
        Ok(item)
    }

    fn replay_into(item: &mut LearningItem) {
        let suspended = item.is_suspended();
        item.state = replay_item(item);
        if suspended {
            item.state.status = LifecycleStatus::Suspended;
        }
    }
}

/// Describe how an item's stored state differs from its replayed state.
fn drift(item: &LearningItem) -> Option<String> {
    let replayed = replay_item(item);
    let stored = &item.state;
    if item.review_log.is_empty() {
        if stored.stability != 0.0 || stored.difficulty != 0.0 {
            return Some(format!(
                "no review history but stability {} and difficulty {}",
                stored.stability, stored.difficulty
            ));
        }
        if stored.status == LifecycleStatus::Review {
            return Some("no review history but status is review".into());
        }
        return None;
    }
    if stored.stability != replayed.stability
        || stored.difficulty != replayed.difficulty
        || stored.due != replayed.due
        || stored.last_review != replayed.last_review
    {
        return Some(format!(
            "stored S={} D={} due={} differs from replayed S={} D={} due={}",
            stored.stability,
            stored.difficulty,
            stored.due,
            replayed.stability,
            replayed.difficulty,
            replayed.due
        ));
    }
    if stored.status == LifecycleStatus::New {
        return Some("has review history but status is new".into());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DAY_MS;
    use crate::replay::replay;

    const T0: Millis = 1_700_000_000_000;

    fn tree_with(titles: &[&str]) -> (KnowledgeTree, Vec<String>) {
        let mut tree = KnowledgeTree::new(T0);
        let ids = titles
            .iter()
            .map(|t| tree.add_item(ROOT_ID, t, false, T0).unwrap())
            .collect();
        (tree, ids)
    }

    #[test]
    fn new_tree_has_only_root() {
        let tree = KnowledgeTree::new(T0);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().unwrap().id, ROOT_ID);
        assert!(tree.validate().is_empty());
        assert!(tree.due(T0 + DAY_MS).is_empty());
    }

    #[test]
    fn add_item_requires_existing_parent() {
        let mut tree = KnowledgeTree::new(T0);
        let err = tree.add_item("nope", "x", false, T0).unwrap_err();
        assert_eq!(err, ScheduleError::InvalidParent("nope".into()));
    }

    #[test]
    fn new_item_is_due_immediately_and_suspended_is_not() {
        let mut tree = KnowledgeTree::new(T0);
        let active = tree.add_item(ROOT_ID, "active", false, T0).unwrap();
        tree.add_item(ROOT_ID, "parked", true, T0).unwrap();
        let due = tree.due(T0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, active);
    }

    #[test]
    fn remove_takes_the_subtree() {
        let mut tree = KnowledgeTree::new(T0);
        let a = tree.add_item(ROOT_ID, "a", false, T0).unwrap();
        let b = tree.add_item(&a, "b", false, T0).unwrap();
        let c = tree.add_item(&b, "c", false, T0).unwrap();
        let keep = tree.add_item(ROOT_ID, "keep", false, T0).unwrap();

        let removed = tree.remove_item(&a).unwrap();
        assert_eq!(removed[0], a);
        assert_eq!(removed.len(), 3);
        assert!(tree.get(&c).is_none());
        assert!(tree.get(&keep).is_some());
        assert_eq!(tree.remove_item(ROOT_ID), Err(ScheduleError::RootImmutable));
        assert!(matches!(
            tree.remove_item(&a),
            Err(ScheduleError::ItemNotFound(_))
        ));
    }

    #[test]
    fn review_now_matches_replay() {
        let (mut tree, ids) = tree_with(&["a"]);
        let id = &ids[0];
        tree.review_now(id, Rating::Good, T0 + DAY_MS).unwrap();
        tree.review_now(id, Rating::Hard, T0 + 4 * DAY_MS).unwrap();
        tree.review_now(id, Rating::Easy, T0 + 9 * DAY_MS).unwrap();

        let item = tree.get(id).unwrap();
        assert_eq!(item.state, replay_item(item));
        assert_eq!(item.state.status, LifecycleStatus::Review);
        assert!(tree.validate().is_empty());
    }

    #[test]
    fn retroactive_log_replays_whole_history() {
        let (mut tree, ids) = tree_with(&["a"]);
        let id = &ids[0];
        tree.review_now(id, Rating::Good, T0 + 10 * DAY_MS).unwrap();
        tree.log_review(id, Rating::Again, T0 + 2 * DAY_MS).unwrap();

        let item = tree.get(id).unwrap();
        let sorted = item.review_log.sorted();
        assert_eq!(sorted[0].rating, Rating::Again);
        assert_eq!(item.state, replay(sorted, item.created_at));
        assert_eq!(item.state.last_review, T0 + 10 * DAY_MS);
    }

    #[test]
    fn backdated_review_now_falls_back_to_replay() {
        let (mut tree, ids) = tree_with(&["a"]);
        let id = &ids[0];
        tree.review_now(id, Rating::Good, T0 + 10 * DAY_MS).unwrap();
        tree.review_now(id, Rating::Hard, T0 + 5 * DAY_MS).unwrap();
        let item = tree.get(id).unwrap();
        assert_eq!(item.state, replay_item(item));
        assert_eq!(item.state.last_review, T0 + 10 * DAY_MS);
    }

    #[test]
    fn deleting_only_entry_resets_to_new() {
        let (mut tree, ids) = tree_with(&["a"]);
        let id = &ids[0];
        let entry = tree.review_now(id, Rating::Good, T0 + DAY_MS).unwrap();
        tree.delete_review(id, &entry.id).unwrap();

        let item = tree.get(id).unwrap();
        assert_eq!(item.state.stability, 0.0);
        assert_eq!(item.state.difficulty, 0.0);
        assert_eq!(item.state.status, LifecycleStatus::New);
        assert_eq!(item.state.last_review, 0);
        assert!(item.review_log.is_empty());

        let err = tree.delete_review(id, &entry.id).unwrap_err();
        assert!(matches!(err, ScheduleError::EntryNotFound { .. }));
    }

    #[test]
    fn suspension_survives_log_edits() {
        let (mut tree, ids) = tree_with(&["a"]);
        let id = &ids[0];
        tree.suspend(id).unwrap();
        tree.log_review(id, Rating::Good, T0).unwrap();
        tree.review_now(id, Rating::Good, T0 + 3 * DAY_MS).unwrap();
        assert!(tree.get(id).unwrap().is_suspended());
        assert!(tree.due(T0 + 365 * DAY_MS).is_empty());

        tree.unsuspend(id).unwrap();
        let item = tree.get(id).unwrap();
        assert_eq!(item.state.status, LifecycleStatus::Review);
        assert_eq!(item.state, replay_item(item));
    }

    #[test]
    fn root_cannot_be_reviewed_or_suspended() {
        let mut tree = KnowledgeTree::new(T0);
        assert_eq!(
            tree.review_now(ROOT_ID, Rating::Good, T0).unwrap_err(),
            ScheduleError::RootImmutable
        );
        assert_eq!(tree.suspend(ROOT_ID), Err(ScheduleError::RootImmutable));
    }

    #[test]
    fn validate_reports_drift_and_resync_fixes_it() {
        let (mut tree, ids) = tree_with(&["a"]);
        let id = ids[0].clone();
        tree.review_now(&id, Rating::Good, T0).unwrap();
        tree.items.get_mut(&id).unwrap().state.stability = 99.0;

        let warnings = tree.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::StateDrift);
        assert_eq!(warnings[0].item_id.as_deref(), Some(id.as_str()));

        assert_eq!(tree.resync(), 1);
        assert!(tree.validate().is_empty());
        assert_eq!(tree.resync(), 0);
    }

    #[test]
    fn validate_reports_structure_problems() {
        let mut orphan = LearningItem::new("ghost", "orphan", false, T0);
        orphan.id = "orphan".into();
        let mut loop_a = LearningItem::new("loop-b", "a", false, T0);
        loop_a.id = "loop-a".into();
        let mut loop_b = LearningItem::new("loop-a", "b", false, T0);
        loop_b.id = "loop-b".into();
        let mut below_loop = LearningItem::new("loop-a", "c", false, T0);
        below_loop.id = "below-loop".into();

        let tree = KnowledgeTree::from_items([orphan, loop_a, loop_b, below_loop]);
        let warnings = tree.validate();
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("no root")));
        assert!(messages.iter().any(|m| m.contains("ghost does not exist")));

        let mut on_cycle: Vec<&str> = warnings
            .iter()
            .filter(|w| w.message.contains("cycle"))
            .filter_map(|w| w.item_id.as_deref())
            .collect();
        on_cycle.sort();
        assert_eq!(on_cycle, vec!["loop-a", "loop-b"]);
    }

    #[test]
    fn walk_is_preorder_by_title() {
        let mut tree = KnowledgeTree::new(T0);
        let b = tree.add_item(ROOT_ID, "b", false, T0).unwrap();
        tree.add_item(ROOT_ID, "a", false, T0).unwrap();
        tree.add_item(&b, "b1", false, T0).unwrap();

        let walked: Vec<(usize, &str)> = tree
            .walk()
            .into_iter()
            .map(|(d, i)| (d, i.title.as_str()))
            .collect();
        assert_eq!(
            walked,
            vec![(0, "Root"), (1, "a"), (1, "b"), (2, "b1")]
        );
    }

    #[test]
    fn snapshot_is_an_id_keyed_map() {
        let (tree, ids) = tree_with(&["a"]);
        let json = serde_json::to_value(&tree).unwrap();
        assert!(json.get(ROOT_ID).is_some());
        assert_eq!(json[&ids[0]]["title"], "a");
        let back: KnowledgeTree = serde_json::from_value(json).unwrap();
        assert_eq!(back, tree);
    }
}
