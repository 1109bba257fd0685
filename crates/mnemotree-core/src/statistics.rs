//! Aggregate statistics over a knowledge tree.

use serde::{Deserialize, Serialize};

use crate::model::{LifecycleStatus, Millis};
use crate::retention::current_retrievability;
use crate::tree::KnowledgeTree;

/// Summary of the whole tree at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Schedulable items (the root is not counted).
    pub total: usize,
    pub new: usize,
    pub review: usize,
    pub suspended: usize,
    /// Items the due-set selector would return right now.
    pub due_now: usize,
    /// Log entries across all items.
    pub reviews_logged: usize,
    /// Mean recall probability over reviewed, unsuspended items.
    pub average_retrievability: Option<f64>,
    /// Deepest level below the root.
    pub max_depth: usize,
}

/// Compute statistics for `tree` at `now`.
pub fn compute_stats(tree: &KnowledgeTree, now: Millis) -> TreeStats {
    let items: Vec<_> = tree.items().filter(|i| !i.is_root()).collect();

    let count = |status: LifecycleStatus| items.iter().filter(|i| i.state.status == status).count();

    let retrievabilities: Vec<f64> = items
        .iter()
        .filter(|i| !i.is_suspended() && i.state.is_reviewed())
        .map(|i| current_retrievability(&i.state, now))
        .collect();
    let average_retrievability = if retrievabilities.is_empty() {
        None
    } else {
        Some(retrievabilities.iter().sum::<f64>() / retrievabilities.len() as f64)
    };

    TreeStats {
        total: items.len(),
        new: count(LifecycleStatus::New),
        review: count(LifecycleStatus::Review),
        suspended: count(LifecycleStatus::Suspended),
        due_now: tree.due(now).len(),
        reviews_logged: items.iter().map(|i| i.review_log.len()).sum(),
        average_retrievability,
        max_depth: tree.walk().iter().map(|(depth, _)| *depth).max().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rating, DAY_MS, ROOT_ID};

    const T0: Millis = 1_700_000_000_000;

    #[test]
    fn empty_tree() {
        let stats = compute_stats(&KnowledgeTree::new(T0), T0);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.due_now, 0);
        assert_eq!(stats.average_retrievability, None);
        assert_eq!(stats.max_depth, 0);
    }

    #[test]
    fn counts_by_status() {
        let mut tree = KnowledgeTree::new(T0);
        let a = tree.add_item(ROOT_ID, "a", false, T0).unwrap();
        let b = tree.add_item(&a, "b", false, T0).unwrap();
        tree.add_item(&b, "c", true, T0).unwrap();
        tree.review_now(&a, Rating::Good, T0).unwrap();
        tree.review_now(&a, Rating::Good, T0 + 2 * DAY_MS).unwrap();

        let stats = compute_stats(&tree, T0 + 2 * DAY_MS);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.new, 1);
        assert_eq!(stats.review, 1);
        assert_eq!(stats.suspended, 1);
        assert_eq!(stats.due_now, 1);
        assert_eq!(stats.reviews_logged, 2);
        assert_eq!(stats.max_depth, 3);

        // Reviewed just now, so recall is certain.
        let r = stats.average_retrievability.unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn retrievability_decays_with_time() {
        let mut tree = KnowledgeTree::new(T0);
        let a = tree.add_item(ROOT_ID, "a", false, T0).unwrap();
        tree.review_now(&a, Rating::Good, T0).unwrap();

        let soon = compute_stats(&tree, T0 + DAY_MS).average_retrievability.unwrap();
        let later = compute_stats(&tree, T0 + 30 * DAY_MS).average_retrievability.unwrap();
        assert!(soon > later);
    }
}
