//! Due-set selection.

use crate::model::{LearningItem, Millis};

/// Items eligible for review at `now`, most overdue first.
///
/// Skips the root and suspended items. Items with equal due timestamps keep
/// their input order.
pub fn select_due<'a, I>(items: I, now: Millis) -> Vec<&'a LearningItem>
where
    I: IntoIterator<Item = &'a LearningItem>,
{
    let mut due: Vec<&LearningItem> = items
        .into_iter()
        .filter(|item| !item.is_root() && item.state.is_due(now))
        .collect();
    due.sort_by_key(|item| item.state.due);
    due
}
