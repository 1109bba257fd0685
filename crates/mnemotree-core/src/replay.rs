//! State reconstruction from the review log.
//!
//! Scheduling state is never patched incrementally when history changes out
//! of order. Instead the whole ledger is folded through the retention model
//! again, so the stored state can always be checked against its log.

use crate::model::{
    LearningItem, LifecycleStatus, Millis, Rating, ReviewLogEntry, SchedulingState, DAY_MS,
};
use crate::retention::transition;

/// Fold chronologically sorted `entries` into a scheduling state.
///
/// With no entries the result is the zero state due at `fallback_due`; the
/// caller decides whether such an item is new or suspended.
pub fn replay<'a, I>(entries: I, fallback_due: Millis) -> SchedulingState
where
    I: IntoIterator<Item = &'a ReviewLogEntry>,
{
    let mut state = SchedulingState::zero(fallback_due);
    let mut steps = 0usize;
    for entry in entries {
        state = apply_review(&state, entry.rating, entry.reviewed_at);
        steps += 1;
    }
    tracing::debug!(
        "replayed {steps} review(s): S={} D={} due={}",
        state.stability,
        state.difficulty,
        state.due
    );
    state
}

/// Replay an item's own ledger, using its creation time as the fallback due date.
pub fn replay_item(item: &LearningItem) -> SchedulingState {
    replay(item.review_log.sorted(), item.created_at)
}

/// One review step on top of `state`.
///
/// This is the fast path for a review happening now: when
/// `at >= state.last_review` the result equals replaying the ledger with
/// the new entry appended.
pub fn apply_review(state: &SchedulingState, rating: Rating, at: Millis) -> SchedulingState {
    let step = transition(
        state.stability,
        state.difficulty,
        state.last_review,
        rating,
        at,
    );
    SchedulingState {
        status: LifecycleStatus::Review,
        stability: step.stability,
        difficulty: step.difficulty,
        due: at.saturating_add(step.interval_days as Millis * DAY_MS),
        last_review: at,
    }
}
