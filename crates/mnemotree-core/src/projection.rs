//! Forward projection of future reviews.
//!
//! Simulates a chain of hypothetical `Good` reviews from an item's current
//! state to fill calendar and planning views. Projection is read-only: it
//! works on copies of the numbers and never touches the item.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::model::{LearningItem, Millis, Rating, DAY_MS};
use crate::retention::transition;

/// Safety bound on simulated reviews per item.
pub const MAX_PROJECTION_STEPS: usize = 365;

/// Whether an event is the item's real next review or a simulated one.
///
/// The derived ordering puts confirmed events first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Confirmed,
    Projected,
}

/// One point on an item's projected schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedEvent {
    pub at: Millis,
    pub kind: EventKind,
    /// Interval that led to this event; only set for projected events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_days: Option<u32>,
}

/// Project the reviews of one item up to `horizon_end`.
///
/// The first event is the confirmed review at `max(due, now)`. Each
/// following event assumes the previous review was rated `Good`. Nothing is
/// returned for the root, suspended items, or a horizon that is not after
/// `now`.
pub fn project(item: &LearningItem, horizon_end: Millis, now: Millis) -> Vec<ProjectedEvent> {
    if item.is_root() || item.is_suspended() || horizon_end <= now {
        return Vec::new();
    }

    let confirmed_at = item.state.due.max(now);
    if confirmed_at > horizon_end {
        return Vec::new();
    }

    let mut events = vec![ProjectedEvent {
        at: confirmed_at,
        kind: EventKind::Confirmed,
        interval_days: None,
    }];

    let mut stability = item.state.stability;
    let mut difficulty = item.state.difficulty;
    let mut last_review = item.state.last_review;
    let mut cursor = confirmed_at;

    for _ in 0..MAX_PROJECTION_STEPS {
        let step = transition(stability, difficulty, last_review, Rating::Good, cursor);
        let next = cursor.saturating_add(step.interval_days as Millis * DAY_MS);
        if next > horizon_end {
            break;
        }
        events.push(ProjectedEvent {
            at: next,
            kind: EventKind::Projected,
            interval_days: Some(step.interval_days),
        });
        stability = step.stability;
        difficulty = step.difficulty;
        last_review = cursor;
        cursor = next;
    }

    events
}

/// [`project`] over the next `horizon_days` days from `now`.
pub fn project_days(item: &LearningItem, horizon_days: u32, now: Millis) -> Vec<ProjectedEvent> {
    project(item, horizon_end(now, horizon_days), now)
}

fn horizon_end(now: Millis, horizon_days: u32) -> Millis {
    now.saturating_add(horizon_days as Millis * DAY_MS)
}

/// A projected event attributed to its item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub item_id: String,
    pub title: String,
    #[serde(flatten)]
    pub event: ProjectedEvent,
}

/// All events falling on one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub entries: Vec<CalendarEntry>,
}

/// Calendar date of a timestamp in the given time zone.
pub fn local_day<Tz: TimeZone>(at: Millis, tz: &Tz) -> Result<NaiveDate, ScheduleError> {
    DateTime::from_timestamp_millis(at)
        .map(|utc| utc.with_timezone(tz).date_naive())
        .ok_or(ScheduleError::TimestampOutOfRange(at))
}

/// Project every item over the next `horizon_days` and group by local day.
///
/// Days are ascending. Within a day confirmed reviews come before projected
/// ones, then entries are ordered by title and item id.
pub fn project_calendar<'a, I, Tz>(
    items: I,
    now: Millis,
    horizon_days: u32,
    tz: &Tz,
) -> Result<Vec<CalendarDay>, ScheduleError>
where
    I: IntoIterator<Item = &'a LearningItem>,
    Tz: TimeZone,
{
    if horizon_days == 0 {
        return Ok(Vec::new());
    }
    let end = horizon_end(now, horizon_days);

    let mut days: BTreeMap<NaiveDate, Vec<CalendarEntry>> = BTreeMap::new();
    let mut projected_items = 0usize;
    for item in items {
        let events = project(item, end, now);
        if !events.is_empty() {
            projected_items += 1;
        }
        for event in events {
            days.entry(local_day(event.at, tz)?)
                .or_default()
                .push(CalendarEntry {
                    item_id: item.id.clone(),
                    title: item.title.clone(),
                    event,
                });
        }
    }
    tracing::debug!(
        "projected {projected_items} item(s) over {horizon_days} day(s) into {} calendar day(s)",
        days.len()
    );

    Ok(days
        .into_iter()
        .map(|(date, mut entries)| {
            entries.sort_by(|a, b| {
                a.event
                    .kind
                    .cmp(&b.event.kind)
                    .then_with(|| a.title.cmp(&b.title))
                    .then_with(|| a.item_id.cmp(&b.item_id))
                    .then_with(|| a.event.at.cmp(&b.event.at))
            });
            CalendarDay { date, entries }
        })
        .collect())
}
