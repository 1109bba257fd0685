//! Core data model types for mnemotree.
//!
//! These are the value types every other module works on: ratings, the
//! scheduling snapshot of an item, review log entries, and the items of
//! the knowledge tree themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScheduleError;
use crate::ledger::Ledger;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Length of one day in milliseconds.
pub const DAY_MS: Millis = 86_400_000;

/// Identifier of the synthetic root item.
pub const ROOT_ID: &str = "root";

/// Recall-quality grade supplied at each review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    /// All ratings in ascending order.
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// The ordinal grade, 1 to 4.
    pub fn grade(self) -> i64 {
        self as i64
    }

    /// Signed distance from `Good`, used by the difficulty formulas.
    pub(crate) fn offset_from_good(self) -> f64 {
        (self.grade() - 3) as f64
    }
}

impl TryFrom<i64> for Rating {
    type Error = ScheduleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(ScheduleError::InvalidRating(other)),
        }
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        rating.grade()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Again => write!(f, "again"),
            Rating::Hard => write!(f, "hard"),
            Rating::Good => write!(f, "good"),
            Rating::Easy => write!(f, "easy"),
        }
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return Rating::try_from(n).map_err(|e| e.to_string());
        }
        match s.to_lowercase().as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            other => Err(format!("unknown rating: {other}")),
        }
    }
}

/// Where an item is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    /// Never reviewed, eligible from its due timestamp.
    #[default]
    New,
    /// Has at least one replayed review.
    #[serde(alias = "learning")]
    Review,
    /// Excluded from review until explicitly promoted.
    Suspended,
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStatus::New => write!(f, "new"),
            LifecycleStatus::Review => write!(f, "review"),
            LifecycleStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// Derived scheduling snapshot of one item.
///
/// Always reproducible from the item's review log through
/// [`replay`](crate::replay::replay).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    #[serde(default, rename = "lifecycleStatus")]
    pub status: LifecycleStatus,
    /// Days until recall probability decays to the target retention. 0 = never reviewed.
    #[serde(default)]
    pub stability: f64,
    /// 1 to 10 once reviewed, 0 before.
    #[serde(default)]
    pub difficulty: f64,
    /// When the item becomes eligible for review again.
    #[serde(default, rename = "dueTimestamp")]
    pub due: Millis,
    /// Most recent replayed review, 0 if none.
    #[serde(default, rename = "lastReviewTimestamp")]
    pub last_review: Millis,
}

impl SchedulingState {
    /// The zero state: never reviewed, due at `due`.
    pub fn zero(due: Millis) -> Self {
        Self {
            due,
            ..Self::default()
        }
    }

    /// Whether any review has been applied.
    pub fn is_reviewed(&self) -> bool {
        self.stability > 0.0
    }

    /// Whether the item would be shown at `now`, ignoring tree position.
    pub fn is_due(&self, now: Millis) -> bool {
        self.status != LifecycleStatus::Suspended && self.due <= now
    }
}

/// One rating event in an item's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLogEntry {
    pub id: String,
    pub rating: Rating,
    #[serde(rename = "reviewTimestamp")]
    pub reviewed_at: Millis,
}

impl ReviewLogEntry {
    pub fn new(rating: Rating, reviewed_at: Millis) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rating,
            reviewed_at,
        }
    }
}

/// A topic in the knowledge tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningItem {
    pub id: String,
    /// `None` only for the synthetic root.
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub title: String,
    /// Used as the due timestamp while the log is empty.
    #[serde(default)]
    pub created_at: Millis,
    #[serde(default, rename = "schedulingState")]
    pub state: SchedulingState,
    /// Insertion-ordered history; not necessarily chronological.
    #[serde(default, alias = "review_log")]
    pub review_log: Ledger,
}

impl LearningItem {
    /// A fresh item under `parent_id`, due immediately unless suspended.
    pub fn new(
        parent_id: impl Into<String>,
        title: impl Into<String>,
        suspended: bool,
        now: Millis,
    ) -> Self {
        let mut state = SchedulingState::zero(now);
        if suspended {
            state.status = LifecycleStatus::Suspended;
        }
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            parent_id: Some(parent_id.into()),
            title: title.into(),
            created_at: now,
            state,
            review_log: Ledger::default(),
        }
    }

    /// The synthetic root. It is never scheduled.
    pub fn root(now: Millis) -> Self {
        Self {
            id: ROOT_ID.to_string(),
            parent_id: None,
            title: "Root".to_string(),
            created_at: now,
            state: SchedulingState {
                status: LifecycleStatus::Suspended,
                ..SchedulingState::zero(now)
            },
            review_log: Ledger::default(),
        }
    }

    /// Whether this item is the synthetic root (or an orphan without parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none() || self.id == ROOT_ID
    }

    pub fn is_suspended(&self) -> bool {
        self.state.status == LifecycleStatus::Suspended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_display_and_parse() {
        assert_eq!(Rating::Good.to_string(), "good");
        assert_eq!("3".parse::<Rating>().unwrap(), Rating::Good);
        assert_eq!("Easy".parse::<Rating>().unwrap(), Rating::Easy);
        assert_eq!(" again ".parse::<Rating>().unwrap(), Rating::Again);
        assert!("5".parse::<Rating>().is_err());
        assert!("meh".parse::<Rating>().is_err());
    }

    #[test]
    fn rating_rejects_out_of_range() {
        assert_eq!(Rating::try_from(0), Err(ScheduleError::InvalidRating(0)));
        assert_eq!(Rating::try_from(5), Err(ScheduleError::InvalidRating(5)));
        assert_eq!(Rating::try_from(2), Ok(Rating::Hard));
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert_eq!(serde_json::to_string(&Rating::Easy).unwrap(), "4");
    }

    #[test]
    fn item_without_review_log_loads_with_empty_history() {
        let json = r#"{
            "id": "a",
            "parentId": "root",
            "title": "Borrowing",
            "schedulingState": {
                "lifecycleStatus": "new",
                "stability": 0,
                "difficulty": 0,
                "dueTimestamp": 1000,
                "lastReviewTimestamp": 0
            }
        }"#;
        let item: LearningItem = serde_json::from_str(json).unwrap();
        assert!(item.review_log.is_empty());
        assert_eq!(item.state.due, 1000);
        assert_eq!(item.created_at, 0);
    }

    #[test]
    fn learning_status_is_read_as_review() {
        let status: LifecycleStatus = serde_json::from_str("\"learning\"").unwrap();
        assert_eq!(status, LifecycleStatus::Review);
    }

    #[test]
    fn suspended_item_is_never_due() {
        let item = LearningItem::new(ROOT_ID, "t", true, 0);
        assert!(!item.state.is_due(i64::MAX));
        let item = LearningItem::new(ROOT_ID, "t", false, 10);
        assert!(item.state.is_due(10));
        assert!(!item.state.is_due(9));
    }

    #[test]
    fn root_is_detected() {
        let root = LearningItem::root(0);
        assert!(root.is_root());
        assert!(!LearningItem::new(ROOT_ID, "child", false, 0).is_root());
    }
}
