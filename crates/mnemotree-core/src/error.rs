//! Scheduling error types.
//!
//! The engine does no I/O, so every variant here is a rejected operation:
//! bad input at the boundary or a reference to something that does not exist.

use thiserror::Error;

use crate::model::Millis;

/// Errors returned by scheduling and tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A rating outside the four valid grades.
    #[error("invalid rating {0}, expected 1 (again) to 4 (easy)")]
    InvalidRating(i64),

    /// No item with this identifier exists in the tree.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// The item exists but has no log entry with this identifier.
    #[error("review log entry {entry} not found on item {item}")]
    EntryNotFound { item: String, entry: String },

    /// The synthetic root cannot be removed, reviewed, or suspended.
    #[error("the root item cannot be modified this way")]
    RootImmutable,

    /// The requested parent does not exist.
    #[error("invalid parent: {0}")]
    InvalidParent(String),

    /// A timestamp that cannot be mapped onto a calendar date.
    #[error("timestamp out of range: {0}ms")]
    TimestampOutOfRange(Millis),
}

impl ScheduleError {
    /// Returns `true` if the error was caused by caller input rather than
    /// by a missing item or entry.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidRating(_)
                | ScheduleError::RootImmutable
                | ScheduleError::TimestampOutOfRange(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        assert_eq!(
            ScheduleError::InvalidRating(7).to_string(),
            "invalid rating 7, expected 1 (again) to 4 (easy)"
        );
        let err = ScheduleError::EntryNotFound {
            item: "a".into(),
            entry: "e1".into(),
        };
        assert!(err.to_string().contains("e1"));
        assert!(err.to_string().contains("item a"));
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(ScheduleError::InvalidRating(0).is_invalid_input());
        assert!(ScheduleError::RootImmutable.is_invalid_input());
        assert!(!ScheduleError::ItemNotFound("x".into()).is_invalid_input());
    }
}
