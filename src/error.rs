use thiserror::Error;

use crate::models::TagId;

/// Errors produced by the day-tag core and its collaborators.
///
/// Validation and conflict variants are the caller's input's fault and are
/// meant to be shown directly to the user; [`TagError::Storage`] wraps
/// storage-layer failures, which propagate unchanged — the caller must not
/// assume any partial state was committed.
#[derive(Debug, Error)]
pub enum TagError {
    /// Tag text failed shape validation. Every violation is listed.
    #[error("invalid tag name: {}", reasons.join("; "))]
    InvalidName { reasons: Vec<String> },

    /// A date string was not a valid `YYYY-MM-DD` calendar day.
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Entry input failed validation. Every violation is listed.
    #[error("invalid entry: {}", reasons.join("; "))]
    InvalidEntry { reasons: Vec<String> },

    /// No tag exists with the given id.
    #[error("no tag with id {0}")]
    TagNotFound(TagId),

    /// No tag exists with the given (normalized) name.
    #[error("no tag named '{0}'")]
    UnknownTag(String),

    /// The tag is already applied to that day.
    #[error("tag {tag_id} is already applied to {day}")]
    AlreadyTagged { tag_id: TagId, day: String },

    /// The day already carries the per-day maximum number of tags.
    #[error("day {day} already carries the maximum of {} tags", crate::service::MAX_TAGS_PER_DAY)]
    DayFull { day: String },

    /// JSON serialization/deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage-layer failure, including aborted transactions.
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    /// A stored timestamp was outside the representable range.
    #[error("timestamp out of range: {0}")]
    Timestamp(#[from] time::error::ComponentRange),
}

impl TagError {
    /// Whether this error was caused by caller input, as opposed to an
    /// internal failure. Drives the CLI exit code.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            TagError::Storage(_) | TagError::Timestamp(_) | TagError::Serialization(_)
        )
    }
}
