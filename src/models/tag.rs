use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::TagId;

/// A reusable label attachable to calendar days.
///
/// `name` is the canonical matching key (trimmed, lower-cased form of the
/// user's text) and is globally unique. `display_name` preserves whatever
/// casing the user first typed for that key and is never rewritten by
/// later lookups, so a user who types "Vacation" once keeps seeing
/// "Vacation" even if later requests say "VACATION".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    /// Normalized matching key, unique across all tags.
    pub name: String,
    /// First-seen user casing for `name`.
    pub display_name: String,
    pub description: Option<String>,
    /// Number of days currently carrying this tag. Maintained by the
    /// association store in the same transaction as every link change.
    pub usage_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
