use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::{DayTagId, TagId};

/// A link between one tag and one calendar day.
///
/// The `(tag_id, day)` pair is unique, and a day never carries more than
/// the per-day capacity of links. Rows are cascade-deleted when their tag
/// is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTag {
    pub id: DayTagId,
    pub tag_id: TagId,
    #[serde(with = "super::date::serde_day")]
    pub day: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::date;

    #[test]
    fn day_serializes_as_plain_date_string() {
        let link = DayTag {
            id: DayTagId::new(1),
            tag_id: TagId::new(2),
            day: date::parse_day("2025-10-25").unwrap(),
            created_at: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        };

        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["day"], "2025-10-25");
    }
}
