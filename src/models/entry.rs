use serde::{Deserialize, Serialize};
use std::fmt;
use time::{Date, OffsetDateTime, Time};

use super::{EntryId, Tag};

/// The two kinds of diary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    BowelMovement,
    Note,
}

impl EntryKind {
    /// Database string form.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::BowelMovement => "bowel_movement",
            EntryKind::Note => "note",
        }
    }

    /// Parses the database string form.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "bowel_movement" => Some(EntryKind::BowelMovement),
            "note" => Some(EntryKind::Note),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observation payload for a bowel-movement entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowelMovement {
    /// Bristol stool scale, 1-7.
    pub consistency: u8,
    /// Urgency scale, 1-4.
    pub urgency: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for a free-form note entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDetails {
    pub category: String,
    pub content: String,
    /// Inline labels typed on the note itself. Unrelated to day tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// A diary entry: one bowel-movement observation or one note, recorded on
/// a calendar day at a clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub kind: EntryKind,
    #[serde(with = "super::date::serde_day")]
    pub day: Date,
    #[serde(with = "super::date::serde_clock")]
    pub clock: Time,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bowel_movement: Option<BowelMovement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<NoteDetails>,
}

/// An entry together with the tags its day carries.
///
/// The tag set is inherited from the day at read time; nothing on the
/// entry row references tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEntry {
    pub entry: Entry,
    pub day_tags: Vec<Tag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_db_form() {
        assert_eq!(
            EntryKind::parse(EntryKind::BowelMovement.as_str()),
            Some(EntryKind::BowelMovement)
        );
        assert_eq!(EntryKind::parse(EntryKind::Note.as_str()), Some(EntryKind::Note));
        assert_eq!(EntryKind::parse("mood"), None);
    }

    #[test]
    fn kind_serializes_in_snake_case() {
        let json = serde_json::to_string(&EntryKind::BowelMovement).unwrap();
        assert_eq!(json, "\"bowel_movement\"");
    }
}
