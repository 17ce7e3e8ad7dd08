use log::debug;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::db::Database;
use crate::error::TagError;
use crate::models::date::{format_clock, format_day, parse_clock, parse_day};
use crate::models::{BowelMovement, Entry, EntryId, EntryKind, NoteDetails};

const ENTRY_COLUMNS: &str = "id, kind, day, clock, timestamp, consistency, urgency, \
                             movement_notes, note_category, note_content, note_tags";

/// Read interface the day-tag core consumes from the entry store.
///
/// The filter engine and the reporting aggregator are generic over this
/// trait; they never reach into entry rows directly.
pub trait EntryProvider {
    /// All entries with `start <= day <= end`, newest first.
    fn entries_in_date_range(&self, start: Date, end: Date) -> Result<Vec<Entry>, TagError>;

    /// All entries recorded on the given day, newest first.
    fn entries_for_date(&self, day: Date) -> Result<Vec<Entry>, TagError>;
}

/// Entry CRUD over the shared database.
///
/// Borrows the [`Database`] owned by the tag service so both stores see
/// one consistent file.
///
/// # Examples
///
/// ```
/// use gutlog::{BowelMovement, Database, EntryService};
///
/// # fn main() -> anyhow::Result<()> {
/// let db = Database::in_memory()?;
/// let entries = EntryService::new(&db);
///
/// let movement = BowelMovement { consistency: 4, urgency: 2, notes: None };
/// let entry = entries.log_movement("2025-10-25", "08:30", movement)?;
/// assert!(entry.id.get() > 0);
/// # Ok(())
/// # }
/// ```
pub struct EntryService<'a> {
    db: &'a Database,
}

impl<'a> EntryService<'a> {
    /// Creates an entry service over an existing database.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Records a bowel-movement observation.
    ///
    /// `consistency` must be on the Bristol 1-7 scale and `urgency` on
    /// the 1-4 scale; violations are collected into one
    /// [`TagError::InvalidEntry`].
    pub fn log_movement(
        &self,
        day: &str,
        clock: &str,
        movement: BowelMovement,
    ) -> Result<Entry, TagError> {
        let mut reasons = Vec::new();
        if !(1..=7).contains(&movement.consistency) {
            reasons.push(format!(
                "consistency {} is outside the Bristol 1-7 scale",
                movement.consistency
            ));
        }
        if !(1..=4).contains(&movement.urgency) {
            reasons.push(format!("urgency {} is outside the 1-4 scale", movement.urgency));
        }
        if !reasons.is_empty() {
            return Err(TagError::InvalidEntry { reasons });
        }

        let day = parse_day(day)?;
        let clock = parse_clock(clock)?;
        self.insert_entry(EntryKind::BowelMovement, day, clock, Some(movement), None)
    }

    /// Records a free-form note.
    pub fn log_note(&self, day: &str, clock: &str, note: NoteDetails) -> Result<Entry, TagError> {
        let mut reasons = Vec::new();
        if note.category.trim().is_empty() {
            reasons.push("category is empty".to_string());
        }
        if note.content.trim().is_empty() {
            reasons.push("content is empty".to_string());
        }
        if !reasons.is_empty() {
            return Err(TagError::InvalidEntry { reasons });
        }

        let day = parse_day(day)?;
        let clock = parse_clock(clock)?;
        self.insert_entry(EntryKind::Note, day, clock, None, Some(note))
    }

    /// Deletes an entry by its ID.
    ///
    /// Idempotent: deleting a non-existent entry returns `Ok(())`.
    pub fn delete_entry(&self, id: EntryId) -> Result<(), TagError> {
        self.db
            .connection()
            .execute("DELETE FROM entries WHERE id = ?1", [id.get()])?;
        Ok(())
    }

    fn insert_entry(
        &self,
        kind: EntryKind,
        day: Date,
        clock: Time,
        movement: Option<BowelMovement>,
        note: Option<NoteDetails>,
    ) -> Result<Entry, TagError> {
        let timestamp = PrimitiveDateTime::new(day, clock).assume_utc();
        let note_tags_json = note
            .as_ref()
            .and_then(|n| n.tags.as_ref())
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO entries (kind, day, clock, timestamp, consistency, urgency,
                                  movement_notes, note_category, note_content, note_tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                kind.as_str(),
                format_day(day),
                format_clock(clock),
                timestamp.unix_timestamp(),
                movement.as_ref().map(|m| m.consistency),
                movement.as_ref().map(|m| m.urgency),
                movement.as_ref().and_then(|m| m.notes.as_deref()),
                note.as_ref().map(|n| n.category.as_str()),
                note.as_ref().map(|n| n.content.as_str()),
                note_tags_json,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("logged {kind} entry {id} on {}", format_day(day));

        Ok(Entry {
            id: EntryId::new(id),
            kind,
            day,
            clock,
            timestamp,
            bowel_movement: movement,
            note,
        })
    }

    fn query_entries(
        &self,
        where_clause: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Entry>, TagError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE {where_clause} ORDER BY timestamp DESC"
        ))?;
        let rows = stmt.query_map(params, read_entry_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(into_entry(row?)?);
        }
        Ok(entries)
    }
}

impl EntryProvider for EntryService<'_> {
    fn entries_in_date_range(&self, start: Date, end: Date) -> Result<Vec<Entry>, TagError> {
        self.query_entries("day BETWEEN ?1 AND ?2", (format_day(start), format_day(end)))
    }

    fn entries_for_date(&self, day: Date) -> Result<Vec<Entry>, TagError> {
        self.query_entries("day = ?1", [format_day(day)])
    }
}

struct EntryRow {
    id: i64,
    kind: String,
    day: String,
    clock: String,
    timestamp: i64,
    consistency: Option<u8>,
    urgency: Option<u8>,
    movement_notes: Option<String>,
    note_category: Option<String>,
    note_content: Option<String>,
    note_tags: Option<String>,
}

fn read_entry_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntryRow> {
    Ok(EntryRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        day: row.get(2)?,
        clock: row.get(3)?,
        timestamp: row.get(4)?,
        consistency: row.get(5)?,
        urgency: row.get(6)?,
        movement_notes: row.get(7)?,
        note_category: row.get(8)?,
        note_content: row.get(9)?,
        note_tags: row.get(10)?,
    })
}

fn into_entry(raw: EntryRow) -> Result<Entry, TagError> {
    let kind = EntryKind::parse(&raw.kind).ok_or_else(|| TagError::InvalidEntry {
        reasons: vec![format!("unknown entry kind '{}'", raw.kind)],
    })?;

    let bowel_movement = match (kind, raw.consistency, raw.urgency) {
        (EntryKind::BowelMovement, Some(consistency), Some(urgency)) => Some(BowelMovement {
            consistency,
            urgency,
            notes: raw.movement_notes,
        }),
        _ => None,
    };

    let note = match (kind, raw.note_category, raw.note_content) {
        (EntryKind::Note, Some(category), Some(content)) => Some(NoteDetails {
            category,
            content,
            tags: raw.note_tags.map(|t| serde_json::from_str(&t)).transpose()?,
        }),
        _ => None,
    };

    Ok(Entry {
        id: EntryId::new(raw.id),
        kind,
        day: parse_day(&raw.day)?,
        clock: parse_clock(&raw.clock)?,
        timestamp: OffsetDateTime::from_unix_timestamp(raw.timestamp)?,
        bowel_movement,
        note,
    })
}
