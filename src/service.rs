use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use rusqlite::OptionalExtension;
use time::{Date, OffsetDateTime};

use crate::db::Database;
use crate::error::TagError;
use crate::models::date::{format_day, parse_day};
use crate::models::{DayTag, DayTagId, Tag, TagId};
use crate::normalizer::TagNormalizer;

/// Maximum number of tags a single calendar day may carry.
pub const MAX_TAGS_PER_DAY: usize = 10;

const TAG_COLUMNS: &str = "id, name, display_name, description, usage_count, created_at";

/// Service layer owning the tag store and the tag↔day association store.
///
/// `TagService` owns a [`Database`] instance and provides the mutation and
/// read operations the calendar, filter, and reporting layers build on.
/// Every write that touches both an association row and its owning tag's
/// `usage_count` executes inside one storage transaction, so the counter
/// can never drift from the association set.
///
/// # Examples
///
/// ```
/// use gutlog::{Database, TagService};
///
/// # fn main() -> anyhow::Result<()> {
/// let db = Database::in_memory()?;
/// let service = TagService::new(db);
/// # Ok(())
/// # }
/// ```
pub struct TagService {
    db: Database,
}

impl TagService {
    /// Creates a new TagService with the given database.
    ///
    /// Takes ownership of the database instance. The service becomes the
    /// sole owner and manages all tag operations through its methods;
    /// collaborators that share the store borrow it via [`database`].
    ///
    /// [`database`]: TagService::database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    ///
    /// Used by the entry store, which shares the same file, and by tests.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Gets or creates a tag by display name.
    ///
    /// Validates the name, then matches on its normalized form. If a tag
    /// with that key already exists it is returned with its stored display
    /// casing untouched; a supplied description is backfilled only when
    /// the stored tag has none. Otherwise a fresh tag is created with
    /// `usage_count` 0 and the trimmed input as its display name.
    ///
    /// # Examples
    ///
    /// ```
    /// use gutlog::{Database, TagService};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let db = Database::in_memory()?;
    /// let service = TagService::new(db);
    ///
    /// let first = service.create_or_get_tag("Vacation", None)?;
    /// let second = service.create_or_get_tag("VACATION", None)?;
    ///
    /// assert_eq!(first.id, second.id);
    /// assert_eq!(second.display_name, "Vacation");
    /// # Ok(())
    /// # }
    /// ```
    pub fn create_or_get_tag(
        &self,
        display_name: &str,
        description: Option<&str>,
    ) -> Result<Tag, TagError> {
        TagNormalizer::validate(display_name)?;
        let key = TagNormalizer::normalize(display_name);
        let description = description.map(str::trim).filter(|d| !d.is_empty());

        let conn = self.db.connection();
        conn.execute("BEGIN TRANSACTION", [])?;

        let result: Result<Tag, TagError> = (|| {
            let existing = conn
                .query_row(
                    &format!("SELECT {TAG_COLUMNS} FROM tags WHERE name = ?1"),
                    [&key],
                    read_tag_row,
                )
                .optional()?;

            if let Some(raw) = existing {
                let mut tag = into_tag(raw)?;
                if tag.description.is_none()
                    && let Some(text) = description
                {
                    conn.execute(
                        "UPDATE tags SET description = ?1 WHERE id = ?2",
                        (text, tag.id.get()),
                    )?;
                    tag.description = Some(text.to_string());
                }
                return Ok(tag);
            }

            let now = OffsetDateTime::now_utc().unix_timestamp();
            conn.execute(
                "INSERT INTO tags (name, display_name, description, usage_count, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4)",
                rusqlite::params![key, display_name.trim(), description, now],
            )?;
            let id = conn.last_insert_rowid();
            debug!("created tag '{}' (id {id})", display_name.trim());

            Ok(Tag {
                id: TagId::new(id),
                name: key.clone(),
                display_name: display_name.trim().to_string(),
                description: description.map(String::from),
                usage_count: 0,
                created_at: OffsetDateTime::from_unix_timestamp(now)?,
            })
        })();

        match result {
            Ok(tag) => {
                conn.execute("COMMIT", [])?;
                Ok(tag)
            }
            Err(e) => {
                conn.execute("ROLLBACK", []).ok();
                Err(e)
            }
        }
    }

    /// Retrieves a tag by its ID. Returns `None` if no tag exists with
    /// the given ID; this is not an error condition.
    pub fn tag_by_id(&self, id: TagId) -> Result<Option<Tag>, TagError> {
        let raw = self
            .db
            .connection()
            .query_row(
                &format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?1"),
                [id.get()],
                read_tag_row,
            )
            .optional()?;

        raw.map(into_tag).transpose()
    }

    /// Retrieves a tag by name, normalizing first, so any casing or
    /// surrounding whitespace matches.
    pub fn tag_by_name(&self, name: &str) -> Result<Option<Tag>, TagError> {
        let key = TagNormalizer::normalize(name);
        let raw = self
            .db
            .connection()
            .query_row(
                &format!("SELECT {TAG_COLUMNS} FROM tags WHERE name = ?1"),
                [&key],
                read_tag_row,
            )
            .optional()?;

        raw.map(into_tag).transpose()
    }

    /// Lists all tags, most used first.
    ///
    /// Ordered by `usage_count` descending, ties broken by `display_name`
    /// ascending (binary compare), so zero-usage tags keep a stable,
    /// discoverable order for autocomplete.
    pub fn list_tags(&self) -> Result<Vec<Tag>, TagError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TAG_COLUMNS} FROM tags ORDER BY usage_count DESC, display_name ASC"
        ))?;
        let rows = stmt.query_map([], read_tag_row)?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(into_tag(row?)?);
        }
        Ok(tags)
    }

    /// Overwrites a tag's description unconditionally. `None` clears it.
    ///
    /// Fails with [`TagError::TagNotFound`] if the id is absent.
    pub fn update_description(
        &self,
        id: TagId,
        description: Option<&str>,
    ) -> Result<Tag, TagError> {
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let conn = self.db.connection();

        let changed = conn.execute(
            "UPDATE tags SET description = ?1 WHERE id = ?2",
            (description, id.get()),
        )?;
        if changed == 0 {
            return Err(TagError::TagNotFound(id));
        }

        self.tag_by_id(id)?.ok_or(TagError::TagNotFound(id))
    }

    /// Deletes a tag and, through the cascading foreign key, every day
    /// association referencing it — all in one statement.
    ///
    /// Deletion is unconditional: there is no usage-based restriction and
    /// no confirmation step at this layer. Fails with
    /// [`TagError::TagNotFound`] if the id is absent.
    pub fn delete_tag(&self, id: TagId) -> Result<(), TagError> {
        let conn = self.db.connection();
        let removed = conn.execute("DELETE FROM tags WHERE id = ?1", [id.get()])?;
        if removed == 0 {
            return Err(TagError::TagNotFound(id));
        }
        debug!("deleted tag {id} and its day associations");
        Ok(())
    }

    /// Applies a tag to a calendar day.
    ///
    /// Fails with [`TagError::TagNotFound`] for an unknown tag,
    /// [`TagError::InvalidDate`] unless `day` is a valid `YYYY-MM-DD`
    /// date, [`TagError::AlreadyTagged`] if the pair already exists, and
    /// [`TagError::DayFull`] once the day carries [`MAX_TAGS_PER_DAY`]
    /// tags. On success the association insert and the owning tag's
    /// counter increment commit as one transaction — no caller can
    /// observe one without the other.
    ///
    /// # Examples
    ///
    /// ```
    /// use gutlog::{Database, TagService};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let db = Database::in_memory()?;
    /// let service = TagService::new(db);
    ///
    /// let tag = service.create_or_get_tag("Vacation", None)?;
    /// let link = service.add_tag_to_day(tag.id, "2025-10-25")?;
    ///
    /// assert_eq!(link.tag_id, tag.id);
    /// assert_eq!(service.tag_by_id(tag.id)?.unwrap().usage_count, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_tag_to_day(&self, tag_id: TagId, day: &str) -> Result<DayTag, TagError> {
        let conn = self.db.connection();
        conn.execute("BEGIN TRANSACTION", [])?;

        let result: Result<DayTag, TagError> = (|| {
            let tag_exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?1)",
                [tag_id.get()],
                |row| row.get(0),
            )?;
            if !tag_exists {
                return Err(TagError::TagNotFound(tag_id));
            }

            let parsed = parse_day(day)?;
            let day_key = format_day(parsed);

            let duplicate: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM day_tags WHERE tag_id = ?1 AND day = ?2)",
                (tag_id.get(), &day_key),
                |row| row.get(0),
            )?;
            if duplicate {
                return Err(TagError::AlreadyTagged {
                    tag_id,
                    day: day_key,
                });
            }

            let live: i64 = conn.query_row(
                "SELECT COUNT(*) FROM day_tags WHERE day = ?1",
                [&day_key],
                |row| row.get(0),
            )?;
            if live >= MAX_TAGS_PER_DAY as i64 {
                return Err(TagError::DayFull { day: day_key });
            }

            let now = OffsetDateTime::now_utc().unix_timestamp();
            conn.execute(
                "INSERT INTO day_tags (tag_id, day, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![tag_id.get(), day_key, now],
            )?;
            let id = conn.last_insert_rowid();

            conn.execute(
                "UPDATE tags SET usage_count = usage_count + 1 WHERE id = ?1",
                [tag_id.get()],
            )?;
            debug!("tagged {day_key} with tag {tag_id}");

            Ok(DayTag {
                id: DayTagId::new(id),
                tag_id,
                day: parsed,
                created_at: OffsetDateTime::from_unix_timestamp(now)?,
            })
        })();

        match result {
            Ok(link) => {
                conn.execute("COMMIT", [])?;
                Ok(link)
            }
            Err(e) => {
                conn.execute("ROLLBACK", []).ok();
                Err(e)
            }
        }
    }

    /// Removes a tag from a calendar day.
    ///
    /// The primitive owns the idempotence contract: it returns `Ok(false)`
    /// when no matching association exists (nothing deleted, counter
    /// untouched) and `Ok(true)` after deleting the row and decrementing
    /// the owning tag's counter, floored at 0, in the same transaction.
    pub fn remove_tag_from_day(&self, tag_id: TagId, day: &str) -> Result<bool, TagError> {
        let day_key = format_day(parse_day(day)?);

        let conn = self.db.connection();
        conn.execute("BEGIN TRANSACTION", [])?;

        let result: Result<bool, TagError> = (|| {
            let removed = conn.execute(
                "DELETE FROM day_tags WHERE tag_id = ?1 AND day = ?2",
                (tag_id.get(), &day_key),
            )?;
            if removed == 0 {
                return Ok(false);
            }

            conn.execute(
                "UPDATE tags SET usage_count = MAX(usage_count - 1, 0) WHERE id = ?1",
                [tag_id.get()],
            )?;
            debug!("untagged {day_key} from tag {tag_id}");
            Ok(true)
        })();

        match result {
            Ok(removed) => {
                conn.execute("COMMIT", [])?;
                Ok(removed)
            }
            Err(e) => {
                conn.execute("ROLLBACK", []).ok();
                Err(e)
            }
        }
    }

    /// All tags with a live association to the given day, ordered by
    /// display name ascending.
    pub fn tags_for_day(&self, day: &str) -> Result<Vec<Tag>, TagError> {
        let day_key = format_day(parse_day(day)?);
        let conn = self.db.connection();

        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.display_name, t.description, t.usage_count, t.created_at
             FROM day_tags dt
             JOIN tags t ON dt.tag_id = t.id
             WHERE dt.day = ?1
             ORDER BY t.display_name ASC",
        )?;
        let rows = stmt.query_map([&day_key], read_tag_row)?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(into_tag(row?)?);
        }
        Ok(tags)
    }

    /// All days carrying the given tag, chronologically ascending,
    /// optionally bounded inclusively by `start`/`end`.
    ///
    /// An unknown tag id yields an empty list; callers that need the
    /// distinction resolve the tag first.
    pub fn days_for_tag(
        &self,
        tag_id: TagId,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Date>, TagError> {
        let start_key = start.map(parse_day).transpose()?.map(format_day);
        let end_key = end.map(parse_day).transpose()?.map(format_day);

        let mut sql = String::from("SELECT day FROM day_tags WHERE tag_id = ?");
        let raw_id = tag_id.get();
        let mut params: Vec<&dyn rusqlite::ToSql> = vec![&raw_id];
        if let Some(key) = &start_key {
            sql.push_str(" AND day >= ?");
            params.push(key);
        }
        if let Some(key) = &end_key {
            sql.push_str(" AND day <= ?");
            params.push(key);
        }
        sql.push_str(" ORDER BY day ASC");

        let conn = self.db.connection();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
            row.get::<_, String>(0)
        })?;

        let mut days = Vec::new();
        for row in rows {
            days.push(parse_day(&row?)?);
        }
        Ok(days)
    }

    /// Every day within the given month that has at least one live
    /// association, mapped to its tags' display names (ascending). Days
    /// with zero tags are omitted entirely.
    pub fn tagged_days_in_month(
        &self,
        year: i32,
        month: u8,
    ) -> Result<BTreeMap<Date, Vec<String>>, TagError> {
        let month_name = time::Month::try_from(month)
            .map_err(|_| TagError::InvalidDate(format!("{year:04}-{month:02}")))?;
        let first = Date::from_calendar_date(year, month_name, 1)
            .map_err(|_| TagError::InvalidDate(format!("{year:04}-{month:02}-01")))?;
        let last = Date::from_calendar_date(
            year,
            month_name,
            time::util::days_in_year_month(year, month_name),
        )
        .map_err(|_| TagError::InvalidDate(format!("{year:04}-{month:02}")))?;

        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT dt.day, t.display_name
             FROM day_tags dt
             JOIN tags t ON dt.tag_id = t.id
             WHERE dt.day BETWEEN ?1 AND ?2
             ORDER BY dt.day ASC, t.display_name ASC",
        )?;
        let rows = stmt.query_map((format_day(first), format_day(last)), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut days: BTreeMap<Date, Vec<String>> = BTreeMap::new();
        for row in rows {
            let (day, display_name) = row?;
            days.entry(parse_day(&day)?).or_default().push(display_name);
        }
        Ok(days)
    }

    /// Days within `[start, end]` carrying *every* one of the given tags.
    ///
    /// Counts live associations per day among the requested ids and keeps
    /// days whose distinct-tag count equals the number of distinct ids.
    /// This is the AND half of the filter engine; the ids are deduplicated
    /// here so repeated names cannot skew the count.
    pub fn days_with_all_tags(
        &self,
        tag_ids: &[TagId],
        start: Date,
        end: Date,
    ) -> Result<Vec<Date>, TagError> {
        let distinct: BTreeSet<i64> = tag_ids.iter().map(|id| id.get()).collect();
        if distinct.is_empty() {
            return Ok(Vec::new());
        }
        let raw_ids: Vec<i64> = distinct.into_iter().collect();

        let placeholders = vec!["?"; raw_ids.len()].join(", ");
        let sql = format!(
            "SELECT day FROM day_tags
             WHERE tag_id IN ({placeholders}) AND day BETWEEN ? AND ?
             GROUP BY day
             HAVING COUNT(DISTINCT tag_id) = ?
             ORDER BY day ASC"
        );

        let start_key = format_day(start);
        let end_key = format_day(end);
        let required = raw_ids.len() as i64;

        let mut params: Vec<&dyn rusqlite::ToSql> =
            raw_ids.iter().map(|id| id as &dyn rusqlite::ToSql).collect();
        params.push(&start_key);
        params.push(&end_key);
        params.push(&required);

        let conn = self.db.connection();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
            row.get::<_, String>(0)
        })?;

        let mut days = Vec::new();
        for row in rows {
            days.push(parse_day(&row?)?);
        }
        Ok(days)
    }
}

struct TagRow {
    id: i64,
    name: String,
    display_name: String,
    description: Option<String>,
    usage_count: i64,
    created_at: i64,
}

fn read_tag_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TagRow> {
    Ok(TagRow {
        id: row.get(0)?,
        name: row.get(1)?,
        display_name: row.get(2)?,
        description: row.get(3)?,
        usage_count: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn into_tag(raw: TagRow) -> Result<Tag, TagError> {
    Ok(Tag {
        id: TagId::new(raw.id),
        name: raw.name,
        display_name: raw.display_name,
        description: raw.description,
        usage_count: raw.usage_count,
        created_at: OffsetDateTime::from_unix_timestamp(raw.created_at)?,
    })
}
