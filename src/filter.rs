use std::collections::{BTreeSet, HashMap};

use time::Date;

use crate::entries::EntryProvider;
use crate::error::TagError;
use crate::models::date::{format_day, parse_day};
use crate::models::{MatchMode, Tag, TagFilter, TaggedEntry, TagId};
use crate::normalizer::TagNormalizer;
use crate::service::TagService;

/// Resolves multi-tag filters into qualifying days and joins them against
/// the entry store.
///
/// Entries inherit tags from their day at read time; the engine computes
/// the join on every query and never stores tag references on entries, so
/// tags apply retroactively to existing and future entries alike.
pub struct FilterEngine<'a, E> {
    tags: &'a TagService,
    entries: &'a E,
}

impl<'a, E: EntryProvider> FilterEngine<'a, E> {
    pub fn new(tags: &'a TagService, entries: &'a E) -> Self {
        Self { tags, entries }
    }

    /// Resolves a filter to the set of days carrying the requested tags
    /// within `[start, end]`.
    ///
    /// Every name must resolve to an existing tag; filtering by an
    /// unknown tag is [`TagError::UnknownTag`], not an empty result, so
    /// typos surface immediately.
    pub fn resolve_days(
        &self,
        filter: &TagFilter,
        start: &str,
        end: &str,
    ) -> Result<BTreeSet<Date>, TagError> {
        let start = parse_day(start)?;
        let end = parse_day(end)?;
        self.resolve_days_in(filter, start, end)
    }

    /// Entries on qualifying days, newest first, each annotated with its
    /// day's full tag set.
    ///
    /// The tag set is looked up once per distinct day, not per entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use gutlog::{Database, EntryService, FilterEngine, TagFilter, TagService};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let service = TagService::new(Database::in_memory()?);
    /// let tag = service.create_or_get_tag("Vacation", None)?;
    /// service.add_tag_to_day(tag.id, "2025-10-25")?;
    ///
    /// let entries = EntryService::new(service.database());
    /// let engine = FilterEngine::new(&service, &entries);
    ///
    /// let filter = TagFilter::any(vec!["vacation".to_string()]);
    /// let matched = engine.entries_by_tags(&filter, "2025-10-01", "2025-10-31")?;
    /// assert!(matched.is_empty(), "no entries logged yet");
    /// # Ok(())
    /// # }
    /// ```
    pub fn entries_by_tags(
        &self,
        filter: &TagFilter,
        start: &str,
        end: &str,
    ) -> Result<Vec<TaggedEntry>, TagError> {
        let start = parse_day(start)?;
        let end = parse_day(end)?;

        let days = self.resolve_days_in(filter, start, end)?;
        if days.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries = self.entries.entries_in_date_range(start, end)?;
        entries.retain(|entry| days.contains(&entry.day));
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut day_tags: HashMap<Date, Vec<Tag>> = HashMap::new();
        let mut annotated = Vec::with_capacity(entries.len());
        for entry in entries {
            if !day_tags.contains_key(&entry.day) {
                let tags = self.tags.tags_for_day(&format_day(entry.day))?;
                day_tags.insert(entry.day, tags);
            }
            let tags = day_tags[&entry.day].clone();
            annotated.push(TaggedEntry {
                entry,
                day_tags: tags,
            });
        }
        Ok(annotated)
    }

    /// Single-tag form of [`entries_by_tags`] with `Any` mode.
    ///
    /// [`entries_by_tags`]: FilterEngine::entries_by_tags
    pub fn entries_by_tag(
        &self,
        tag_name: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<TaggedEntry>, TagError> {
        self.entries_by_tags(&TagFilter::any(vec![tag_name.to_string()]), start, end)
    }

    fn resolve_days_in(
        &self,
        filter: &TagFilter,
        start: Date,
        end: Date,
    ) -> Result<BTreeSet<Date>, TagError> {
        let mut ids: Vec<TagId> = Vec::new();
        for name in &filter.tags {
            let tag = self
                .tags
                .tag_by_name(name)?
                .ok_or_else(|| TagError::UnknownTag(TagNormalizer::normalize(name)))?;
            if !ids.contains(&tag.id) {
                ids.push(tag.id);
            }
        }

        let mut days = BTreeSet::new();
        match filter.match_mode {
            MatchMode::Any => {
                let start_key = format_day(start);
                let end_key = format_day(end);
                for id in &ids {
                    days.extend(self.tags.days_for_tag(*id, Some(&start_key), Some(&end_key))?);
                }
            }
            MatchMode::All => {
                days.extend(self.tags.days_with_all_tags(&ids, start, end)?);
            }
        }
        Ok(days)
    }
}
