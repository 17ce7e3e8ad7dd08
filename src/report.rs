use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use time::Date;

use crate::entries::EntryProvider;
use crate::error::TagError;
use crate::models::{EntryKind, Tag, TagId};
use crate::service::TagService;

/// Read-only per-tag report over bowel-movement entries on tagged days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagStatistics {
    pub tag: Tag,
    /// Number of days currently carrying the tag.
    pub tagged_days: usize,
    /// Bowel-movement entries recorded on those days.
    pub movement_entries: usize,
    pub entries_per_day: f64,
    pub mean_consistency: Option<f64>,
    pub mean_urgency: Option<f64>,
    /// Entry counts per consistency value (Bristol 1-7).
    pub consistency_distribution: BTreeMap<u8, usize>,
    /// Entry counts per urgency value (1-4).
    pub urgency_distribution: BTreeMap<u8, usize>,
    /// Earliest tagged day, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_day: Option<String>,
    /// Latest tagged day, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_day: Option<String>,
}

/// Computes per-tag statistics from the association store and the entry
/// collaborator. Performs no writes.
pub struct StatsReporter<'a, E> {
    tags: &'a TagService,
    entries: &'a E,
}

impl<'a, E: EntryProvider> StatsReporter<'a, E> {
    pub fn new(tags: &'a TagService, entries: &'a E) -> Self {
        Self { tags, entries }
    }

    /// Statistics for a tag, or `Ok(None)` for an unknown id.
    ///
    /// A tag with zero tagged days yields an all-zero report rather than
    /// an error.
    pub fn statistics_for_tag(&self, id: TagId) -> Result<Option<TagStatistics>, TagError> {
        let Some(tag) = self.tags.tag_by_id(id)? else {
            return Ok(None);
        };

        let days = self.tags.days_for_tag(id, None, None)?;
        if days.is_empty() {
            return Ok(Some(TagStatistics {
                tag,
                tagged_days: 0,
                movement_entries: 0,
                entries_per_day: 0.0,
                mean_consistency: None,
                mean_urgency: None,
                consistency_distribution: BTreeMap::new(),
                urgency_distribution: BTreeMap::new(),
                first_day: None,
                last_day: None,
            }));
        }

        // days_for_tag is chronologically ascending
        let first = days[0];
        let last = days[days.len() - 1];
        let day_set: BTreeSet<Date> = days.iter().copied().collect();

        let mut movements = self.entries.entries_in_date_range(first, last)?;
        movements.retain(|e| e.kind == EntryKind::BowelMovement && day_set.contains(&e.day));

        let mut consistency_distribution = BTreeMap::new();
        let mut urgency_distribution = BTreeMap::new();
        let mut consistency_sum = 0u64;
        let mut urgency_sum = 0u64;
        let mut counted = 0usize;
        for entry in &movements {
            let Some(movement) = &entry.bowel_movement else {
                continue;
            };
            *consistency_distribution.entry(movement.consistency).or_insert(0) += 1;
            *urgency_distribution.entry(movement.urgency).or_insert(0) += 1;
            consistency_sum += u64::from(movement.consistency);
            urgency_sum += u64::from(movement.urgency);
            counted += 1;
        }

        let mean = |sum: u64| {
            if counted == 0 {
                None
            } else {
                Some(sum as f64 / counted as f64)
            }
        };

        Ok(Some(TagStatistics {
            tag,
            tagged_days: days.len(),
            movement_entries: counted,
            entries_per_day: counted as f64 / days.len() as f64,
            mean_consistency: mean(consistency_sum),
            mean_urgency: mean(urgency_sum),
            consistency_distribution,
            urgency_distribution,
            first_day: Some(crate::models::date::format_day(first)),
            last_day: Some(crate::models::date::format_day(last)),
        }))
    }
}
