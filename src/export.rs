use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use time::OffsetDateTime;

use crate::entries::EntryProvider;
use crate::error::TagError;
use crate::filter::FilterEngine;
use crate::models::{TagFilter, TaggedEntry};

/// The JSON document produced by [`write_json`]: the filtered entries
/// with their inherited day tags, plus the filter and range that
/// produced them.
#[derive(Debug, Serialize)]
pub struct ExportDocument {
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub start: String,
    pub end: String,
    pub filter: TagFilter,
    pub entries: Vec<TaggedEntry>,
}

/// Builds the export document for a filter and inclusive day range.
pub fn build_document<E: EntryProvider>(
    engine: &FilterEngine<'_, E>,
    filter: &TagFilter,
    start: &str,
    end: &str,
) -> Result<ExportDocument, TagError> {
    let entries = engine.entries_by_tags(filter, start, end)?;
    Ok(ExportDocument {
        generated_at: OffsetDateTime::now_utc(),
        start: start.to_string(),
        end: end.to_string(),
        filter: filter.clone(),
        entries,
    })
}

/// Writes a filtered, tag-annotated entry listing as pretty-printed JSON.
pub fn write_json<E: EntryProvider>(
    path: &Path,
    engine: &FilterEngine<'_, E>,
    filter: &TagFilter,
    start: &str,
    end: &str,
) -> Result<()> {
    let document = build_document(engine, filter, start, end)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &document)
        .context("Failed to write export JSON")?;
    Ok(())
}
