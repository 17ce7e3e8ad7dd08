pub mod calendar;
pub mod db;
pub mod entries;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod normalizer;
pub mod report;
pub mod service;
pub mod utils;

pub use calendar::{MonthProjector, MonthTags};
pub use db::Database;
pub use entries::{EntryProvider, EntryService};
pub use error::TagError;
pub use filter::FilterEngine;
pub use models::{
    BowelMovement, DayTag, DayTagId, Entry, EntryId, EntryKind, MatchMode, NoteDetails, Tag,
    TagFilter, TaggedEntry, TagId,
};
pub use normalizer::TagNormalizer;
pub use report::{StatsReporter, TagStatistics};
pub use service::{MAX_TAGS_PER_DAY, TagService};
