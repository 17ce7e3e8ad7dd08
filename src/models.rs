pub mod date;
mod day_tag;
mod entry;
mod filter;
mod ids;
mod tag;

pub use day_tag::DayTag;
pub use entry::{BowelMovement, Entry, EntryKind, NoteDetails, TaggedEntry};
pub use filter::{MatchMode, TagFilter};
pub use ids::{DayTagId, EntryId, TagId};
pub use tag::Tag;
