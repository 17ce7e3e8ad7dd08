/// Complete database schema for the diary.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
/// All statements are designed to be run in a single transaction.
pub const INITIAL_SCHEMA: &str = r#"
-- Tags table: reusable labels keyed by normalized name
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    description TEXT,
    usage_count INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

-- Junction table: links tags to calendar days (many-to-many)
CREATE TABLE IF NOT EXISTS day_tags (
    id INTEGER PRIMARY KEY,
    tag_id INTEGER NOT NULL,
    day TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (tag_id, day),
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

-- Index for per-day lookups and month range scans
CREATE INDEX IF NOT EXISTS idx_day_tags_day ON day_tags(day);

-- Entries table: bowel-movement observations and free-form notes
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY,
    kind TEXT NOT NULL CHECK (kind IN ('bowel_movement', 'note')),
    day TEXT NOT NULL,
    clock TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    consistency INTEGER,
    urgency INTEGER,
    movement_notes TEXT,
    note_category TEXT,
    note_content TEXT,
    note_tags TEXT
);

-- Indexes for date-range joins and newest-first listings
CREATE INDEX IF NOT EXISTS idx_entries_day ON entries(day);
CREATE INDEX IF NOT EXISTS idx_entries_timestamp ON entries(timestamp);
"#;
