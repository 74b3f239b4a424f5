pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(title) > 0),
    content TEXT,
    is_active INTEGER NOT NULL DEFAULT 1 CHECK (is_active IN (0, 1)),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (updated_at >= created_at)
);

CREATE INDEX IF NOT EXISTS idx_notes_active_updated ON notes(is_active, updated_at);
CREATE INDEX IF NOT EXISTS idx_notes_active_created ON notes(is_active, created_at);
CREATE INDEX IF NOT EXISTS idx_notes_active_title ON notes(is_active, title COLLATE NOCASE);
"#;
