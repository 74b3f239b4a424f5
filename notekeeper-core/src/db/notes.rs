use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row, Transaction};
use uuid::Uuid;

use super::Database;
use crate::error::{Error, Result};
use crate::models::*;
use crate::text::{clean_optional, clean_text};

const COLUMNS: &str = "id, title, content, is_active, created_at, updated_at";

/// A `notes` row as stored. Converted into [`Note`] at the store boundary.
#[derive(Debug, Clone)]
pub struct NoteRecord {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub is_active: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            is_active: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn from_note(note: &Note) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title.clone(),
            content: note.content.clone(),
            is_active: note.active as i64,
            created_at: format_timestamp(note.created_at),
            updated_at: format_timestamp(note.updated_at),
        }
    }
}

impl TryFrom<NoteRecord> for Note {
    type Error = Error;

    fn try_from(record: NoteRecord) -> Result<Self> {
        let corrupt = |reason: String| Error::CorruptRecord {
            id: record.id.clone(),
            reason,
        };

        let id = Uuid::parse_str(&record.id).map_err(|e| corrupt(format!("bad id: {e}")))?;
        let created_at = parse_timestamp(&record.created_at)
            .map_err(|e| corrupt(format!("bad created_at: {e}")))?;
        let updated_at = parse_timestamp(&record.updated_at)
            .map_err(|e| corrupt(format!("bad updated_at: {e}")))?;

        Ok(Note {
            id,
            title: record.title,
            content: record.content,
            active: record.is_active != 0,
            created_at,
            updated_at,
        })
    }
}

/// Fixed-width RFC 3339 so that text order in SQLite is time order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|ts| ts.with_timezone(&Utc))
}

fn clean_title(raw: &str) -> Result<String> {
    let title = clean_text(raw);
    if title.is_empty() {
        return Err(Error::validation("title must not be empty"));
    }
    Ok(title)
}

fn find_active(tx: &Transaction<'_>, id: Uuid) -> Result<Note> {
    let record = tx
        .query_row(
            &format!("SELECT {COLUMNS} FROM notes WHERE id = ?1 AND is_active = 1"),
            params![id.to_string()],
            NoteRecord::from_row,
        )
        .optional()?
        .ok_or(Error::NotFound(id))?;
    record.try_into()
}

fn write_mutation(tx: &Transaction<'_>, note: &Note) -> Result<()> {
    let record = NoteRecord::from_note(note);
    tx.execute(
        "UPDATE notes SET title = ?1, content = ?2, is_active = ?3, updated_at = ?4 WHERE id = ?5",
        params![
            record.title,
            record.content,
            record.is_active,
            record.updated_at,
            record.id,
        ],
    )?;
    Ok(())
}

fn collect_notes(tx: &Transaction<'_>, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Note>> {
    let mut stmt = tx.prepare(sql)?;
    let records = stmt
        .query_map(args, NoteRecord::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    records.into_iter().map(Note::try_from).collect()
}

impl Database {
    /// Creates a note, or returns the identical active note if one exists.
    pub fn create_note(&self, input: CreateNoteInput) -> Result<CreatedNote> {
        let title = clean_title(&input.title)?;
        let content = clean_optional(input.content.as_deref());

        self.with_connection(|conn| {
            let tx = conn.transaction()?;

            let existing = tx
                .query_row(
                    &format!(
                        "SELECT {COLUMNS} FROM notes
                         WHERE is_active = 1 AND title = ?1 AND content IS ?2
                         LIMIT 1"
                    ),
                    params![title, content],
                    NoteRecord::from_row,
                )
                .optional()?;

            if let Some(record) = existing {
                tx.commit()?;
                let note = Note::try_from(record)?;
                tracing::debug!(id = %note.id, "Create matched existing note");
                return Ok(CreatedNote {
                    note,
                    deduplicated: true,
                });
            }

            let now = self.now();
            let note = Note {
                id: Uuid::new_v4(),
                title,
                content,
                active: true,
                created_at: now,
                updated_at: now,
            };
            let record = NoteRecord::from_note(&note);
            tx.execute(
                &format!("INSERT INTO notes ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    record.id,
                    record.title,
                    record.content,
                    record.is_active,
                    record.created_at,
                    record.updated_at,
                ],
            )?;
            tx.commit()?;

            tracing::debug!(id = %note.id, "Created note");
            Ok(CreatedNote {
                note,
                deduplicated: false,
            })
        })
    }

    /// Looks a note up by id, including soft-deleted ones.
    pub fn get_note(&self, id: Uuid) -> Result<Note> {
        self.with_connection(|conn| {
            let record = conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM notes WHERE id = ?1"),
                    params![id.to_string()],
                    NoteRecord::from_row,
                )
                .optional()?
                .ok_or(Error::NotFound(id))?;
            record.try_into()
        })
    }

    /// Applies the provided fields to an active note.
    pub fn update_note(&self, id: Uuid, input: UpdateNoteInput) -> Result<Note> {
        if input.is_empty() {
            return Err(Error::validation("no fields to update"));
        }
        let title = input.title.as_deref().map(clean_title).transpose()?;

        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let mut note = find_active(&tx, id)?;

            if let Some(title) = title {
                note.title = title;
            }
            if let Some(content) = input.content.as_deref() {
                note.content = clean_optional(Some(content));
            }
            note.updated_at = self.next_updated_at(note.updated_at);

            write_mutation(&tx, &note)?;
            tx.commit()?;

            tracing::debug!(id = %note.id, "Updated note");
            Ok(note)
        })
    }

    /// Marks an active note inactive. Fails with `NotFound` once deleted.
    pub fn soft_delete_note(&self, id: Uuid) -> Result<Note> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let mut note = find_active(&tx, id)?;

            note.active = false;
            note.updated_at = self.next_updated_at(note.updated_at);

            write_mutation(&tx, &note)?;
            tx.commit()?;

            tracing::debug!(id = %note.id, "Soft-deleted note");
            Ok(note)
        })
    }

    pub fn list_notes(&self, query: &ListNotesQuery) -> Result<NotePage> {
        let sql = format!(
            "SELECT {COLUMNS} FROM notes WHERE is_active = 1
             ORDER BY {} {}, id ASC
             LIMIT ?1 OFFSET ?2",
            query.sort_by.column(),
            query.order.keyword(),
        );

        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let total: i64 =
                tx.query_row("SELECT COUNT(*) FROM notes WHERE is_active = 1", [], |r| r.get(0))?;
            let data = collect_notes(&tx, &sql, params![query.limit as i64, query.offset()])?;
            tx.commit()?;

            Ok(NotePage {
                page: query.page,
                limit: query.limit,
                total: total as u64,
                data,
            })
        })
    }

    /// Every active note, most recently updated first.
    pub fn active_notes(&self) -> Result<Vec<Note>> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let notes = collect_notes(
                &tx,
                &format!(
                    "SELECT {COLUMNS} FROM notes WHERE is_active = 1
                     ORDER BY updated_at DESC, id ASC"
                ),
                [],
            )?;
            tx.commit()?;
            Ok(notes)
        })
    }

    pub fn note_stats(&self) -> Result<NoteStats> {
        let day_start = self.now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        self.with_connection(|conn| {
            let tx = conn.transaction()?;

            let total: i64 =
                tx.query_row("SELECT COUNT(*) FROM notes WHERE is_active = 1", [], |r| r.get(0))?;
            let created_today: i64 = tx.query_row(
                "SELECT COUNT(*) FROM notes
                 WHERE is_active = 1 AND created_at >= ?1 AND created_at < ?2",
                params![format_timestamp(day_start), format_timestamp(day_end)],
                |r| r.get(0),
            )?;
            let last_updated: Option<String> = tx
                .query_row(
                    "SELECT id FROM notes WHERE is_active = 1
                     ORDER BY updated_at DESC, id ASC LIMIT 1",
                    [],
                    |r| r.get(0),
                )
                .optional()?;
            tx.commit()?;

            let last_updated_note = last_updated
                .map(|id| {
                    Uuid::parse_str(&id).map_err(|e| Error::CorruptRecord {
                        id,
                        reason: format!("bad id: {e}"),
                    })
                })
                .transpose()?;

            Ok(NoteStats {
                total_notes: total as u64,
                created_today: created_today as u64,
                last_updated_note,
            })
        })
    }

    /// A mutation timestamp strictly after `previous`, even if the clock has
    /// not moved.
    fn next_updated_at(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.now();
        if now > previous {
            now
        } else {
            previous + Duration::microseconds(1)
        }
    }
}
