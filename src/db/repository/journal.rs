use rusqlite::{params, Connection, OptionalExtension};

use crate::db::sqlite::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::{JournalEntry, NewJournalEntry};

const JOURNAL_COLUMNS: &str = "id, user_id, timestamp, content, ai_analysis, ai_encouragement,
     sentiment_score, classified_by";

/// Insert a journal entry and return the stored row.
pub fn insert_journal_entry(
    conn: &Connection,
    entry: &NewJournalEntry<'_>,
) -> Result<JournalEntry, DatabaseError> {
    conn.execute(
        "INSERT INTO journal_entries (timestamp, content, ai_analysis, ai_encouragement,
         sentiment_score, classified_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            format_timestamp(&entry.timestamp),
            entry.content,
            entry.ai_analysis,
            entry.ai_encouragement,
            entry.sentiment_score,
            entry.classified_by,
        ],
    )?;
    let id = conn.last_insert_rowid();
    get_journal_entry(conn, id)?.ok_or(DatabaseError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
}

/// Fetch one journal entry by id.
pub fn get_journal_entry(conn: &Connection, id: i64) -> Result<Option<JournalEntry>, DatabaseError> {
    let sql = format!("SELECT {JOURNAL_COLUMNS} FROM journal_entries WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], read_journal_row)
        .optional()?;
    row.map(journal_from_row).transpose()
}

/// All journal entries, newest first.
pub fn list_journal_entries(conn: &Connection) -> Result<Vec<JournalEntry>, DatabaseError> {
    let sql = format!("SELECT {JOURNAL_COLUMNS} FROM journal_entries ORDER BY timestamp DESC, id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], read_journal_row)?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(journal_from_row(row?)?);
    }
    Ok(entries)
}

type JournalRow = (
    i64,
    i64,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<f64>,
    String,
);

fn read_journal_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<JournalRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn journal_from_row(row: JournalRow) -> Result<JournalEntry, DatabaseError> {
    let (id, user_id, timestamp, content, ai_analysis, ai_encouragement, sentiment_score, classified_by) =
        row;
    Ok(JournalEntry {
        id,
        user_id,
        timestamp: parse_timestamp("timestamp", &timestamp)?,
        content,
        ai_analysis,
        ai_encouragement,
        sentiment_score,
        classified_by,
    })
}
