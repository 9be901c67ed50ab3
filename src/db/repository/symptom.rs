use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

use crate::db::sqlite::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::{NewSymptomReport, SymptomReport};

const SYMPTOM_COLUMNS: &str =
    "id, user_id, timestamp, description, severity, photo_path, advice, classified_by";

/// Insert a symptom report and return its row id.
pub fn insert_symptom_report(
    conn: &Connection,
    report: &NewSymptomReport<'_>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO symptom_reports (timestamp, description, severity, photo_path, advice,
         classified_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            format_timestamp(&report.timestamp),
            report.description,
            report.severity.as_str(),
            report.photo_path,
            report.advice,
            report.classified_by,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Symptom reports with `timestamp >= as_of - days`, oldest first.
pub fn get_recent_symptoms(
    conn: &Connection,
    days: u32,
    as_of: DateTime<Utc>,
) -> Result<Vec<SymptomReport>, DatabaseError> {
    let cutoff = as_of - Duration::days(i64::from(days));
    let sql = format!(
        "SELECT {SYMPTOM_COLUMNS} FROM symptom_reports WHERE timestamp >= ?1 ORDER BY timestamp ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![format_timestamp(&cutoff)], read_symptom_row)?;
    collect_symptoms(rows)
}

/// Most recent symptom reports, newest first.
pub fn list_symptom_reports(conn: &Connection, limit: u32) -> Result<Vec<SymptomReport>, DatabaseError> {
    let sql = format!(
        "SELECT {SYMPTOM_COLUMNS} FROM symptom_reports ORDER BY timestamp DESC, id DESC LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit], read_symptom_row)?;
    collect_symptoms(rows)
}

type SymptomRow = (
    i64,
    i64,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
);

fn read_symptom_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SymptomRow> {
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

fn collect_symptoms(
    rows: impl Iterator<Item = rusqlite::Result<SymptomRow>>,
) -> Result<Vec<SymptomReport>, DatabaseError> {
    let mut reports = Vec::new();
    for row in rows {
        let (id, user_id, timestamp, description, severity, photo_path, advice, classified_by) = row?;
        reports.push(SymptomReport {
            id,
            user_id,
            timestamp: parse_timestamp("timestamp", &timestamp)?,
            description,
            severity,
            photo_path,
            advice,
            classified_by,
        });
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Severity;
    use chrono::TimeZone;

    fn report(ts: DateTime<Utc>, severity: Severity) -> NewSymptomReport<'static> {
        NewSymptomReport {
            timestamp: ts,
            description: "headache",
            severity,
            photo_path: None,
            advice: Some("Rest and hydrate."),
            classified_by: "model",
        }
    }

    #[test]
    fn recent_symptoms_respect_window() {
        let conn = open_memory_database().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();
        insert_symptom_report(&conn, &report(now, Severity::Mild)).unwrap();
        insert_symptom_report(&conn, &report(now - Duration::days(3), Severity::Severe)).unwrap();
        insert_symptom_report(&conn, &report(now - Duration::days(10), Severity::Moderate)).unwrap();

        let recent = get_recent_symptoms(&conn, 7, now).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].severity(), Some(Severity::Severe));
        assert_eq!(recent[1].severity(), Some(Severity::Mild));
    }

    #[test]
    fn recent_symptoms_include_window_boundary() {
        let conn = open_memory_database().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();
        insert_symptom_report(&conn, &report(now - Duration::days(7), Severity::Mild)).unwrap();

        assert_eq!(get_recent_symptoms(&conn, 7, now).unwrap().len(), 1);
    }

    #[test]
    fn empty_table_yields_empty_history() {
        let conn = open_memory_database().unwrap();
        assert!(get_recent_symptoms(&conn, 7, Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn list_limits_and_orders_newest_first() {
        let conn = open_memory_database().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();
        for day in 0..5 {
            insert_symptom_report(&conn, &report(now - Duration::days(day), Severity::Mild)).unwrap();
        }
        let listed = list_symptom_reports(&conn, 3).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].timestamp, now);
        assert!(listed[0].timestamp > listed[1].timestamp);
    }

    #[test]
    fn photo_placeholder_is_stored() {
        let conn = open_memory_database().unwrap();
        let id = insert_symptom_report(
            &conn,
            &NewSymptomReport {
                photo_path: Some("rash.jpg"),
                ..report(Utc::now(), Severity::Moderate)
            },
        )
        .unwrap();
        let listed = list_symptom_reports(&conn, 10).unwrap();
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].photo_path.as_deref(), Some("rash.jpg"));
    }

    #[test]
    fn unknown_stored_label_parses_to_none() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO symptom_reports (timestamp, description, severity) VALUES (?1, 'x', 'Critical')",
            params![format_timestamp(&Utc::now())],
        )
        .unwrap();
        let listed = list_symptom_reports(&conn, 1).unwrap();
        assert_eq!(listed[0].severity, "Critical");
        assert_eq!(listed[0].severity(), None);
    }
}
