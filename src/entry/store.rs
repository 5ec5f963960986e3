//! Entry Store — CRUD over the `entries` table.
//!
//! The only source of truth for entry state. Rows become visible to readers
//! only via the single INSERT in [`create_entry`], so an entry is never
//! observable with `id` set but `raw_text` missing. `list_entries` orders by
//! `date DESC, id DESC` (most recently created first within a day).

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, ToSql};

use crate::entry::types::{Entry, NewEntry};
use crate::generate::Generated;

const ENTRY_COLUMNS: &str = "id, date, raw_text, narrative_text, title";

/// Filter for [`list_entries`]. Date bounds are inclusive.
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub limit: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            limit: 10,
            start_date: None,
            end_date: None,
        }
    }
}

/// Insert a new entry and return it with its assigned id.
pub fn create_entry(conn: &Connection, new: &NewEntry) -> rusqlite::Result<Entry> {
    let (title, narrative) = match &new.generated {
        Some(g) => (Some(g.title.as_str()), Some(g.narrative_text.as_str())),
        None => (None, None),
    };

    conn.execute(
        "INSERT INTO entries (date, raw_text, narrative_text, title) VALUES (?1, ?2, ?3, ?4)",
        params![new.date.to_string(), new.raw_text, narrative, title],
    )?;

    let id = conn.last_insert_rowid();
    tracing::debug!(entry_id = id, date = %new.date, "entry created");

    Ok(Entry {
        id,
        date: new.date,
        raw_text: new.raw_text.clone(),
        narrative_text: narrative.map(String::from),
        title: title.map(String::from),
    })
}

/// Fetch an entry by id. Returns `None` if absent.
pub fn get_entry(conn: &Connection, id: i64) -> rusqlite::Result<Option<Entry>> {
    conn.query_row(
        &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"),
        params![id],
        entry_from_row,
    )
    .optional()
}

/// List entries matching the filter, ordered by date descending, ties broken
/// by id descending.
pub fn list_entries(conn: &Connection, filter: &ListFilter) -> rusqlite::Result<Vec<Entry>> {
    let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM entries");
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(start) = filter.start_date {
        clauses.push("date >= ?");
        values.push(Box::new(start.to_string()));
    }
    if let Some(end) = filter.end_date {
        clauses.push("date <= ?");
        values.push(Box::new(end.to_string()));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY date DESC, id DESC LIMIT ?");
    values.push(Box::new(i64::try_from(filter.limit).unwrap_or(i64::MAX)));

    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(rusqlite::params_from_iter(values.iter()), entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

/// Overwrite the generated fields of an existing entry. `date` and `raw_text`
/// are untouched. Returns `false` if the entry does not exist.
pub fn update_generated_fields(
    conn: &Connection,
    id: i64,
    generated: &Generated,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE entries SET narrative_text = ?1, title = ?2 WHERE id = ?3",
        params![generated.narrative_text, generated.title, id],
    )?;
    Ok(rows > 0)
}

/// Hard-delete an entry. Returns `false` if the entry does not exist.
pub fn delete_entry(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}

/// Total number of stored entries.
pub fn count_entries(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
}

fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    let date_str: String = row.get(1)?;
    Ok(Entry {
        id: row.get(0)?,
        date: date_str
            .parse::<NaiveDate>()
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        raw_text: row.get(2)?,
        narrative_text: row.get(3)?,
        title: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn new_entry(d: &str, raw: &str, generated: Option<Generated>) -> NewEntry {
        NewEntry {
            date: date(d),
            raw_text: raw.into(),
            generated,
        }
    }

    fn generated(title: &str, narrative: &str) -> Generated {
        Generated {
            title: title.into(),
            narrative_text: narrative.into(),
        }
    }

    #[test]
    fn create_assigns_id_and_roundtrips() {
        let conn = test_db();
        let created = create_entry(
            &conn,
            &new_entry("2024-01-15", "Test content", Some(generated("Pilot", "A story"))),
        )
        .unwrap();
        assert!(created.id > 0);

        let fetched = get_entry(&conn, created.id).unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.date, date("2024-01-15"));
        assert_eq!(fetched.raw_text, "Test content");
        assert_eq!(fetched.title.as_deref(), Some("Pilot"));
        assert_eq!(fetched.narrative_text.as_deref(), Some("A story"));
    }

    #[test]
    fn create_without_generated_fields_stores_nulls() {
        let conn = test_db();
        let created = create_entry(&conn, &new_entry("2024-01-15", "Raw only", None)).unwrap();

        let fetched = get_entry(&conn, created.id).unwrap().unwrap();
        assert!(fetched.title.is_none());
        assert!(fetched.narrative_text.is_none());
    }

    #[test]
    fn get_missing_returns_none() {
        let conn = test_db();
        assert!(get_entry(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn list_orders_by_date_then_id_descending() {
        let conn = test_db();
        create_entry(&conn, &new_entry("2024-01-01", "first", None)).unwrap();
        create_entry(&conn, &new_entry("2024-01-03", "second", None)).unwrap();
        create_entry(&conn, &new_entry("2024-01-02", "third", None)).unwrap();
        // Same date as "second", created later — should come first among ties
        let later = create_entry(&conn, &new_entry("2024-01-03", "fourth", None)).unwrap();

        let entries = list_entries(&conn, &ListFilter::default()).unwrap();
        let dates: Vec<String> = entries.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(
            dates,
            vec!["2024-01-03", "2024-01-03", "2024-01-02", "2024-01-01"]
        );
        assert_eq!(entries[0].id, later.id);
    }

    #[test]
    fn list_respects_limit() {
        let conn = test_db();
        for i in 1..=5 {
            create_entry(&conn, &new_entry(&format!("2024-01-0{i}"), "x", None)).unwrap();
        }

        let entries = list_entries(
            &conn,
            &ListFilter {
                limit: 2,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, date("2024-01-05"));
    }

    #[test]
    fn list_filters_by_date_range_inclusive() {
        let conn = test_db();
        for i in 1..=5 {
            create_entry(&conn, &new_entry(&format!("2024-01-0{i}"), "x", None)).unwrap();
        }

        let entries = list_entries(
            &conn,
            &ListFilter {
                limit: 100,
                start_date: Some(date("2024-01-02")),
                end_date: Some(date("2024-01-04")),
            },
        )
        .unwrap();
        let dates: Vec<String> = entries.iter().map(|e| e.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-04", "2024-01-03", "2024-01-02"]);
    }

    #[test]
    fn update_generated_fields_leaves_raw_text_and_date() {
        let conn = test_db();
        let created = create_entry(&conn, &new_entry("2024-01-15", "Original raw", None)).unwrap();

        let updated =
            update_generated_fields(&conn, created.id, &generated("New Title", "New narrative"))
                .unwrap();
        assert!(updated);

        let fetched = get_entry(&conn, created.id).unwrap().unwrap();
        assert_eq!(fetched.raw_text, "Original raw");
        assert_eq!(fetched.date, date("2024-01-15"));
        assert_eq!(fetched.title.as_deref(), Some("New Title"));
        assert_eq!(fetched.narrative_text.as_deref(), Some("New narrative"));
    }

    #[test]
    fn update_generated_fields_missing_entry_returns_false() {
        let conn = test_db();
        assert!(!update_generated_fields(&conn, 42, &generated("t", "n")).unwrap());
    }

    #[test]
    fn delete_removes_entry() {
        let conn = test_db();
        let created = create_entry(&conn, &new_entry("2024-01-15", "bye", None)).unwrap();

        assert!(delete_entry(&conn, created.id).unwrap());
        assert!(get_entry(&conn, created.id).unwrap().is_none());
        assert!(!delete_entry(&conn, created.id).unwrap());
    }

    #[test]
    fn count_tracks_inserts_and_deletes() {
        let conn = test_db();
        assert_eq!(count_entries(&conn).unwrap(), 0);

        let e = create_entry(&conn, &new_entry("2024-01-15", "x", None)).unwrap();
        assert_eq!(count_entries(&conn).unwrap(), 1);

        delete_entry(&conn, e.id).unwrap();
        assert_eq!(count_entries(&conn).unwrap(), 0);
    }
}
