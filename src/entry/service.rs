//! Entry Service — validation, generation, and persistence orchestration.
//!
//! Every create/regenerate runs the same sequence: Validating → Generating →
//! Persisting → Done, where `skip_ai` shortcuts Generating and a generator
//! failure downgrades to the fallback policy instead of failing the
//! operation. Validation failures happen before any side effect, and the
//! single INSERT/UPDATE at the end is the unit of atomicity callers see.
//!
//! All methods are synchronous (the generator call may block on HTTP for up
//! to its configured timeout) — async callers use `tokio::task::spawn_blocking`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::entry::store::{self, ListFilter};
use crate::entry::types::{Entry, NewEntry};
use crate::errors::{ServiceError, ServiceResult};
use crate::export;
use crate::generate::{self, Generated, NarrativeGenerator};

/// Bounds applied to the `limit` list parameter.
pub const MAX_LIST_LIMIT: usize = 100;
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Days covered by a weekly export (today inclusive).
const WEEKLY_EXPORT_DAYS: i64 = 7;

/// Structured answers collected by guided mode. Each non-empty field becomes
/// one labeled paragraph of `raw_text`.
#[derive(Debug, Clone, Default)]
pub struct GuidedFields {
    pub morning: Option<String>,
    pub afternoon: Option<String>,
    pub evening: Option<String>,
    pub thoughts: Option<String>,
    pub mood: Option<String>,
}

impl GuidedFields {
    /// Deterministic labeled concatenation of the non-empty fields, in fixed
    /// order. Returns `None` when every field is empty or whitespace.
    pub fn build_raw_text(&self) -> Option<String> {
        let labeled = [
            ("Morning", &self.morning),
            ("Afternoon", &self.afternoon),
            ("Evening", &self.evening),
            ("Thoughts", &self.thoughts),
            ("Mood", &self.mood),
        ];

        let parts: Vec<String> = labeled
            .iter()
            .filter_map(|(label, value)| {
                let text = value.as_deref()?.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(format!("{label}: {text}"))
                }
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// Orchestrates the Entry Store, Narrative Generator, and Export Writer.
pub struct EntryService {
    db: Arc<Mutex<Connection>>,
    generator: Arc<dyn NarrativeGenerator>,
    export_dir: PathBuf,
}

impl EntryService {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        generator: Arc<dyn NarrativeGenerator>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            db,
            generator,
            export_dir,
        }
    }

    fn conn(&self) -> ServiceResult<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| ServiceError::StorePoisoned)
    }

    /// Create an entry from quick-mode free text.
    pub fn create_quick(
        &self,
        raw_text: &str,
        date: Option<NaiveDate>,
        skip_ai: bool,
    ) -> ServiceResult<Entry> {
        // 1. Validate — before any side effect
        if raw_text.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "raw_text must not be empty".into(),
            ));
        }

        self.create_validated(raw_text.to_string(), date, skip_ai)
    }

    /// Create an entry from guided-mode structured answers.
    pub fn create_guided(
        &self,
        fields: &GuidedFields,
        date: Option<NaiveDate>,
        skip_ai: bool,
    ) -> ServiceResult<Entry> {
        // 1. Validate and build the labeled concatenation
        let raw_text = fields.build_raw_text().ok_or_else(|| {
            ServiceError::InvalidInput("at least one guided field must be provided".into())
        })?;

        self.create_validated(raw_text, date, skip_ai)
    }

    /// Shared tail of both create paths: generate (or skip), then persist
    /// once. The generator runs without the store lock held.
    fn create_validated(
        &self,
        raw_text: String,
        date: Option<NaiveDate>,
        skip_ai: bool,
    ) -> ServiceResult<Entry> {
        let date = date.unwrap_or_else(today);

        // 2. Generate, unless the caller opted out
        let generated = if skip_ai {
            tracing::debug!("skip_ai set, persisting without generated fields");
            None
        } else {
            Some(self.generate_or_fallback(&raw_text))
        };

        // 3. Persist — a fully formed entry or nothing
        let new = NewEntry {
            date,
            raw_text,
            generated,
        };
        let conn = self.conn()?;
        let entry = store::create_entry(&conn, &new)?;
        tracing::info!(entry_id = entry.id, state = %entry.generation_state(), "entry created");
        Ok(entry)
    }

    /// Re-run generation for an existing entry and overwrite its generated
    /// fields. Always attempts generation — an explicit regenerate overrides
    /// a `skip_ai` decision made at creation.
    pub fn regenerate(&self, id: i64) -> ServiceResult<Entry> {
        let entry = self.get(id)?;

        // Generator call happens with the lock released; a concurrent delete
        // wins the race and surfaces as NotFound below.
        let generated = self.generate_or_fallback(&entry.raw_text);

        let conn = self.conn()?;
        if !store::update_generated_fields(&conn, id, &generated)? {
            return Err(ServiceError::NotFound(id));
        }
        tracing::info!(entry_id = id, "entry regenerated");

        Ok(Entry {
            narrative_text: Some(generated.narrative_text),
            title: Some(generated.title),
            ..entry
        })
    }

    /// Call the generator, degrading to the fallback policy on any error.
    /// Generation attempted never leaves null fields behind.
    fn generate_or_fallback(&self, raw_text: &str) -> Generated {
        match self.generator.generate(raw_text) {
            Ok(generated) => generated,
            Err(e) => {
                tracing::warn!(error = %e, "generation failed, applying fallback");
                generate::fallback(raw_text)
            }
        }
    }

    /// List entries, with `limit` clamped to `1..=MAX_LIST_LIMIT`.
    pub fn list(&self, filter: ListFilter) -> ServiceResult<Vec<Entry>> {
        let filter = ListFilter {
            limit: filter.limit.clamp(1, MAX_LIST_LIMIT),
            ..filter
        };
        let conn = self.conn()?;
        Ok(store::list_entries(&conn, &filter)?)
    }

    pub fn get(&self, id: i64) -> ServiceResult<Entry> {
        let conn = self.conn()?;
        store::get_entry(&conn, id)?.ok_or(ServiceError::NotFound(id))
    }

    pub fn delete(&self, id: i64) -> ServiceResult<()> {
        let conn = self.conn()?;
        if !store::delete_entry(&conn, id)? {
            return Err(ServiceError::NotFound(id));
        }
        tracing::info!(entry_id = id, "entry deleted");
        Ok(())
    }

    pub fn count(&self) -> ServiceResult<i64> {
        let conn = self.conn()?;
        Ok(store::count_entries(&conn)?)
    }

    /// Reachability of the narrative generator, for the health endpoint.
    pub fn generator_available(&self) -> bool {
        self.generator.probe()
    }

    /// Export a single entry as Markdown. Read-only with respect to the store.
    pub fn export_entry(&self, id: i64) -> ServiceResult<PathBuf> {
        let entry = self.get(id)?;
        export::export_entry(&self.export_dir, &entry).map_err(|source| ServiceError::Export {
            path: self.export_dir.join(format!("daily-{}.md", entry.date)),
            source,
        })
    }

    /// Export the last 7 days of entries as one Markdown file labeled with
    /// the current ISO week. `NotFound` when the range is empty.
    pub fn export_weekly(&self) -> ServiceResult<PathBuf> {
        let end = today();
        let start = end - chrono::Duration::days(WEEKLY_EXPORT_DAYS - 1);
        let label = iso_week_label(end);

        let entries = {
            let conn = self.conn()?;
            store::list_entries(
                &conn,
                &ListFilter {
                    limit: usize::MAX,
                    start_date: Some(start),
                    end_date: Some(end),
                },
            )?
        };

        if entries.is_empty() {
            return Err(ServiceError::EmptyRange(label.clone()));
        }

        export::export_range(&self.export_dir, &entries, &label).map_err(|source| {
            ServiceError::Export {
                path: self.export_dir.join(format!("weekly-{label}.md")),
                source,
            }
        })
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `YYYY-Www` label for the ISO week containing `date`.
pub fn iso_week_label(date: NaiveDate) -> String {
    use chrono::Datelike;
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}
