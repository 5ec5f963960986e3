//! Core entry type definitions.
//!
//! Defines [`Entry`] (the sole persisted entity), [`NewEntry`] (a validated
//! entry awaiting insertion), and [`GenerationState`] (derived from the
//! generated fields, never stored independently).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::generate::Generated;

/// A diary entry, matching the `entries` table schema.
///
/// `narrative_text` and `title` are either both present or both absent —
/// partial generation is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Auto-assigned by the store on creation, immutable.
    pub id: i64,
    /// Calendar date the entry is attributed to (ISO string in SQLite).
    pub date: NaiveDate,
    /// The user's original diary content. Never empty after a successful create.
    pub raw_text: String,
    /// AI-generated cinematic narrative, or the fallback derived from `raw_text`.
    pub narrative_text: Option<String>,
    /// AI-generated (or fallback) episode title.
    pub title: Option<String>,
}

impl Entry {
    /// Derive the generation state from the stored fields.
    ///
    /// Attempted generation always persists values (fallback on failure), so
    /// nulls at rest can only mean the user opted out at creation or the row
    /// predates the narrative columns.
    pub fn generation_state(&self) -> GenerationState {
        if self.narrative_text.is_some() && self.title.is_some() {
            GenerationState::Generated
        } else {
            GenerationState::Skipped
        }
    }

    /// Title, or a display fallback for entries without one.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(t) => t.clone(),
            None => format!("Entry from {}", self.date),
        }
    }

    /// Truncated preview of the narrative (or raw text) for list views.
    pub fn snippet(&self, max_length: usize) -> String {
        let text = self.narrative_text.as_deref().unwrap_or(&self.raw_text);
        if text.chars().count() <= max_length {
            return text.to_string();
        }
        let truncated: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Derived lifecycle state of an entry's generated fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    /// Narrative and title are both present (AI-generated or fallback).
    Generated,
    /// Generation was skipped at creation (or the row predates generation).
    Skipped,
}

impl GenerationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for GenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated entry ready for insertion.
///
/// Carrying the generated fields as one `Option<Generated>` makes the
/// both-or-neither invariant hold by construction.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub raw_text: String,
    pub generated: Option<Generated>,
}
