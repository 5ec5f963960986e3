//! Command-line entry management (add, list, export) for use without the
//! web UI. Each command opens the database, runs one service operation, and
//! prints a human-readable result.

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::config::ChronicleConfig;
use crate::entry::store::ListFilter;
use crate::entry::types::GenerationState;
use crate::server::setup_service;

/// Add a quick-mode entry from the command line.
pub fn add(config: &ChronicleConfig, text: &str, date: Option<NaiveDate>, skip_ai: bool) -> Result<()> {
    let service = setup_service(config)?;

    if !skip_ai && !service.generator_available() {
        eprintln!("Ollama is not reachable — falling back to offline generation.");
    }

    let entry = service.create_quick(text, date, skip_ai)?;

    println!("Created entry {} for {}", entry.id, entry.date);
    if let Some(title) = &entry.title {
        println!("Episode title: {title}");
    }
    if entry.generation_state() == GenerationState::Skipped {
        println!("Generation skipped — run `chronicle serve` and regenerate later.");
    }
    Ok(())
}

/// Print recent entries, newest first. With `json`, dump them as pretty
/// JSON for scripting.
pub fn list(config: &ChronicleConfig, limit: usize, json: bool) -> Result<()> {
    let service = setup_service(config)?;
    let entries = service.list(ListFilter {
        limit,
        ..Default::default()
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No entries yet.");
        return Ok(());
    }

    println!("Recent episodes ({} entries):", entries.len());
    for entry in &entries {
        println!("[{}] #{} {}", entry.date, entry.id, entry.display_title());
        println!("    {}", entry.snippet(100));
    }
    Ok(())
}

/// Export a single entry or the weekly summary to Markdown.
pub fn export(config: &ChronicleConfig, id: Option<i64>, weekly: bool) -> Result<()> {
    let service = setup_service(config)?;

    let path = match (id, weekly) {
        (Some(id), false) => service.export_entry(id)?,
        (None, true) => service.export_weekly()?,
        _ => bail!("specify exactly one of --id or --weekly"),
    };

    println!("Exported to {}", path.display());
    Ok(())
}
