//! Export Writer — renders persisted entries into Markdown artifacts.
//!
//! Rendering is a pure function of the input entries (no timestamps or other
//! changing state in the output), so exporting the same entry twice yields
//! byte-identical files. Writes go through a temp file in the target
//! directory and are renamed into place, so a half-written file is never
//! visible at the returned path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::entry::types::Entry;

/// Render a single entry with the daily template.
pub fn render_entry(entry: &Entry) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", entry.display_title()));
    out.push_str(&format!("**Date:** {}\n\n", entry.date));

    if let Some(narrative) = &entry.narrative_text {
        out.push_str("## Narrative\n\n");
        out.push_str(narrative);
        out.push_str("\n\n");
    }

    out.push_str("## Original Entry\n\n");
    out.push_str(&entry.raw_text);
    out.push('\n');
    out
}

/// Render a range of entries with the weekly template: a table of contents
/// followed by one section per entry.
pub fn render_range(entries: &[Entry], range_label: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Weekly Chronicle: {range_label}\n\n"));
    out.push_str(&format!("{} episodes this week.\n\n", entries.len()));

    out.push_str("## Contents\n\n");
    for entry in entries {
        out.push_str(&format!(
            "- [{}: {}](#{})\n",
            entry.date,
            entry.display_title(),
            section_anchor(entry)
        ));
    }
    out.push('\n');

    for entry in entries {
        out.push_str(&format!("## {}: {}\n\n", entry.date, entry.display_title()));
        let body = entry.narrative_text.as_deref().unwrap_or(&entry.raw_text);
        out.push_str(body);
        out.push_str("\n\n");
    }

    out
}

/// Export a single entry to `daily-<date>.md` in the export directory.
pub fn export_entry(dir: &Path, entry: &Entry) -> io::Result<PathBuf> {
    let path = dir.join(format!("daily-{}.md", entry.date));
    write_atomic(&path, &render_entry(entry))?;
    tracing::info!(path = %path.display(), entry_id = entry.id, "exported entry");
    Ok(path)
}

/// Export a range of entries to `weekly-<label>.md` in the export directory.
pub fn export_range(dir: &Path, entries: &[Entry], range_label: &str) -> io::Result<PathBuf> {
    let path = dir.join(format!("weekly-{range_label}.md"));
    write_atomic(&path, &render_range(entries, range_label))?;
    tracing::info!(path = %path.display(), count = entries.len(), "exported range");
    Ok(path)
}

/// GitHub-style anchor for an entry's section heading (`## date: title`).
fn section_anchor(entry: &Entry) -> String {
    let heading = format!("{}: {}", entry.date, entry.display_title());
    let mut anchor = String::with_capacity(heading.len());
    for c in heading.chars() {
        if c.is_alphanumeric() {
            anchor.extend(c.to_lowercase());
        } else if c == ' ' || c == '-' {
            anchor.push('-');
        }
        // other punctuation is dropped
    }
    anchor
}

/// Write contents to a temp file in the same directory, then rename into
/// place. Rename within one directory is atomic on POSIX filesystems.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("md.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(id: i64, date: &str, title: Option<&str>, narrative: Option<&str>) -> Entry {
        Entry {
            id,
            date: date.parse::<NaiveDate>().unwrap(),
            raw_text: "Raw diary text".into(),
            narrative_text: narrative.map(String::from),
            title: title.map(String::from),
        }
    }

    #[test]
    fn daily_template_includes_all_sections() {
        let e = entry(1, "2024-01-15", Some("The Pilot"), Some("A cinematic scene."));
        let md = render_entry(&e);
        assert!(md.starts_with("# The Pilot\n"));
        assert!(md.contains("**Date:** 2024-01-15"));
        assert!(md.contains("## Narrative\n\nA cinematic scene."));
        assert!(md.contains("## Original Entry\n\nRaw diary text"));
    }

    #[test]
    fn daily_template_omits_narrative_section_when_skipped() {
        let e = entry(1, "2024-01-15", None, None);
        let md = render_entry(&e);
        assert!(md.starts_with("# Entry from 2024-01-15\n"));
        assert!(!md.contains("## Narrative"));
        assert!(md.contains("## Original Entry"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let e = entry(1, "2024-01-15", Some("Title"), Some("Narrative"));
        assert_eq!(render_entry(&e), render_entry(&e));

        let entries = vec![e.clone(), entry(2, "2024-01-14", None, None)];
        assert_eq!(
            render_range(&entries, "2024-W03"),
            render_range(&entries, "2024-W03")
        );
    }

    #[test]
    fn range_template_has_toc_linking_each_section() {
        let entries = vec![
            entry(1, "2024-01-15", Some("The Pilot"), Some("n1")),
            entry(2, "2024-01-14", None, None),
        ];
        let md = render_range(&entries, "2024-W03");
        assert!(md.starts_with("# Weekly Chronicle: 2024-W03\n"));
        assert!(md.contains("2 episodes this week."));
        assert!(md.contains("- [2024-01-15: The Pilot](#2024-01-15-the-pilot)"));
        assert!(md.contains("- [2024-01-14: Entry from 2024-01-14](#2024-01-14-entry-from-2024-01-14)"));
        assert!(md.contains("## 2024-01-15: The Pilot"));
        assert!(md.contains("## 2024-01-14: Entry from 2024-01-14"));
    }

    #[test]
    fn export_writes_file_keyed_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let e = entry(1, "2024-01-15", Some("Title"), Some("Narrative"));

        let path = export_entry(dir.path(), &e).unwrap();
        assert_eq!(path, dir.path().join("daily-2024-01-15.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), render_entry(&e));
        // No temp file left behind
        assert!(!dir.path().join("daily-2024-01-15.md.tmp").exists());
    }

    #[test]
    fn export_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let e = entry(1, "2024-01-15", Some("Title"), Some("Narrative"));

        let path1 = export_entry(dir.path(), &e).unwrap();
        let first = fs::read(&path1).unwrap();
        let path2 = export_entry(dir.path(), &e).unwrap();
        let second = fs::read(&path2).unwrap();

        assert_eq!(path1, path2);
        assert_eq!(first, second);
    }

    #[test]
    fn export_range_keyed_by_week_label() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![entry(1, "2024-01-15", Some("T"), Some("N"))];

        let path = export_range(dir.path(), &entries, "2024-W03").unwrap();
        assert_eq!(path, dir.path().join("weekly-2024-W03.md"));
    }

    #[test]
    fn export_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports/deep");
        let e = entry(1, "2024-01-15", None, None);

        let path = export_entry(&nested, &e).unwrap();
        assert!(path.exists());
    }
}
