//! Chronicle — turn your daily diary into episodic stories.
//!
//! A single-user, local-first web application that persists diary entries in
//! SQLite and narrates them into short "episodes" via a local
//! [Ollama](https://ollama.com/) server. When the AI backend is unreachable,
//! generation degrades to a deterministic fallback and everything else keeps
//! working.
//!
//! # Architecture
//!
//! - **Storage**: SQLite with forward-only migrations; the `entries` table is
//!   the only source of truth
//! - **Generation**: `/api/generate` on a local Ollama server, behind the
//!   [`generate::NarrativeGenerator`] trait with a deterministic fallback
//! - **API**: axum REST endpoints plus a static browser UI, all in one binary
//! - **Exports**: deterministic Markdown artifacts (daily and weekly), written
//!   atomically
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, and migrations
//! - [`entry`] — Entry types, the store, and the Entry Service state machine
//! - [`errors`] — The service error taxonomy
//! - [`export`] — Markdown export writer
//! - [`generate`] — Narrative generation trait, Ollama client, fallback policy

pub mod config;
pub mod db;
pub mod entry;
pub mod errors;
pub mod export;
pub mod generate;
