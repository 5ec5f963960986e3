//! Narrative generation pipeline.
//!
//! Provides the [`NarrativeGenerator`] trait, the [`OllamaGenerator`]
//! implementation backed by a local Ollama server, and the deterministic
//! fallback policy used when generation is unavailable. The generator has no
//! side effects on the store; the Entry Service decides what gets persisted.

pub mod ollama;

pub use ollama::OllamaGenerator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of leading words used for a fallback title.
pub const FALLBACK_TITLE_WORDS: usize = 5;

/// A generated title/narrative pair. Always produced together, so an entry
/// can never end up with one field set and the other null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generated {
    pub title: String,
    pub narrative_text: String,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The AI backend is unreachable or timed out. This is the expected path
    /// when running offline, not a crash.
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    /// The backend answered but the response could not be used.
    #[error("invalid generator response: {0}")]
    InvalidResponse(String),
}

/// Trait for producing a title and narrative from raw diary text.
///
/// Implementations are a pure function of the input text plus external
/// service reachability. All methods are synchronous — callers in async
/// contexts should use `tokio::task::spawn_blocking`.
pub trait NarrativeGenerator: Send + Sync {
    /// Generate a title/narrative pair from raw diary text.
    fn generate(&self, raw_text: &str) -> Result<Generated, GeneratorError>;

    /// Health check: is the AI backend reachable? Bounded by a short timeout
    /// and never errors. Polled for display only, no correctness obligation.
    fn probe(&self) -> bool;
}

/// Fallback title: the first few words of the raw text, or a generic
/// placeholder when there are none.
pub fn fallback_title(raw_text: &str) -> String {
    let words: Vec<&str> = raw_text
        .split_whitespace()
        .take(FALLBACK_TITLE_WORDS)
        .collect();
    if words.is_empty() {
        "Untitled Episode".to_string()
    } else {
        words.join(" ")
    }
}

/// Fallback narrative: the raw text verbatim (trimmed).
pub fn fallback_narrative(raw_text: &str) -> String {
    raw_text.trim().to_string()
}

/// The full fallback policy applied when generation fails or is unavailable.
pub fn fallback(raw_text: &str) -> Generated {
    Generated {
        title: fallback_title(raw_text),
        narrative_text: fallback_narrative(raw_text),
    }
}
