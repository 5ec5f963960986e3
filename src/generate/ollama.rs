//! Ollama-backed narrative generator.
//!
//! Calls a local Ollama server's `/api/generate` endpoint to turn diary text
//! into a short cinematic narrative and an episode title. Reachability is
//! probed via `/api/tags` with a short fixed timeout.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OllamaConfig;
use crate::generate::{Generated, GeneratorError, NarrativeGenerator};

/// Probe timeout — the health check must answer fast or not at all.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Request body for Ollama text generation.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from Ollama text generation.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Generator backed by a local Ollama server.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaGenerator {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Send a prompt to `/api/generate` and return the trimmed completion.
    ///
    /// The blocking client is built per request; its internal runtime must not
    /// be created on an async worker thread, so this method may only run
    /// inside `spawn_blocking` (or a plain thread).
    fn request(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| GeneratorError::Unavailable(e.to_string()))?;

        let response = client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| GeneratorError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(GeneratorError::InvalidResponse(format!(
                "HTTP {status}: {error_text}"
            )));
        }

        let parsed: GenerateResponse = response.json().map_err(|e| {
            GeneratorError::InvalidResponse(format!("failed to parse generate response: {e}"))
        })?;

        Ok(parsed.response.trim().to_string())
    }

    fn narrative_prompt(raw_text: &str) -> String {
        let mood = detect_mood(raw_text);
        format!(
            "You are a creative writer helping to transform personal diary entries \
             into engaging narrative prose.\n\n\
             Transform the following diary entry into a short, cinematic narrative \
             paragraph (2-4 sentences). Write in third person, present tense, as if \
             describing scenes from a movie about the protagonist's life. Keep it \
             personal and emotionally resonant while maintaining the key events and \
             feelings. The overall mood of the day is {mood}.\n\n\
             Diary entry:\n{raw_text}\n\n\
             Narrative (2-4 sentences, cinematic style):"
        )
    }

    fn title_prompt(text: &str) -> String {
        // Cap prompt size; long entries add nothing to a title
        let excerpt: String = text.chars().take(500).collect();
        format!(
            "You are creating episode titles for a personal life documentary series.\n\n\
             Generate a single catchy, evocative episode title (3-7 words) for this \
             diary entry. The title should feel like a TV episode title. Only output \
             the title, nothing else. No quotes, no explanation.\n\n\
             Diary content:\n{excerpt}\n\n\
             Episode title:"
        )
    }
}

impl NarrativeGenerator for OllamaGenerator {
    fn generate(&self, raw_text: &str) -> Result<Generated, GeneratorError> {
        debug!(model = %self.model, chars = raw_text.len(), "generating narrative");
        let narrative_text = self.request(&Self::narrative_prompt(raw_text))?;

        // Title works from the narrative when we have one; it reads better
        // than titling the raw notes.
        let title_source = if narrative_text.is_empty() {
            raw_text
        } else {
            &narrative_text
        };
        let title = clean_title(&self.request(&Self::title_prompt(title_source))?);

        if narrative_text.is_empty() || title.is_empty() {
            return Err(GeneratorError::InvalidResponse(
                "model returned empty output".into(),
            ));
        }

        debug!(title = %title, "generation complete");
        Ok(Generated {
            title,
            narrative_text,
        })
    }

    fn probe(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        let Ok(client) = Client::builder().timeout(PROBE_TIMEOUT).build() else {
            return false;
        };
        match client.get(&url).send() {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Infer a coarse mood from keywords to steer the narrative prompt.
pub fn detect_mood(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if contains_any(&["productive", "finished", "accomplished", "work", "busy"]) {
        "productive"
    } else if contains_any(&["sad", "reflective", "thought", "lonely", "missing"]) {
        "reflective"
    } else if contains_any(&["stress", "deadline", "rushed", "panic"]) {
        "stressful"
    } else if contains_any(&["relax", "chill", "calm", "peace", "quiet"]) {
        "relaxed"
    } else if contains_any(&["mystery", "weird", "strange", "unknown"]) {
        "mysterious"
    } else {
        "neutral"
    }
}

/// Clean up a model-produced title: strip surrounding quotes and cap length.
fn clean_title(raw: &str) -> String {
    let title = raw.trim().trim_matches(['"', '\'']).trim();
    let words: Vec<&str> = title.split_whitespace().collect();
    if words.len() > 7 {
        words[..7].join(" ")
    } else {
        words.join(" ")
    }
}
