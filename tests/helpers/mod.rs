#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use chronicle::db;
use chronicle::entry::service::EntryService;
use chronicle::generate::{Generated, GeneratorError, NarrativeGenerator};

/// Deterministic stand-in for the Ollama generator. When `available` is
/// false every generate call fails the way an unreachable server would.
pub struct StubGenerator {
    pub available: bool,
}

impl NarrativeGenerator for StubGenerator {
    fn generate(&self, raw_text: &str) -> Result<Generated, GeneratorError> {
        if !self.available {
            return Err(GeneratorError::Unavailable("connection refused".into()));
        }
        Ok(Generated {
            title: "Stub Episode".into(),
            narrative_text: format!("In today's episode: {raw_text}"),
        })
    }

    fn probe(&self) -> bool {
        self.available
    }
}

/// Entry Service over a fresh in-memory database and a stub generator.
pub fn test_service(generator_available: bool, export_dir: &Path) -> EntryService {
    let conn = db::open_memory_database().unwrap();
    EntryService::new(
        Arc::new(Mutex::new(conn)),
        Arc::new(StubGenerator {
            available: generator_available,
        }),
        export_dir.to_path_buf(),
    )
}

pub fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}
