//! Static video-lecture catalog used by the practice agent.
//!
//! The catalog is never filtered here: the full cheat-sheet goes into the
//! practice prompt and the model picks the single best match itself.

use crate::error::TutorError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One lecture video's reference metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Short description written for model consumption.
    #[serde(alias = "summary_for_llm")]
    pub summary: String,
}

/// Read-only list of available videos, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct VideoCatalog {
    records: Vec<VideoRecord>,
}

impl VideoCatalog {
    pub fn new(records: Vec<VideoRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TutorError> {
        let text = fs::read_to_string(path)?;
        let records: Vec<VideoRecord> = serde_json::from_str(&text)?;
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The full catalog as a JSON cheat-sheet for the practice prompt.
    pub fn cheatsheet_json(&self) -> String {
        serde_json::to_string(&self.records).unwrap_or_else(|_| "[]".to_string())
    }
}
