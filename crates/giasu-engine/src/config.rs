//! TOML configuration for the tutor engine.
//!
//! Every field has a default so an empty or missing file still yields a
//! runnable configuration; only a file that exists but fails to parse is an
//! error.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TutorConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the API key; the key itself never
    /// lives in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_embedding_endpoint")]
    pub embedding_endpoint: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Turns kept in the sliding conversation window.
    #[serde(default = "default_window_turns")]
    pub window_turns: usize,
    /// Total turns required before the proactive trigger may fire.
    #[serde(default = "default_proactive_min_turns")]
    pub proactive_min_turns: usize,
    /// How many recent user intents the trigger inspects.
    #[serde(default = "default_proactive_tail")]
    pub proactive_tail: usize,
    /// How many of those must be math questions.
    #[serde(default = "default_proactive_threshold")]
    pub proactive_threshold: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_document_pack")]
    pub document_pack: PathBuf,
    #[serde(default = "default_video_catalog")]
    pub video_catalog: PathBuf,
    /// Override for the learner profile directory; defaults to the
    /// platform data dir.
    #[serde(default)]
    pub profile_dir: Option<PathBuf>,
}

fn default_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_embedding_endpoint() -> String {
    "http://127.0.0.1:8080/embed".to_string()
}

fn default_top_k() -> usize {
    3
}

fn default_window_turns() -> usize {
    10
}

fn default_proactive_min_turns() -> usize {
    6
}

fn default_proactive_tail() -> usize {
    3
}

fn default_proactive_threshold() -> usize {
    2
}

fn default_document_pack() -> PathBuf {
    PathBuf::from("embedded_documents.json")
}

fn default_video_catalog() -> PathBuf {
    PathBuf::from("videos.json")
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            embedding_endpoint: default_embedding_endpoint(),
            top_k: default_top_k(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_turns: default_window_turns(),
            proactive_min_turns: default_proactive_min_turns(),
            proactive_tail: default_proactive_tail(),
            proactive_threshold: default_proactive_threshold(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            document_pack: default_document_pack(),
            video_catalog: default_video_catalog(),
            profile_dir: None,
        }
    }
}

impl TutorConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs_read(path)?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

fn fs_read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))
}
