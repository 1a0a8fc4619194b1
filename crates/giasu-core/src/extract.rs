//! Structured-output extraction from free-form LLM replies.
//!
//! The model is asked for a single JSON object but routinely wraps it in
//! prose or Markdown fencing. Extraction is greedy brace matching (first `{`
//! to last `}`), isolated here with its own tests because it is brittle.
//! Parsing returns a tagged `Result`; the *caller* owns the fail-open
//! default, not this module.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no JSON object found in reply")]
    NoJson,
    #[error("invalid JSON: {0}")]
    Invalid(String),
    #[error("missing field '{0}'")]
    MissingField(&'static str),
}

/// Greedy brace match: the substring from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// The verifier's correctness judgment on a candidate answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_correct: bool,
    #[serde(default)]
    pub correction_suggestion: String,
}

impl Verdict {
    /// The fail-open verdict: verification is advisory, never a gate.
    pub fn pass() -> Self {
        Self {
            is_correct: true,
            correction_suggestion: String::new(),
        }
    }
}

/// The insight agent's reading of the recent conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightReport {
    #[serde(default)]
    pub misunderstood_concepts: Vec<String>,
    #[serde(default = "neutral_sentiment")]
    pub sentiment: String,
}

fn neutral_sentiment() -> String {
    "neutral".to_string()
}

impl InsightReport {
    /// The fail-open report: nothing found, neutral mood.
    pub fn neutral() -> Self {
        Self {
            misunderstood_concepts: Vec::new(),
            sentiment: neutral_sentiment(),
        }
    }

    /// First reported concept, the "current weakness".
    pub fn primary_weakness(&self) -> Option<&str> {
        self.misunderstood_concepts.first().map(String::as_str)
    }
}

/// Parse a verifier reply. Tolerates prose wrapping and a boolean encoded as
/// the strings "true"/"false", which small models sometimes emit.
pub fn parse_verdict(reply: &str) -> Result<Verdict, ExtractError> {
    let json = extract_json(reply).ok_or(ExtractError::NoJson)?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| ExtractError::Invalid(e.to_string()))?;

    let is_correct = match value.get("is_correct") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        _ => return Err(ExtractError::MissingField("is_correct")),
    };
    let correction_suggestion = value
        .get("correction_suggestion")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    Ok(Verdict {
        is_correct,
        correction_suggestion,
    })
}

/// Parse an insight reply. Non-string entries in the concept list are
/// dropped rather than failing the whole parse.
pub fn parse_insight(reply: &str) -> Result<InsightReport, ExtractError> {
    let json = extract_json(reply).ok_or(ExtractError::NoJson)?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| ExtractError::Invalid(e.to_string()))?;

    let misunderstood_concepts = value
        .get("misunderstood_concepts")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let sentiment = value
        .get("sentiment")
        .and_then(Value::as_str)
        .unwrap_or("neutral")
        .to_string();

    Ok(InsightReport {
        misunderstood_concepts,
        sentiment,
    })
}
