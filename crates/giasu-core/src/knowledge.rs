//! Read-only knowledge documents and the in-memory embedding index.
//!
//! The index is populated once at startup from a pre-embedded document pack
//! and shared immutably after that. Ranking is cosine similarity,
//! descending; ties keep insertion order.

use crate::error::TutorError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A grounding passage from the textbook corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDoc {
    pub content: String,
    /// Precomputed by the offline embedding job; documents without one are
    /// never retrieved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// In-memory document index, immutable after construction.
#[derive(Debug, Default)]
pub struct DocumentIndex {
    docs: Vec<KnowledgeDoc>,
}

impl DocumentIndex {
    pub fn new(docs: Vec<KnowledgeDoc>) -> Self {
        Self { docs }
    }

    /// Load a JSON document pack produced by the offline embedding job.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TutorError> {
        let text = fs::read_to_string(path)?;
        let docs: Vec<KnowledgeDoc> = serde_json::from_str(&text)?;
        Ok(Self::new(docs))
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Top-`k` documents by cosine similarity to `query`, best first.
    pub fn retrieve(&self, query: &[f32], k: usize) -> Vec<&KnowledgeDoc> {
        let mut scored: Vec<(f32, &KnowledgeDoc)> = self
            .docs
            .iter()
            .filter_map(|doc| {
                let embedding = doc.embedding.as_deref()?;
                Some((cosine(query, embedding), doc))
            })
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(k).map(|(_, doc)| doc).collect()
    }
}

/// Cosine similarity; 0.0 on dimension mismatch or zero-norm input.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
