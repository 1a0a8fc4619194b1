//! Embedding and document retrieval.
//!
//! The index itself lives in `giasu-core`; this module adds the embedding
//! seam and the degradation policy: any embedding or lookup failure yields
//! an empty document list, and the informer answers ungrounded.

use async_trait::async_trait;
use giasu_core::knowledge::{DocumentIndex, KnowledgeDoc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Turns query text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Client for an embedding endpoint serving the Vietnamese bi-encoder.
/// Expects `POST { "text": ... }` returning `{ "embedding": [...] }`.
pub struct HttpEmbedder {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpEmbedder {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "text": text }))
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("embedding endpoint returned {}", response.status());
        }
        let body: Value = response.json().await?;
        let vector = body
            .get("embedding")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_f64)
                    .map(|f| f as f32)
                    .collect::<Vec<f32>>()
            })
            .unwrap_or_default();
        if vector.is_empty() {
            anyhow::bail!("embedding endpoint returned no vector");
        }
        Ok(vector)
    }
}

/// Embeds a query and looks up the top-k grounding documents.
pub struct Retriever {
    index: Arc<DocumentIndex>,
    embedder: Box<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    pub fn new(index: Arc<DocumentIndex>, embedder: Box<dyn Embedder>, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }

    /// Top-k documents for `query`; empty on any failure.
    pub async fn retrieve(&self, query: &str) -> Vec<KnowledgeDoc> {
        let vector = match self.embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!("embedding failed, answering without grounding: {:#}", e);
                return Vec::new();
            }
        };
        self.index
            .retrieve(&vector, self.top_k)
            .into_iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            anyhow::bail!("endpoint down")
        }
    }

    fn index() -> Arc<DocumentIndex> {
        Arc::new(DocumentIndex::new(vec![
            KnowledgeDoc {
                content: "căn bậc hai".to_string(),
                embedding: Some(vec![1.0, 0.0]),
            },
            KnowledgeDoc {
                content: "đường tròn".to_string(),
                embedding: Some(vec![0.0, 1.0]),
            },
        ]))
    }

    #[tokio::test]
    async fn retrieves_best_matching_documents() {
        let retriever = Retriever::new(index(), Box::new(FixedEmbedder(vec![1.0, 0.1])), 1);
        let docs = retriever.retrieve("căn bậc hai là gì").await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "căn bậc hai");
    }

    #[tokio::test]
    async fn embedding_failure_degrades_to_empty_context() {
        let retriever = Retriever::new(index(), Box::new(BrokenEmbedder), 3);
        assert!(retriever.retrieve("bất kỳ").await.is_empty());
    }
}
