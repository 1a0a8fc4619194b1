//! Generation client: the single LLM call primitive every agent uses.
//!
//! The contract is deliberately infallible: generation failure is a normal,
//! recoverable event in this system, so any transport, quota, or
//! content-filter problem is logged and replaced by a fixed apology string
//! the student can read. No retries at this layer.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// User-visible fallback when the model cannot be reached.
pub const APOLOGY: &str = "Xin lỗi, đã có lỗi xảy ra khi kết nối với mô hình AI.";

/// One piece of a multimodal prompt.
#[derive(Debug, Clone)]
pub enum Part {
    Text(String),
    Image { mime: String, data: Vec<u8> },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn image(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Image {
            mime: mime.into(),
            data,
        }
    }
}

/// The one generation primitive. Implementations must never fail: they
/// return [`APOLOGY`] instead of propagating errors.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, parts: &[Part]) -> String;
}

/// Gemini API client over HTTPS.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    async fn call(&self, parts: &[Part]) -> anyhow::Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );

        let wire_parts: Vec<Value> = parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => json!({ "text": text }),
                Part::Image { mime, data } => json!({
                    "inline_data": { "mime_type": mime, "data": BASE64.encode(data) }
                }),
            })
            .collect();

        let body = json!({
            "contents": [{ "parts": wire_parts }],
            "generationConfig": {
                // Low temperature: answers must track the prompt, not improvise.
                "temperature": 0.1,
                "maxOutputTokens": 1024
            }
        });

        debug!("[>] generation call, {} part(s)", parts.len());

        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("generation API returned {}: {}", status, error_text);
        }

        let reply: Value = response.json().await?;
        let text = reply
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            // Safety filtering gives us no reason, only an empty candidate list.
            anyhow::bail!("generation API returned no text candidates");
        }

        debug!("[<] generation reply, {} chars", text.len());
        Ok(text)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, parts: &[Part]) -> String {
        match self.call(parts).await {
            Ok(text) => text,
            Err(e) => {
                warn!("generation failed, returning apology: {:#}", e);
                APOLOGY.to_string()
            }
        }
    }
}
