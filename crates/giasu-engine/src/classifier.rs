//! Intent classification with deterministic fallback.
//!
//! Tier 1 asks the model for a single-word label. Tier 2 exists because the
//! classifier is itself LLM-based and occasionally returns something outside
//! the vocabulary: a fixed Vietnamese math keyword scan of the last user
//! message forces `math_question`, anything else lands on
//! `greeting_social`. The result is total: never `Unknown`, never an error.

use crate::generation::{Generator, Part};
use crate::prompts::{self, TemplateStore};
use giasu_core::{ConversationWindow, IntentLabel};
use tracing::{debug, warn};

/// Keywords that mark a message as mathematical when the model's label is
/// unusable.
pub const MATH_KEYWORDS: [&str; 9] = [
    "giải",
    "tính",
    "phương trình",
    "bài tập",
    "toán",
    "xác suất",
    "thống kê",
    "hình học",
    "đại số",
];

/// Classify the latest user turn given the whole window.
pub async fn classify(
    window: &ConversationWindow,
    generator: &dyn Generator,
    templates: &TemplateStore,
) -> IntentLabel {
    let history = window.render();
    let reply = match templates.render(prompts::INTENT, &[("conversation_history", &history)]) {
        Ok(prompt) => generator.generate(&[Part::text(prompt)]).await,
        Err(e) => {
            warn!("intent prompt failed to render: {}", e);
            String::new()
        }
    };

    match IntentLabel::parse(&reply) {
        Some(label) => {
            debug!("classified intent: {}", label);
            label
        }
        None => {
            let label = keyword_fallback(window);
            debug!(
                "classifier reply {:?} outside vocabulary, keyword fallback: {}",
                reply.trim(),
                label
            );
            label
        }
    }
}

/// Tier-2 deterministic recovery over the most recent user message.
pub fn keyword_fallback(window: &ConversationWindow) -> IntentLabel {
    let last = window.last_user_text().unwrap_or("").to_lowercase();
    if MATH_KEYWORDS.iter().any(|k| last.contains(k)) {
        IntentLabel::MathQuestion
    } else {
        IntentLabel::GreetingSocial
    }
}
