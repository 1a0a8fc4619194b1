//! Insight agent: weakness extraction over the conversation window.
//!
//! Runs only when the proactive trigger fires, so a failure here simply
//! means no follow-up this turn. Every failure path returns the neutral
//! report.

use crate::generation::{Generator, Part};
use crate::prompts::{self, TemplateStore};
use giasu_core::extract::{extract_json, parse_insight};
use giasu_core::{ConversationWindow, InsightReport};
use tracing::{debug, warn};

/// Analyze the window for misunderstood concepts and overall sentiment.
pub async fn analyze(
    window: &ConversationWindow,
    generator: &dyn Generator,
    templates: &TemplateStore,
) -> InsightReport {
    let history = window.render();
    let prompt = match templates.render(prompts::INSIGHT, &[("conversation_history", &history)]) {
        Ok(p) => p,
        Err(e) => {
            warn!("insight prompt failed to render: {}", e);
            return InsightReport::neutral();
        }
    };

    let reply = generator.generate(&[Part::text(prompt)]).await;

    let Some(raw) = extract_json(&reply) else {
        warn!("insight reply held no JSON object");
        return InsightReport::neutral();
    };

    match parse_insight(raw) {
        Ok(report) => {
            debug!(
                "insight: {} concept(s), sentiment {}",
                report.misunderstood_concepts.len(),
                report.sentiment
            );
            report
        }
        Err(e) => {
            warn!("insight report unparseable: {}", e);
            InsightReport::neutral()
        }
    }
}
