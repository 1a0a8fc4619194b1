//! Verifier agent: second-opinion check over a drafted answer.
//!
//! The verdict fails open. A verifier that cannot run, or that returns
//! something unparseable, must never block an answer the informer already
//! produced, so every failure path collapses to a passing verdict with a
//! warning in the log.

use crate::generation::{Generator, Part};
use crate::prompts::{self, TemplateStore};
use giasu_core::extract::{extract_json, parse_verdict};
use giasu_core::Verdict;
use tracing::{debug, warn};

/// Check a drafted answer against the original question.
pub async fn verify(
    query: &str,
    candidate: &str,
    generator: &dyn Generator,
    templates: &TemplateStore,
) -> Verdict {
    let prompt = match templates.render(
        prompts::VERIFIER,
        &[("query", query), ("informer_answer", candidate)],
    ) {
        Ok(p) => p,
        Err(e) => {
            warn!("verifier prompt failed to render, passing answer: {}", e);
            return Verdict::pass();
        }
    };

    let reply = generator.generate(&[Part::text(prompt)]).await;

    let Some(raw) = extract_json(&reply) else {
        warn!("verifier reply held no JSON object, passing answer");
        return Verdict::pass();
    };

    match parse_verdict(raw) {
        Ok(verdict) => {
            debug!("verdict: is_correct={}", verdict.is_correct);
            verdict
        }
        Err(e) => {
            warn!("verifier verdict unparseable ({}), passing answer", e);
            Verdict::pass()
        }
    }
}
