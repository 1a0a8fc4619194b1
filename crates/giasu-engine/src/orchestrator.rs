//! Turn orchestration: classify, route, answer, and decide whether to
//! volunteer a practice follow-up.
//!
//! One engine instance owns one student's session. Routing is exhaustive
//! over the intent vocabulary and deterministic for a given classification:
//! math questions (and any turn with an image) run informer then verifier,
//! practice requests run the practice generator, the three communicative
//! intents each render their own template, and off-topic turns are
//! redirected.

use crate::classifier;
use crate::config::SessionConfig;
use crate::generation::{Generator, Part};
use crate::informer;
use crate::insight;
use crate::practice;
use crate::profile_store::ProfileStore;
use crate::prompts::{self, TemplateStore};
use crate::retrieval::Retriever;
use crate::verifier;
use giasu_core::videos::VideoCatalog;
use giasu_core::{ConversationWindow, IntentLabel, Turn};
use tracing::{debug, info, warn};

const COMMUNICATE_APOLOGY: &str =
    "Rất xin lỗi, tôi đang gặp một chút sự cố. Bạn có thể hỏi lại sau được không?";

/// Everything the engine needs that outlives a session.
pub struct Resources {
    pub generator: Box<dyn Generator>,
    pub retriever: Retriever,
    pub templates: TemplateStore,
    pub catalog: VideoCatalog,
    pub profiles: Box<dyn ProfileStore>,
}

/// What one student turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub intent: IntentLabel,
    pub reply: String,
    /// Proactive practice suggestion, when the trigger fired.
    pub followup: Option<String>,
}

/// Per-student session driver.
pub struct TutorEngine {
    resources: Resources,
    session: SessionConfig,
    window: ConversationWindow,
    user_id: String,
}

impl TutorEngine {
    pub fn new(resources: Resources, session: SessionConfig, user_id: impl Into<String>) -> Self {
        let window = ConversationWindow::new(session.window_turns);
        Self {
            resources,
            session,
            window,
            user_id: user_id.into(),
        }
    }

    pub fn window(&self) -> &ConversationWindow {
        &self.window
    }

    /// Run one full turn: record the message, classify it, produce a reply,
    /// and possibly a proactive follow-up.
    pub async fn respond(&mut self, text: &str, image: Option<Vec<u8>>) -> TurnOutcome {
        let mut turn = Turn::user(text);
        if let Some(bytes) = image.clone() {
            turn = turn.with_image(bytes);
        }
        self.window.push(turn);

        let intent = classifier::classify(
            &self.window,
            self.resources.generator.as_ref(),
            &self.resources.templates,
        )
        .await;
        self.window.backfill_last_intent(intent);
        info!("turn classified as {}", intent);

        let reply = self.route(intent, text, image.as_deref()).await;
        self.window.push(Turn::assistant(reply.clone(), intent));

        let followup = self.maybe_proactive().await;
        if let Some(ref f) = followup {
            self.window
                .push(Turn::assistant(f.clone(), IntentLabel::Unknown));
        }

        TurnOutcome {
            intent,
            reply,
            followup,
        }
    }

    async fn route(&self, intent: IntentLabel, text: &str, image: Option<&[u8]>) -> String {
        // An attached image is always a problem to solve, whatever the
        // classifier said about the accompanying text.
        if image.is_some() {
            return self.solve(text, image).await;
        }
        match intent {
            IntentLabel::MathQuestion => self.solve(text, None).await,
            IntentLabel::RequestForPractice => self.practice_on_request().await,
            IntentLabel::GreetingSocial => self.communicate(prompts::GREETING).await,
            IntentLabel::ExpressionOfStress => self.communicate(prompts::STRESS).await,
            IntentLabel::StudySupport => self.communicate(prompts::SUPPORT).await,
            IntentLabel::OffTopic | IntentLabel::Unknown => {
                self.communicate(prompts::OFF_TOPIC).await
            }
        }
    }

    /// Informer draft, then verifier check. A failed verdict replaces the
    /// draft with a hedge carrying the verifier's correction.
    async fn solve(&self, text: &str, image: Option<&[u8]>) -> String {
        let draft = informer::answer(
            text,
            image,
            &self.window,
            &self.resources.retriever,
            self.resources.generator.as_ref(),
            &self.resources.templates,
        )
        .await;

        let verdict = verifier::verify(
            text,
            &draft,
            self.resources.generator.as_ref(),
            &self.resources.templates,
        )
        .await;

        if verdict.is_correct {
            draft
        } else {
            warn!("draft rejected by verifier, hedging");
            format!(
                "🔍 Tôi đã xem xét lại và thấy có một chút chưa chính xác. {} \
                 Tôi sẽ cần tìm hiểu thêm về vấn đề này để có câu trả lời tốt hơn.",
                verdict.correction_suggestion
            )
        }
    }

    /// Direct practice request: let the insight agent read the window for a
    /// weakness to target, or fall back to a general grade-9 topic.
    async fn practice_on_request(&self) -> String {
        let report = insight::analyze(
            &self.window,
            self.resources.generator.as_ref(),
            &self.resources.templates,
        )
        .await;
        let weakness = report
            .primary_weakness()
            .unwrap_or(practice::FALLBACK_TOPIC);

        practice::generate_practice(
            weakness,
            &self.resources.catalog,
            self.resources.generator.as_ref(),
            &self.resources.templates,
        )
        .await
    }

    async fn communicate(&self, template: &str) -> String {
        let history = self.window.render();
        let prompt = match self.resources.templates.render(
            template,
            &[
                ("master_prompt", prompts::MASTER_PROMPT),
                ("conversation_history", history.as_str()),
            ],
        ) {
            Ok(p) => p,
            Err(e) => {
                warn!("template '{}' failed to render: {}", template, e);
                return COMMUNICATE_APOLOGY.to_string();
            }
        };
        self.resources.generator.generate(&[Part::text(prompt)]).await
    }

    /// Decide whether to volunteer insight + practice after this turn.
    ///
    /// Fires when the window holds enough turns and most of the recent user
    /// intents were math questions; any failure along the pipeline drops
    /// the follow-up silently.
    async fn maybe_proactive(&self) -> Option<String> {
        if self.window.len() < self.session.proactive_min_turns {
            return None;
        }
        let tail = self.window.user_intents_tail(self.session.proactive_tail);
        if tail.len() < self.session.proactive_tail {
            return None;
        }
        let math_turns = tail
            .iter()
            .filter(|i| **i == IntentLabel::MathQuestion)
            .count();
        if math_turns < self.session.proactive_threshold {
            return None;
        }
        debug!(
            "proactive trigger fired ({}/{} math turns)",
            math_turns,
            tail.len()
        );

        let report = insight::analyze(
            &self.window,
            self.resources.generator.as_ref(),
            &self.resources.templates,
        )
        .await;
        if report.misunderstood_concepts.is_empty() {
            debug!("insight found no weakness, skipping follow-up");
            return None;
        }

        let mut profile = match self.resources.profiles.get(&self.user_id) {
            Ok(p) => p,
            Err(e) => {
                warn!("profile read failed, skipping follow-up: {:#}", e);
                return None;
            }
        };
        let newly_added = profile.merge_concepts(&report.misunderstood_concepts);
        let weakness = newly_added
            .or_else(|| profile.last_weakness.clone())
            .unwrap_or_else(|| report.misunderstood_concepts[0].clone());
        profile.last_weakness = Some(weakness.clone());
        if let Err(e) = self.resources.profiles.upsert(&self.user_id, &profile) {
            warn!("profile write failed: {:#}", e);
        }

        let exercises = practice::generate_practice(
            &weakness,
            &self.resources.catalog,
            self.resources.generator.as_ref(),
            &self.resources.templates,
        )
        .await;

        Some(format!(
            "💡 **Phân tích nhanh:** Dựa trên các câu hỏi vừa rồi, tôi nhận thấy bạn \
             có thể cần luyện tập thêm về chủ đề **'{}'**. Đây là một số gợi ý cho bạn:\n\n{}",
            weakness, exercises
        ))
    }
}
