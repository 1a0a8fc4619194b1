//! User-intent vocabulary driving turn routing.
//!
//! The classifier is LLM-based and therefore unreliable; this enum is the
//! closed set every classification must be coerced into. Adding a label is a
//! compile-time-checked change because the orchestrator matches exhaustively.

use serde::{Deserialize, Serialize};

/// Classified purpose of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    /// Greetings, thanks, goodbyes, small talk.
    GreetingSocial,
    /// Anything touching mathematical content: solving, definitions, formulas.
    MathQuestion,
    /// The student asks for exercises to practice on.
    RequestForPractice,
    /// Stress, fatigue, discouragement about studying.
    ExpressionOfStress,
    /// Questions about study methods, motivation, how to improve.
    StudySupport,
    /// Completely unrelated to studying.
    OffTopic,
    /// Placeholder until classification has run. The classifier never
    /// returns this.
    Unknown,
}

impl IntentLabel {
    /// Labels the classifier is allowed to produce.
    pub const CLASSIFIABLE: [IntentLabel; 6] = [
        IntentLabel::GreetingSocial,
        IntentLabel::MathQuestion,
        IntentLabel::RequestForPractice,
        IntentLabel::ExpressionOfStress,
        IntentLabel::StudySupport,
        IntentLabel::OffTopic,
    ];

    /// Parse a raw single-word model reply. Trims and lowercases first.
    /// `unknown` is deliberately not accepted here: an LLM answering
    /// "unknown" goes through the keyword fallback like any garbage reply.
    pub fn parse(reply: &str) -> Option<Self> {
        match reply.trim().to_lowercase().as_str() {
            "greeting_social" => Some(Self::GreetingSocial),
            "math_question" => Some(Self::MathQuestion),
            "request_for_practice" => Some(Self::RequestForPractice),
            "expression_of_stress" => Some(Self::ExpressionOfStress),
            "study_support" => Some(Self::StudySupport),
            "off_topic" => Some(Self::OffTopic),
            _ => None,
        }
    }
}

impl std::fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::GreetingSocial => "greeting_social",
            Self::MathQuestion => "math_question",
            Self::RequestForPractice => "request_for_practice",
            Self::ExpressionOfStress => "expression_of_stress",
            Self::StudySupport => "study_support",
            Self::OffTopic => "off_topic",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_all_classifiable_labels() {
        for label in IntentLabel::CLASSIFIABLE {
            assert_eq!(IntentLabel::parse(&label.to_string()), Some(label));
        }
    }

    #[test]
    fn parse_is_lenient_about_case_and_whitespace() {
        assert_eq!(
            IntentLabel::parse("  Math_Question \n"),
            Some(IntentLabel::MathQuestion)
        );
    }

    #[test]
    fn parse_rejects_unknown_and_garbage() {
        assert_eq!(IntentLabel::parse("unknown"), None);
        assert_eq!(IntentLabel::parse("math question"), None);
        assert_eq!(IntentLabel::parse(""), None);
        assert_eq!(IntentLabel::parse("Xin lỗi, đã có lỗi xảy ra."), None);
    }
}
