//! Conversation turns and the bounded history window fed to every prompt.
//!
//! The window is the system's only conversational memory. Serialization to
//! prompt text lives in exactly one place (`render`) so routing logic stays
//! independently testable from formatting.

use crate::intent::IntentLabel;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single conversation turn. Append-only: the only permitted mutation is
/// backfilling `intent` once classification has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Opaque image attachment, if the student sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    pub intent: IntentLabel,
}

impl Turn {
    /// A user turn, pending classification.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            image: None,
            intent: IntentLabel::Unknown,
        }
    }

    /// An assistant turn carrying the intent it answered.
    pub fn assistant(text: impl Into<String>, intent: IntentLabel) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            image: None,
            intent,
        }
    }

    pub fn with_image(mut self, bytes: Vec<u8>) -> Self {
        self.image = Some(bytes);
        self
    }
}

/// Bounded queue of the most recent turns.
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a turn, evicting the oldest one past capacity.
    pub fn push(&mut self, turn: Turn) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Text of the most recent user turn, if any.
    pub fn last_user_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.text.as_str())
    }

    /// Backfill the intent of the most recent turn.
    pub fn backfill_last_intent(&mut self, intent: IntentLabel) {
        if let Some(turn) = self.turns.back_mut() {
            turn.intent = intent;
        }
    }

    /// Intents of the last `n` user turns, oldest first.
    pub fn user_intents_tail(&self, n: usize) -> Vec<IntentLabel> {
        let mut tail: Vec<IntentLabel> = self
            .turns
            .iter()
            .rev()
            .filter(|t| t.role == Role::User)
            .take(n)
            .map(|t| t.intent)
            .collect();
        tail.reverse();
        tail
    }

    /// The single serialization point: `role: text` lines, oldest first.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.role, t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
