//! Shared types and pure logic for the giasu tutoring engine.
//!
//! Everything in this crate is deterministic and network-free: the intent
//! vocabulary, conversation turns, JSON extraction from model replies, the
//! learner profile, and the read-only knowledge/video reference data.

pub mod error;
pub mod extract;
pub mod intent;
pub mod knowledge;
pub mod profile;
pub mod transcript;
pub mod videos;

pub use error::TutorError;
pub use extract::{InsightReport, Verdict};
pub use intent::IntentLabel;
pub use transcript::{ConversationWindow, Role, Turn};
