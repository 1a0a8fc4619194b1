//! giasu-engine — multi-agent orchestration for the giasu math tutor.
//!
//! One user turn flows through: intent classification → routing → either
//! the informer/verifier pipeline, the insight/practice pipeline, or a
//! direct communicative reply → an optional proactive practice follow-up.
//! Every external failure degrades to a defined fallback; no turn is ever
//! terminated by an error.

pub mod classifier;
pub mod config;
pub mod generation;
pub mod informer;
pub mod insight;
pub mod orchestrator;
pub mod practice;
pub mod profile_store;
pub mod prompts;
pub mod retrieval;
pub mod verifier;

pub use orchestrator::{Resources, TurnOutcome, TutorEngine};
