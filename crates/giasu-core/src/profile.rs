//! Learner profile: weaknesses accumulated across sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-student record persisted by the profile store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerProfile {
    /// Every misunderstood concept ever observed, insertion order.
    pub misunderstood_concepts: Vec<String>,
    /// The concept the practice generator should target next.
    pub last_weakness: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for LearnerProfile {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            misunderstood_concepts: Vec::new(),
            last_weakness: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl LearnerProfile {
    /// Merge newly observed concepts: order-preserving set union, no
    /// duplicates. Returns the first concept that was not already present.
    pub fn merge_concepts(&mut self, new: &[String]) -> Option<String> {
        let mut first_new = None;
        for concept in new {
            if !self.misunderstood_concepts.iter().any(|c| c == concept) {
                if first_new.is_none() {
                    first_new = Some(concept.clone());
                }
                self.misunderstood_concepts.push(concept.clone());
            }
        }
        self.updated_at = Utc::now();
        first_new
    }
}
