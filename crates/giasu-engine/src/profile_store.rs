//! Learner profile persistence.
//!
//! The orchestrator only needs get-or-create and upsert; both backends
//! create a default profile on first read so callers never special-case a
//! missing learner.

use anyhow::Context;
use giasu_core::profile::LearnerProfile;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

pub trait ProfileStore: Send + Sync {
    /// Fetch the profile for `user_id`, creating a default one if absent.
    fn get(&self, user_id: &str) -> anyhow::Result<LearnerProfile>;

    fn upsert(&self, user_id: &str, profile: &LearnerProfile) -> anyhow::Result<()>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, LearnerProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, user_id: &str) -> anyhow::Result<LearnerProfile> {
        let mut profiles = self
            .profiles
            .lock()
            .map_err(|_| anyhow::anyhow!("profile map poisoned"))?;
        Ok(profiles.entry(user_id.to_string()).or_default().clone())
    }

    fn upsert(&self, user_id: &str, profile: &LearnerProfile) -> anyhow::Result<()> {
        let mut profiles = self
            .profiles
            .lock()
            .map_err(|_| anyhow::anyhow!("profile map poisoned"))?;
        profiles.insert(user_id.to_string(), profile.clone());
        Ok(())
    }
}

/// One JSON file per learner under a data directory.
pub struct JsonProfileStore {
    dir: PathBuf,
}

impl JsonProfileStore {
    pub fn new(dir: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating profile directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        // User ids come from the session layer; strip separators anyway.
        let safe: String = user_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl ProfileStore for JsonProfileStore {
    fn get(&self, user_id: &str) -> anyhow::Result<LearnerProfile> {
        let path = self.path_for(user_id);
        if !path.exists() {
            let profile = LearnerProfile::default();
            self.upsert(user_id, &profile)?;
            debug!("created profile for {}", user_id);
            return Ok(profile);
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading profile {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing profile {}", path.display()))
    }

    fn upsert(&self, user_id: &str, profile: &LearnerProfile) -> anyhow::Result<()> {
        let path = self.path_for(user_id);
        let raw = serde_json::to_string_pretty(profile)?;
        fs::write(&path, raw).with_context(|| format!("writing profile {}", path.display()))
    }
}
