//! Best-score store interface
//!
//! Scores are keyed by level id plus difficulty multiplier, so the same
//! level at different difficulties keeps separate bests. The on-disk format
//! belongs to the host profile system; the core only reads, compares and
//! writes through this interface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key for one level + difficulty combination
pub fn score_key(level_id: &str, difficulty_mult: f32) -> String {
    format!("{level_id}_m{difficulty_mult:.3}")
}

/// Score/profile collaborator consumed by the simulation
pub trait ScoreStore {
    /// Stored best for `key`; 0.0 when none
    fn score(&self, key: &str) -> f32;
    fn set_score(&mut self, key: &str, value: f32);
    /// Flush the profile to wherever the host persists it
    fn save_current_profile(&mut self);
}

/// Plain in-memory score table. Serializable so a host can persist it
/// however it likes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryScores {
    entries: HashMap<String, f32>,
    #[serde(skip)]
    saves: u32,
}

impl InMemoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the profile was flushed (test observability)
    pub fn save_count(&self) -> u32 {
        self.saves
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ScoreStore for InMemoryScores {
    fn score(&self, key: &str) -> f32 {
        self.entries.get(key).copied().unwrap_or(0.0)
    }

    fn set_score(&mut self, key: &str, value: f32) {
        self.entries.insert(key.to_owned(), value);
    }

    fn save_current_profile(&mut self) {
        self.saves += 1;
        log::info!("profile saved ({} scores)", self.entries.len());
    }
}
