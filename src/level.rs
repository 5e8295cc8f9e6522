//! Level definitions and the level store interface
//!
//! A `LevelData` is the immutable description of one level: side-count
//! bounds, rotation and multiplier baselines plus their per-increment
//! deltas, and the id of the script that drives its patterns. Live values
//! derived from these (current sides, current multipliers) belong to the
//! running `Game`, never to the definition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parameters of a single level. Read-only from the orchestrator's
/// perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelData {
    pub id: String,
    pub name: String,
    /// Side count at level start
    pub sides: u32,
    /// Inclusive bounds for side counts chosen on difficulty increments
    pub sides_min: u32,
    pub sides_max: u32,
    pub rotation_speed: f32,
    pub rotation_speed_increment: f32,
    /// Magnitude clamp applied once any fast-spin budget is spent
    pub rotation_speed_max: f32,
    pub speed_multiplier: f32,
    pub speed_increment: f32,
    pub delay_multiplier: f32,
    pub delay_increment: f32,
    /// Fast-spin budget armed on each difficulty increment (frames)
    pub fast_spin: f32,
    /// Seconds of run time between difficulty increments; <= 0 disables the
    /// periodic trigger
    pub increment_time: f32,
    /// Id of the Lua script controlling this level
    pub script_file_id: String,
}

impl Default for LevelData {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            sides: 6,
            sides_min: 5,
            sides_max: 7,
            rotation_speed: 0.2,
            rotation_speed_increment: 0.025,
            rotation_speed_max: 0.8,
            speed_multiplier: 1.0,
            speed_increment: 0.1,
            delay_multiplier: 1.0,
            delay_increment: 0.0,
            fast_spin: 70.0,
            increment_time: 15.0,
            script_file_id: String::new(),
        }
    }
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Where level definitions and their scripts come from
pub trait LevelStore {
    fn level_data(&self, id: &str) -> Option<&LevelData>;
    fn script_source(&self, file_id: &str) -> Option<&str>;
}

/// Level store backed by plain maps; the host fills it from whatever asset
/// pipeline it has.
#[derive(Debug, Default)]
pub struct InMemoryLevelStore {
    levels: HashMap<String, LevelData>,
    scripts: HashMap<String, String>,
}

impl InMemoryLevelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_level(&mut self, level: LevelData) {
        self.levels.insert(level.id.clone(), level);
    }

    pub fn insert_script(&mut self, file_id: impl Into<String>, source: impl Into<String>) {
        self.scripts.insert(file_id.into(), source.into());
    }
}

impl LevelStore for InMemoryLevelStore {
    fn level_data(&self, id: &str) -> Option<&LevelData> {
        self.levels.get(id)
    }

    fn script_source(&self, file_id: &str) -> Option<&str> {
        self.scripts.get(file_id).map(String::as_str)
    }
}
