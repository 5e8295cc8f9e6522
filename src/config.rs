//! Game configuration
//!
//! One explicit struct threaded through `Game::new` instead of process-wide
//! globals, so two independent simulations with different configs can live
//! in the same test process.

use serde::{Deserialize, Serialize};

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Distance from the arena center at which walls spawn
    pub spawn_distance: f32,
    /// Radius of the central polygon; half of it is the per-axis
    /// center-proximity band that reclaims incoming walls
    pub arena_radius: f32,
    /// Player orbit radius
    pub player_radius: f32,
    /// Player angular speed, radians per frame
    pub player_speed: f32,
    /// Player angular speed while focused
    pub player_focus_speed: f32,
    /// Camera zoom applied on `new_game`
    pub zoom_factor: f32,
    /// Death becomes a no-op
    pub invincible: bool,
    /// Multiplier applied to incoming frame time
    pub timescale: f32,

    // === Wall shape ===
    /// Angular skew of the outer wall edge, left vertex (radians)
    pub wall_angle_left: f32,
    /// Angular skew of the outer wall edge, right vertex (radians)
    pub wall_angle_right: f32,
    /// Radial offset of the outer wall edge, left vertex
    pub wall_skew_left: f32,
    /// Radial offset of the outer wall edge, right vertex
    pub wall_skew_right: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_distance: 1600.0,
            arena_radius: 75.0,
            player_radius: 91.0,
            player_speed: 0.165,
            player_focus_speed: 0.092,
            zoom_factor: 1.0,
            invincible: false,
            timescale: 1.0,

            wall_angle_left: 0.0,
            wall_angle_right: 0.0,
            wall_skew_left: 0.0,
            wall_skew_right: 0.0,
        }
    }
}

impl GameConfig {
    /// Per-axis distance under which a wall vertex counts as having reached
    /// the center
    pub fn center_radius(&self) -> f32 {
        self.arena_radius * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_json() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.spawn_distance, config.spawn_distance);
        assert_eq!(back.invincible, config.invincible);
    }
}
