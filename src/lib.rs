//! Hexrush - simulation core for a rotating-polygon arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (timelines, walls, difficulty orchestration)
//! - `level`: Level definitions and the level store interface
//! - `scripting`: Embedded Lua level scripts behind a capability interface
//! - `audio` / `scores`: Narrow collaborator interfaces (sound, best scores)
//! - `config`: Explicit configuration threaded through constructors

pub mod audio;
pub mod config;
pub mod level;
pub mod scores;
pub mod scripting;
pub mod sim;

pub use config::GameConfig;
pub use level::{InMemoryLevelStore, LevelData, LevelStore};
pub use sim::{Game, TickInput};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// One simulated frame at the reference 60 Hz rate. `Game::update` takes
    /// frame time in these units (1.0 = one frame).
    pub const FRAME_UNIT_SECS: f32 = 1.0 / 60.0;

    /// Base radial speed walls are spawned with, before the level's speed
    /// multiplier is applied.
    pub const WALL_BASE_SPEED: f32 = 1.0;

    /// Per-frame flash decay (flash is set to 255 on death)
    pub const FLASH_DECAY: f32 = 3.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Point at `radius` along `angle` from `center`
#[inline]
pub fn orbit(center: Vec2, angle: f32, radius: f32) -> Vec2 {
    center + polar_to_cartesian(radius, angle)
}

/// Hermite smoother-step between two edges, clamped to [0, 1]
#[inline]
pub fn smoother_step(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}
