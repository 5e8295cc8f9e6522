//! The player cursor
//!
//! A point orbiting the arena center at a fixed radius, steered left/right
//! by input. Death happens when the point ends a tick inside a wall quad;
//! that test lives in the game orchestrator, which owns the wall set.

use glam::Vec2;

use crate::config::GameConfig;
use crate::orbit;

use super::status::TickInput;

/// The single player entity
#[derive(Debug, Clone)]
pub struct Player {
    /// Current angle around the arena center (radians)
    pub angle: f32,
    /// Angular speed, radians per frame
    speed: f32,
    /// Angular speed while focused
    focus_speed: f32,
    /// Orbit radius from the arena center
    radius: f32,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            angle: std::f32::consts::FRAC_PI_2,
            speed: config.player_speed,
            focus_speed: config.player_focus_speed,
            radius: config.player_radius,
        }
    }

    /// Steer one tick of input
    pub fn update(&mut self, input: &TickInput, ft: f32) {
        let speed = if input.focus {
            self.focus_speed
        } else {
            self.speed
        };
        if input.clockwise {
            self.angle -= speed * ft;
        }
        if input.counter_clockwise {
            self.angle += speed * ft;
        }
        self.angle = crate::normalize_angle(self.angle);
    }

    /// Cartesian position relative to the arena center
    pub fn position(&self, center: Vec2) -> Vec2 {
        orbit(center, self.angle, self.radius)
    }
}
