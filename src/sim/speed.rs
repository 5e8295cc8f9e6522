//! Scalar speed values with a per-tick modulation rule
//!
//! Walls carry two of these: one for radial travel, one for angular
//! curvature. Each is advanced exactly once per tick, before any geometry
//! that depends on it is moved.

/// A speed scalar plus the rule for how it changes each tick.
///
/// With `accel == 0.0` the value is constant. Otherwise `speed` drifts by
/// `accel` per frame and is clamped to `[min, max]`; with `ping_pong` set the
/// acceleration flips sign at either bound, oscillating between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedData {
    pub speed: f32,
    pub accel: f32,
    pub min: f32,
    pub max: f32,
    pub ping_pong: bool,
}

impl SpeedData {
    /// A speed that never changes
    pub const fn constant(speed: f32) -> Self {
        Self {
            speed,
            accel: 0.0,
            min: 0.0,
            max: 0.0,
            ping_pong: false,
        }
    }

    /// A speed that drifts by `accel` per frame, clamped to `[min, max]`
    pub const fn accelerating(speed: f32, accel: f32, min: f32, max: f32, ping_pong: bool) -> Self {
        Self {
            speed,
            accel,
            min,
            max,
            ping_pong,
        }
    }

    /// Advance one tick of `ft` frame units
    pub fn update(&mut self, ft: f32) {
        if self.accel == 0.0 {
            return;
        }
        self.speed += self.accel * ft;
        if self.speed > self.max {
            self.speed = self.max;
            if self.ping_pong {
                self.accel = -self.accel;
            }
        } else if self.speed < self.min {
            self.speed = self.min;
            if self.ping_pong {
                self.accel = -self.accel;
            }
        }
    }
}
