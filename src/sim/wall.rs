//! Wall obstacle geometry and motion
//!
//! A wall is a quadrilateral slice of an annulus sector: two vertices on an
//! inner arc at the spawn distance, two on an outer arc one thickness
//! further out, spanning the angular sector of one arena side. Walls move
//! toward the arena center each tick and can additionally curve around it.
//!
//! Geometry is computed from the side count current at spawn time; only the
//! angular span is fixed at construction - all motion afterwards operates on
//! the four stored vertices.

use glam::Vec2;

use crate::orbit;

use super::speed::SpeedData;

/// Per-arena outer-edge distortion parameters. Zero for regular walls; a
/// level can skew the outer edge angularly and radially for non-regular
/// shapes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WallSkew {
    pub angle_left: f32,
    pub angle_right: f32,
    pub offset_left: f32,
    pub offset_right: f32,
}

/// A single wall obstacle.
pub struct Wall {
    vertices: [Vec2; 4],
    speed: SpeedData,
    curve: SpeedData,
    hue_mod: f32,
    killed: bool,
}

impl Wall {
    /// Build a wall covering `side` out of `sides` angular sectors, with its
    /// inner edge at `distance` from `center` and its outer edge one
    /// `thickness` further out (plus skew).
    ///
    /// Callers guarantee `sides >= 1` and a positive thickness; the level
    /// parameter bounds enforce that, not this constructor.
    pub fn new(
        center: Vec2,
        sides: u32,
        side: u32,
        thickness: f32,
        distance: f32,
        speed: SpeedData,
        curve: SpeedData,
        skew: WallSkew,
    ) -> Self {
        let div = std::f32::consts::TAU / sides as f32 * 0.5;
        let angle = div * 2.0 * side as f32;

        let vertices = [
            orbit(center, angle - div, distance),
            orbit(center, angle + div, distance),
            orbit(
                center,
                angle + div + skew.angle_left,
                distance + thickness + skew.offset_left,
            ),
            orbit(
                center,
                angle - div + skew.angle_right,
                distance + thickness + skew.offset_right,
            ),
        ];

        Self {
            vertices,
            speed,
            curve,
            hue_mod: 0.0,
            killed: false,
        }
    }

    /// Advance both speed values one tick. Must run before the motion calls
    /// that read them.
    pub fn update(&mut self, ft: f32) {
        self.speed.update(ft);
        self.curve.update(ft);
    }

    /// Displace every vertex toward `center` by the radial speed.
    ///
    /// A vertex inside the center box (half the arena radius per axis) stops
    /// moving and counts toward the reached-center tally; a vertex beyond
    /// 1.1x the spawn distance counts toward the out-of-bounds tally. All
    /// four in either tally kills the wall - the dual test reclaims both
    /// shrinking walls that never numerically reach the center and walls
    /// flung outward by a curve.
    pub fn move_towards_center(
        &mut self,
        center: Vec2,
        center_radius: f32,
        spawn_distance: f32,
        ft: f32,
    ) {
        let outer_bounds = spawn_distance * 1.1;
        let step = self.speed.speed * 5.0 * ft;

        let mut on_center = 0;
        let mut out_of_bounds = 0;
        for vp in &mut self.vertices {
            let dx = (vp.x - center.x).abs();
            let dy = (vp.y - center.y).abs();

            if dx < center_radius && dy < center_radius {
                on_center += 1;
                continue;
            }
            if dx > outer_bounds || dy > outer_bounds {
                out_of_bounds += 1;
            }
            *vp = move_towards(*vp, center, step);
        }

        if on_center == 4 || out_of_bounds == 4 {
            self.killed = true;
        }
    }

    /// Rotate every vertex around `center` by the curvature speed,
    /// independent of the radial motion.
    pub fn move_curve(&mut self, center: Vec2, ft: f32) {
        let angle = self.curve.speed / 60.0 * ft;
        if angle == 0.0 {
            return;
        }
        let rot = Vec2::from_angle(angle);
        for vp in &mut self.vertices {
            *vp = center + rot.rotate(*vp - center);
        }
    }

    /// Even-odd test for a point inside the wall quad
    pub fn contains_point(&self, p: Vec2) -> bool {
        let mut inside = false;
        let mut j = 3;
        for i in 0..4 {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > p.y) != (b.y > p.y)
                && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    pub fn vertices(&self) -> &[Vec2; 4] {
        &self.vertices
    }

    pub fn killed(&self) -> bool {
        self.killed
    }

    pub fn hue_mod(&self) -> f32 {
        self.hue_mod
    }

    pub fn set_hue_mod(&mut self, hue_mod: f32) {
        self.hue_mod = hue_mod;
    }
}

/// Move `p` toward `target` by `amount` without overshooting. A negative
/// amount moves away (shrinking walls).
fn move_towards(p: Vec2, target: Vec2, amount: f32) -> Vec2 {
    let delta = target - p;
    let dist = delta.length();
    if dist < f32::EPSILON {
        return p;
    }
    if amount >= dist {
        return target;
    }
    p + delta * (amount / dist)
}
