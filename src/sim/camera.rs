//! Camera pair and shake effects
//!
//! Two cameras: the background camera rotates with the arena, the overlay
//! camera stays fixed for HUD-level output. Shake runs on the effect
//! timeline pool - a short sequence of randomized offset steps with a reset
//! at the end, advanced once per tick alongside everything else.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::timeline::TimelinePool;

/// Shake duration in frames; offset amplitude ramps down over the sequence
const SHAKE_FRAMES: u32 = 7;
const SHAKE_AMPLITUDE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Shake displacement from the nominal center
    pub center_offset: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center_offset: Vec2::ZERO,
            rotation: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn rotate(&mut self, delta: f32) {
        self.rotation = crate::normalize_angle(self.rotation + delta);
    }

    pub fn reset(&mut self, zoom: f32) {
        self.center_offset = Vec2::ZERO;
        self.rotation = 0.0;
        self.zoom = zoom;
    }
}

/// Which camera an effect step targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraId {
    Background,
    Overlay,
}

/// The simulation's camera pair - the context effect timelines run against
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraSet {
    pub background: Camera,
    pub overlay: Camera,
}

impl CameraSet {
    pub fn get_mut(&mut self, id: CameraId) -> &mut Camera {
        match id {
            CameraId::Background => &mut self.background,
            CameraId::Overlay => &mut self.overlay,
        }
    }
}

/// Schedule a camera shake on the effect pool: one randomized offset per
/// frame with decaying amplitude, then a reset. Offsets are drawn up front
/// so the steps themselves stay deterministic.
pub fn shake_camera(pool: &mut TimelinePool<CameraSet>, id: CameraId, rng: &mut Pcg32) {
    let tl = pool.acquire();
    for i in (1..=SHAKE_FRAMES).rev() {
        let amp = SHAKE_AMPLITUDE * i as f32;
        let offset = Vec2::new(
            rng.random_range(-amp..=amp),
            rng.random_range(-amp..=amp),
        );
        tl.append_do(move |cams: &mut CameraSet, _| cams.get_mut(id).center_offset = offset);
        tl.append_wait(1.0);
    }
    tl.append_do(move |cams: &mut CameraSet, _| cams.get_mut(id).center_offset = Vec2::ZERO);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_shake_runs_and_resets() {
        let mut pool = TimelinePool::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut cams = CameraSet::default();

        shake_camera(&mut pool, CameraId::Overlay, &mut rng);
        assert_eq!(pool.len(), 1);

        let mut displaced = false;
        for _ in 0..SHAKE_FRAMES {
            pool.advance_all(&mut cams, 1.0);
            displaced |= cams.overlay.center_offset != Vec2::ZERO;
            // only the target camera moves
            assert_eq!(cams.background.center_offset, Vec2::ZERO);
        }
        assert!(displaced);

        pool.advance_all(&mut cams, 1.0);
        assert_eq!(cams.overlay.center_offset, Vec2::ZERO);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_concurrent_shakes_are_independent() {
        let mut pool = TimelinePool::new();
        let mut rng = Pcg32::seed_from_u64(99);
        let mut cams = CameraSet::default();

        shake_camera(&mut pool, CameraId::Background, &mut rng);
        shake_camera(&mut pool, CameraId::Overlay, &mut rng);
        assert_eq!(pool.len(), 2);

        pool.advance_all(&mut cams, 1.0);
        // both first offsets applied in the same tick
        assert!(cams.background.center_offset != Vec2::ZERO);
        assert!(cams.overlay.center_offset != Vec2::ZERO);
    }

    #[test]
    fn test_camera_reset() {
        let mut cam = Camera::default();
        cam.rotate(1.0);
        cam.center_offset = Vec2::new(3.0, 4.0);
        cam.reset(0.8);
        assert_eq!(cam.rotation, 0.0);
        assert_eq!(cam.center_offset, Vec2::ZERO);
        assert_eq!(cam.zoom, 0.8);
    }
}
