//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed conceptual tick (frame-time units, 1.0 = one 60 Hz frame)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod camera;
pub mod game;
pub mod player;
pub mod speed;
pub mod status;
pub mod timeline;
pub mod wall;

pub use camera::{Camera, CameraSet};
pub use game::{Game, GameError};
pub use player::Player;
pub use speed::SpeedData;
pub use status::{Status, TickInput};
pub use timeline::{Step, Timeline, TimelinePool};
pub use wall::Wall;
