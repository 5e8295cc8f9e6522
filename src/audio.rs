//! Audio collaborator interface
//!
//! The core only emits one-way playback requests; mixing, volume and asset
//! handling belong to the host.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// Level start
    Go,
    /// Message shown
    Beep,
    /// Difficulty increment
    LevelUp,
    /// Player death
    Death,
    /// Run over
    GameOver,
}

/// One-way audio sink consumed by the simulation
pub trait AudioSink {
    fn play_sound(&mut self, sound: Sound);
    fn play_level_music(&mut self);
    fn stop_level_music(&mut self);
    fn stop_all_sounds(&mut self);
}

/// Sink that drops everything; used headless and in tests
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sound(&mut self, sound: Sound) {
        log::trace!("sound: {:?}", sound);
    }

    fn play_level_music(&mut self) {}

    fn stop_level_music(&mut self) {}

    fn stop_all_sounds(&mut self) {}
}
