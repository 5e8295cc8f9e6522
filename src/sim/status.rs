//! Per-life run state and tick input

/// Mutable state of the current life. Reset to defaults by `new_game`;
/// mutated only by the orchestrator and the death path.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    /// Seconds survived; monotonic while alive
    pub current_time: f32,
    /// Terminal death flag, write-once per life
    pub has_died: bool,
    /// Screen flash intensity, 0..=255, decays each tick
    pub flash_effect: f32,
    /// Remaining fast-spin budget in frames; > 0 while the rapid-rotation
    /// override is active
    pub fast_spin: f32,
    /// Whether difficulty increments may change the arena side count
    pub random_side_changes_enabled: bool,
    /// Run time of the last difficulty increment
    pub last_increment_time: f32,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            has_died: false,
            flash_effect: 0.0,
            fast_spin: 0.0,
            random_side_changes_enabled: true,
            last_increment_time: 0.0,
        }
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Rotate the player clockwise
    pub clockwise: bool,
    /// Rotate the player counter-clockwise
    pub counter_clockwise: bool,
    /// Focus mode - slower, more precise movement
    pub focus: bool,
}
