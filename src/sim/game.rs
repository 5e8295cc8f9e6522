//! Game orchestration
//!
//! Owns the entity set, the timelines, and the per-life state, and drives
//! one simulation tick per `update` call. Tick order: main timeline (due
//! steps execute, possibly re-entering the scheduler through script
//! requests), then wall motion, then termination checks, then the ambient
//! pieces (rotation, flash decay, message timeline, effect pool).
//!
//! Frame time is in 60 Hz frame units: `ft = 1.0` is one frame. The host
//! passes elapsed frame time; the configured timescale is applied here.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::{AudioSink, Sound};
use crate::config::GameConfig;
use crate::consts::{FLASH_DECAY, FRAME_UNIT_SECS, WALL_BASE_SPEED};
use crate::level::{LevelData, LevelStore};
use crate::scores::{ScoreStore, score_key};
use crate::scripting::{ScriptEnv, ScriptError, ScriptRequest, ScriptView};

use super::camera::{CameraId, CameraSet, shake_camera};
use super::player::Player;
use super::speed::SpeedData;
use super::status::{Status, TickInput};
use super::timeline::{Timeline, TimelinePool};
use super::wall::{Wall, WallSkew};

/// Errors surfaced to the host from `new_game`. Nothing else crosses the
/// host boundary; recoverable conditions are absorbed with logging.
#[derive(Debug)]
pub enum GameError {
    UnknownLevel(String),
    MissingScript(String),
    Script(ScriptError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::UnknownLevel(id) => write!(f, "unknown level '{id}'"),
            GameError::MissingScript(id) => write!(f, "missing level script '{id}'"),
            GameError::Script(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<ScriptError> for GameError {
    fn from(e: ScriptError) -> Self {
        GameError::Script(e)
    }
}

/// The running simulation
pub struct Game {
    config: GameConfig,
    center: Vec2,
    rng: Pcg32,

    // Collaborators, consumed through their narrow interfaces only
    levels: Box<dyn LevelStore>,
    script: Box<dyn ScriptEnv>,
    audio: Box<dyn AudioSink>,
    scores: Box<dyn ScoreStore>,

    // Current level definition and the live values derived from it
    level: LevelData,
    level_id: String,
    difficulty_mult: f32,
    sides: u32,
    rotation_speed: f32,
    speed_mult: f32,
    delay_mult: f32,

    // Per-life state
    status: Status,
    player: Player,
    walls: Vec<Wall>,
    timeline: Timeline<Game>,
    message_timeline: Timeline<Game>,
    current_message: Option<String>,
    effects: TimelinePool<CameraSet>,
    cameras: CameraSet,

    /// A level is loaded and the simulation may tick
    loaded: bool,
}

impl Game {
    pub fn new(
        config: GameConfig,
        levels: Box<dyn LevelStore>,
        script: Box<dyn ScriptEnv>,
        audio: Box<dyn AudioSink>,
        scores: Box<dyn ScoreStore>,
        seed: u64,
    ) -> Self {
        let player = Player::new(&config);
        Self {
            config,
            center: Vec2::ZERO,
            rng: Pcg32::seed_from_u64(seed),
            levels,
            script,
            audio,
            scores,
            level: LevelData::default(),
            level_id: String::new(),
            difficulty_mult: 1.0,
            sides: 6,
            rotation_speed: 0.0,
            speed_mult: 1.0,
            delay_mult: 1.0,
            status: Status::default(),
            player,
            walls: Vec::new(),
            timeline: Timeline::new(),
            message_timeline: Timeline::new(),
            current_message: None,
            effects: TimelinePool::new(),
            cameras: CameraSet::default(),
            loaded: false,
        }
    }

    /// Start a new life on `level_id`.
    ///
    /// The level data and script are resolved and validated before any
    /// existing state is touched, so a malformed script aborts the load with
    /// the previous life intact. After the commit point a failure leaves the
    /// simulation inert (no walls, not ticking).
    pub fn new_game(
        &mut self,
        level_id: &str,
        first_play: bool,
        difficulty_mult: f32,
    ) -> Result<(), GameError> {
        let level = self
            .levels
            .level_data(level_id)
            .cloned()
            .ok_or_else(|| GameError::UnknownLevel(level_id.to_owned()))?;
        let source = self
            .levels
            .script_source(&level.script_file_id)
            .map(str::to_owned)
            .ok_or_else(|| GameError::MissingScript(level.script_file_id.clone()))?;
        self.script.validate(&source)?;

        // Commit point: the old life is gone from here on.
        self.audio.stop_all_sounds();
        self.audio.play_sound(Sound::Go);
        self.audio.stop_level_music();
        self.audio.play_level_music();

        self.current_message = None;
        self.status = Status::default();
        self.level_id = level_id.to_owned();
        self.difficulty_mult = difficulty_mult;
        self.sides = level.sides;
        self.rotation_speed = level.rotation_speed;
        self.speed_mult = level.speed_multiplier;
        self.delay_mult = level.delay_multiplier;
        self.level = level;

        self.cameras.background.reset(self.config.zoom_factor);
        self.cameras.overlay.reset(self.config.zoom_factor);

        self.walls.clear();
        self.player = Player::new(&self.config);

        self.timeline = Timeline::new();
        self.message_timeline = Timeline::new();
        self.effects.clear();

        // Tear down the outgoing scripting environment, build the new one
        if !first_play && self.loaded {
            self.publish_view();
            self.script.call_hook("onUnload");
            self.script.drain_requests();
        }
        self.loaded = false;
        self.script.reset()?;
        let chunk_name = self.level.script_file_id.clone();
        self.script.load(&chunk_name, &source)?;

        let mut timeline = Timeline::new();
        self.publish_view();
        if self.script.call_hook("onLoad") {
            let requests = self.script.drain_requests();
            self.apply_requests(requests, &mut timeline);
        }
        self.timeline = timeline;

        // Random initial spin direction
        if self.rng.random_range(0..100) > 50 {
            self.rotation_speed = -self.rotation_speed;
        }

        self.loaded = true;
        log::info!(
            "level '{}' started (difficulty x{difficulty_mult})",
            self.level_id
        );
        Ok(())
    }

    /// Advance one tick of `frame_time` frame units (before timescale)
    pub fn update(&mut self, input: &TickInput, frame_time: f32) {
        if !self.loaded {
            return;
        }
        let ft = frame_time * self.config.timescale;

        if !self.status.has_died {
            self.status.current_time += ft * FRAME_UNIT_SECS;

            // Main timeline: due steps run, and may re-enter the scheduler
            let mut tl = std::mem::take(&mut self.timeline);
            tl.advance(self, ft);

            // Ran dry: ask the script for the next pattern burst
            if tl.is_finished() {
                tl.clear();
                self.publish_view();
                if self.script.call_hook("onStep") {
                    let requests = self.script.drain_requests();
                    self.apply_requests(requests, &mut tl);
                }
            }

            // Periodic difficulty increment
            if self.level.increment_time > 0.0
                && self.status.current_time - self.status.last_increment_time
                    >= self.level.increment_time
            {
                self.increment_difficulty(&mut tl);
            }
            self.timeline = tl;

            // Entities
            self.player.update(input, ft);
            let center_radius = self.config.center_radius();
            for wall in &mut self.walls {
                wall.update(ft);
                wall.move_towards_center(self.center, center_radius, self.config.spawn_distance, ft);
                wall.move_curve(self.center, ft);
            }
            self.walls.retain(|w| !w.killed());

            // Termination
            let pos = self.player.position(self.center);
            if self.walls.iter().any(|w| w.contains_point(pos)) {
                self.death();
            }

            self.update_rotation(ft);
        }

        self.status.flash_effect = (self.status.flash_effect - FLASH_DECAY * ft).max(0.0);

        let mut mtl = std::mem::take(&mut self.message_timeline);
        mtl.advance(self, ft);
        self.message_timeline = mtl;

        self.effects.advance_all(&mut self.cameras, ft);
    }

    /// Kill the current life. No-op when invincible or already dead.
    pub fn death(&mut self) {
        if self.config.invincible || self.status.has_died {
            return;
        }

        self.audio.play_sound(Sound::Death);
        self.audio.play_sound(Sound::GameOver);

        self.status.flash_effect = 255.0;
        shake_camera(&mut self.effects, CameraId::Background, &mut self.rng);
        shake_camera(&mut self.effects, CameraId::Overlay, &mut self.rng);
        self.status.has_died = true;
        self.audio.stop_level_music();
        self.check_and_save_score();
        log::info!(
            "death on '{}' at {:.2}s",
            self.level_id,
            self.status.current_time
        );
    }

    fn check_and_save_score(&mut self) {
        let key = score_key(&self.level_id, self.difficulty_mult);
        if self.scores.score(&key) < self.status.current_time {
            self.scores.set_score(&key, self.status.current_time);
        }
        self.scores.save_current_profile();
    }

    /// Raise difficulty: grow the rotation magnitude, flip the spin
    /// direction, re-arm the fast-spin budget, and schedule a side change
    /// one slot after the cursor.
    fn increment_difficulty(&mut self, tl: &mut Timeline<Game>) {
        self.audio.play_sound(Sound::LevelUp);

        let sign = if self.rotation_speed < 0.0 { -1.0 } else { 1.0 };
        self.rotation_speed += self.level.rotation_speed_increment * sign;
        self.rotation_speed = -self.rotation_speed;

        // The clamp only applies once the previous fast-spin budget is
        // spent; an active override may exceed it.
        if self.status.fast_spin < 0.0 && self.rotation_speed.abs() > self.level.rotation_speed_max
        {
            let sign = if self.rotation_speed < 0.0 { -1.0 } else { 1.0 };
            self.rotation_speed = self.level.rotation_speed_max * sign;
        }
        self.status.fast_spin = self.level.fast_spin;

        let lo = self.level.sides_min;
        let hi = self.level.sides_max.max(lo);
        let side_count = self.rng.random_range(lo..=hi);
        let at = tl.current_index() + 1;
        tl.insert_do(at, move |g, tl| g.side_change(tl, side_count));

        self.status.last_increment_time = self.status.current_time;
        log::debug!(
            "difficulty increment: rotation {:.3}, requesting {side_count} sides",
            self.rotation_speed
        );
    }

    /// Queue a side-change request on the main timeline (also what the
    /// periodic increment schedules internally).
    pub fn request_side_change(&mut self, side_count: u32) {
        self.timeline
            .append_do(move |g, tl| g.side_change(tl, side_count));
    }

    /// Apply a side change, or defer it while any wall is alive.
    ///
    /// Resizing the arena while walls exist would leave their geometry
    /// computed against an inconsistent side count, so the request re-queues
    /// itself behind a one-tick wait until the arena is clear. The full
    /// clear it schedules flushes every other pending step once the change
    /// lands; the dry-timeline refill repopulates the pattern afterwards.
    fn side_change(&mut self, tl: &mut Timeline<Game>, side_count: u32) {
        if !self.walls.is_empty() {
            let at = tl.current_index() + 1;
            tl.insert_do(at, |_, tl| tl.clear());
            let at = tl.current_index() + 1;
            tl.insert_do(at, move |g, tl| g.side_change(tl, side_count));
            let at = tl.current_index() + 1;
            tl.insert_wait(at, 1.0);
            return;
        }

        self.publish_view();
        if self.script.call_hook("onIncrement") {
            let requests = self.script.drain_requests();
            self.apply_requests(requests, tl);
        }
        self.speed_mult += self.level.speed_increment;
        self.delay_mult += self.level.delay_increment;

        if self.status.random_side_changes_enabled {
            self.set_sides(side_count);
        }
    }

    fn set_sides(&mut self, side_count: u32) {
        let clamped = side_count.clamp(self.level.sides_min, self.level.sides_max);
        if clamped != side_count {
            log::warn!(
                "side count {side_count} outside [{}, {}], clamped",
                self.level.sides_min,
                self.level.sides_max
            );
        }
        self.sides = clamped;
    }

    /// Turn drained script requests into timeline steps / direct effects
    fn apply_requests(&mut self, requests: Vec<ScriptRequest>, tl: &mut Timeline<Game>) {
        for request in requests {
            match request {
                ScriptRequest::Wall { side, thickness } => {
                    tl.append_do(move |g, _| g.push_wall(side, thickness, 1.0, 0.0));
                }
                ScriptRequest::WallAdj {
                    side,
                    thickness,
                    speed_adj,
                } => {
                    tl.append_do(move |g, _| g.push_wall(side, thickness, speed_adj, 0.0));
                }
                ScriptRequest::WallCurved {
                    side,
                    thickness,
                    speed_adj,
                    curve,
                } => {
                    tl.append_do(move |g, _| g.push_wall(side, thickness, speed_adj, curve));
                }
                ScriptRequest::Wait { frames } => tl.append_wait(frames * self.delay_mult),
                ScriptRequest::Message { text, frames } => self.add_message(text, frames),
            }
        }
    }

    /// Spawn a wall on `side` with the current speed multiplier
    pub fn spawn_wall(&mut self, side: u32, thickness: f32) {
        self.push_wall(side, thickness, 1.0, 0.0);
    }

    /// Spawn with a radial speed factor
    pub fn spawn_wall_adj(&mut self, side: u32, thickness: f32, speed_adj: f32) {
        self.push_wall(side, thickness, speed_adj, 0.0);
    }

    /// Spawn with a radial speed factor and angular curvature
    pub fn spawn_wall_curved(&mut self, side: u32, thickness: f32, speed_adj: f32, curve: f32) {
        self.push_wall(side, thickness, speed_adj, curve);
    }

    fn push_wall(&mut self, side: u32, thickness: f32, speed_adj: f32, curve: f32) {
        let speed = SpeedData::constant(WALL_BASE_SPEED * speed_adj * self.speed_mult);
        let curve = SpeedData::constant(curve);
        let skew = WallSkew {
            angle_left: self.config.wall_angle_left,
            angle_right: self.config.wall_angle_right,
            offset_left: self.config.wall_skew_left,
            offset_right: self.config.wall_skew_right,
        };
        self.walls.push(Wall::new(
            self.center,
            self.sides.max(1),
            side,
            thickness,
            self.config.spawn_distance,
            speed,
            curve,
            skew,
        ));
    }

    /// Show a transient message for `frames` frame units
    pub fn add_message(&mut self, text: String, frames: f32) {
        self.message_timeline.append_do(move |g, _| {
            g.audio.play_sound(Sound::Beep);
            g.current_message = Some(text);
        });
        self.message_timeline.append_wait(frames);
        self.message_timeline
            .append_do(|g, _| g.current_message = None);
    }

    /// Arena rotation, with the eased fast-spin boost while its budget lasts
    fn update_rotation(&mut self, ft: f32) {
        let mut next = self.rotation_speed * 10.0;
        if self.status.fast_spin > 0.0 && self.level.fast_spin > 0.0 {
            let boost =
                crate::smoother_step(0.0, self.level.fast_spin, self.status.fast_spin) / 3.5 * 17.0;
            next += boost.abs() * next.signum();
            self.status.fast_spin -= ft;
        }
        self.cameras.background.rotate((next * ft).to_radians());
    }

    fn publish_view(&mut self) {
        let view = ScriptView {
            sides: self.sides,
            speed_mult: self.speed_mult,
            delay_mult: self.delay_mult,
            current_time: self.status.current_time,
        };
        self.script.publish(view);
    }

    // === Accessors ===

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn speed_mult(&self) -> f32 {
        self.speed_mult
    }

    pub fn delay_mult(&self) -> f32 {
        self.delay_mult
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn cameras(&self) -> &CameraSet {
        &self.cameras
    }

    pub fn message(&self) -> Option<&str> {
        self.current_message.as_deref()
    }

    pub fn timeline(&self) -> &Timeline<Game> {
        &self.timeline
    }

    pub fn message_timeline(&self) -> &Timeline<Game> {
        &self.message_timeline
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::audio::NullAudio;
    use crate::level::InMemoryLevelStore;
    use crate::scores::InMemoryScores;
    use crate::scripting::{NullScripting, NullState};

    /// Score store the test can keep a handle on after it moves into the game
    #[derive(Clone, Default)]
    struct SharedScores(Rc<RefCell<InMemoryScores>>);

    impl ScoreStore for SharedScores {
        fn score(&self, key: &str) -> f32 {
            self.0.borrow().score(key)
        }
        fn set_score(&mut self, key: &str, value: f32) {
            self.0.borrow_mut().set_score(key, value);
        }
        fn save_current_profile(&mut self) {
            self.0.borrow_mut().save_current_profile();
        }
    }

    fn test_level() -> LevelData {
        LevelData {
            id: "test".into(),
            script_file_id: "test.lua".into(),
            sides: 6,
            sides_min: 4,
            sides_max: 6,
            increment_time: 0.0,
            ..LevelData::default()
        }
    }

    fn build_game(
        level: LevelData,
        config: GameConfig,
    ) -> (Game, Rc<RefCell<NullState>>, SharedScores) {
        let mut levels = InMemoryLevelStore::new();
        levels.insert_script(level.script_file_id.clone(), "");
        levels.insert_level(level);
        let (script, state) = NullScripting::new();
        let scores = SharedScores::default();
        let game = Game::new(
            config,
            Box::new(levels),
            Box::new(script),
            Box::new(NullAudio),
            Box::new(scores.clone()),
            42,
        );
        (game, state, scores)
    }

    fn dodge_config() -> GameConfig {
        GameConfig {
            invincible: true,
            spawn_distance: 100.0,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_update_before_new_game_is_inert() {
        let (mut game, _, _) = build_game(test_level(), GameConfig::default());
        game.update(&TickInput::default(), 1.0);
        assert_eq!(game.status().current_time, 0.0);
    }

    #[test]
    fn test_new_game_resets_everything() {
        let (mut game, state, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();

        game.spawn_wall(0, 40.0);
        game.spawn_wall(1, 40.0);
        game.add_message("hello".into(), 10.0);
        for _ in 0..3 {
            game.update(&TickInput::default(), 1.0);
        }
        assert!(game.wall_count() > 0);

        game.new_game("test", false, 1.0).unwrap();
        assert_eq!(game.wall_count(), 0);
        assert!(game.timeline().is_empty());
        assert_eq!(game.timeline().current_index(), 0);
        assert!(game.message_timeline().is_empty());
        assert_eq!(game.message_timeline().current_index(), 0);
        assert_eq!(game.message(), None);
        assert_eq!(*game.status(), Status::default());
        assert_eq!(game.cameras().background.rotation, 0.0);

        // The outgoing environment got its unload hook before the rebuild
        let hooks = state.borrow().hooks_called.clone();
        let unload = hooks.iter().position(|h| h == "onUnload");
        let reset = hooks.iter().rposition(|h| h == "<reset>");
        assert!(unload.is_some());
        assert!(unload < reset);
    }

    #[test]
    fn test_failed_script_load_leaves_state_untouched() {
        let (mut game, state, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();
        game.spawn_wall(0, 40.0);
        game.update(&TickInput::default(), 1.0);
        let time_before = game.status().current_time;
        let walls_before = game.wall_count();

        state.borrow_mut().fail_load = true;
        let err = game.new_game("test", false, 1.0);
        assert!(matches!(err, Err(GameError::Script(_))));

        // Prior life is intact and still ticking
        assert!(game.is_loaded());
        assert_eq!(game.wall_count(), walls_before);
        assert_eq!(game.status().current_time, time_before);
        game.update(&TickInput::default(), 1.0);
        assert!(game.status().current_time > time_before);
    }

    #[test]
    fn test_unknown_level_is_an_error() {
        let (mut game, _, _) = build_game(test_level(), GameConfig::default());
        assert!(matches!(
            game.new_game("nope", true, 1.0),
            Err(GameError::UnknownLevel(_))
        ));
        assert!(!game.is_loaded());
    }

    #[test]
    fn test_side_change_waits_for_clear_arena() {
        let (mut game, _, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();

        // Two fast walls, then a side-change request while they are alive
        game.spawn_wall_adj(0, 20.0, 3.0);
        game.spawn_wall_adj(3, 20.0, 3.0);
        game.request_side_change(5);

        let input = TickInput::default();
        let mut clear_tick = None;
        let mut change_tick = None;
        for tick in 0..60 {
            let walls_before = game.wall_count();
            game.update(&input, 1.0);
            if clear_tick.is_none() && game.wall_count() == 0 {
                clear_tick = Some(tick);
            }
            if game.sides() == 5 {
                change_tick = Some((tick, walls_before));
                break;
            }
            assert_eq!(game.sides(), 6, "side count changed while walls were alive");
        }

        let clear_tick = clear_tick.expect("walls never cleared");
        let (change_tick, walls_before) = change_tick.expect("side change never landed");
        assert_eq!(walls_before, 0);
        assert_eq!(change_tick, clear_tick + 1);
    }

    #[test]
    fn test_side_change_applies_immediately_when_clear() {
        let (mut game, state, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();

        let speed_before = game.speed_mult();
        game.request_side_change(5);
        game.update(&TickInput::default(), 1.0);

        assert_eq!(game.sides(), 5);
        assert!((game.speed_mult() - speed_before - game.level().speed_increment).abs() < 1e-6);
        assert!(
            state
                .borrow()
                .hooks_called
                .iter()
                .any(|h| h == "onIncrement")
        );
    }

    #[test]
    fn test_side_change_clamps_out_of_range_request() {
        let (mut game, _, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();

        game.request_side_change(11);
        game.update(&TickInput::default(), 1.0);
        assert_eq!(game.sides(), 6);

        game.request_side_change(1);
        game.update(&TickInput::default(), 1.0);
        assert_eq!(game.sides(), 4);
    }

    #[test]
    fn test_side_change_respects_disabled_flag() {
        let (mut game, _, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();
        game.status.random_side_changes_enabled = false;

        let speed_before = game.speed_mult();
        game.request_side_change(5);
        game.update(&TickInput::default(), 1.0);

        // Multipliers still move; the side count does not
        assert_eq!(game.sides(), 6);
        assert!(game.speed_mult() > speed_before);
    }

    #[test]
    fn test_deferred_side_change_flushes_timeline() {
        let (mut game, _, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();

        game.spawn_wall_adj(0, 20.0, 3.0);
        game.request_side_change(5);
        // A step queued behind the request; the deferral's clear wipes it
        game.add_message("later".into(), 5.0);

        let input = TickInput::default();
        for _ in 0..60 {
            game.update(&input, 1.0);
            if game.sides() == 5 {
                break;
            }
        }
        assert_eq!(game.sides(), 5);
        assert!(game.timeline().is_empty());
    }

    #[test]
    fn test_difficulty_increment_flips_and_grows_rotation() {
        let level = LevelData {
            increment_time: 1.0,
            ..test_level()
        };
        let (mut game, _, _) = build_game(level, dodge_config());
        game.new_game("test", true, 1.0).unwrap();

        let base = game.rotation_speed();
        let input = TickInput::default();
        for _ in 0..61 {
            game.update(&input, 1.0);
        }

        // sign flipped, magnitude grew by the increment
        assert!(game.rotation_speed().signum() != base.signum());
        assert!(
            (game.rotation_speed().abs() - (base.abs() + game.level().rotation_speed_increment))
                .abs()
                < 1e-4
        );
        // fast spin armed and already draining
        assert!(game.status().fast_spin > 0.0);
        assert!(game.status().fast_spin <= game.level().fast_spin);
        // the scheduled side change landed within bounds
        assert!(game.sides() >= 4 && game.sides() <= 6);
    }

    #[test]
    fn test_death_is_idempotent_and_saves_once() {
        let (mut game, _, scores) = build_game(test_level(), GameConfig::default());
        game.new_game("test", true, 1.5).unwrap();
        game.status.current_time = 12.5;

        game.death();
        assert!(game.status().has_died);
        assert_eq!(game.status().flash_effect, 255.0);
        let key = score_key("test", 1.5);
        assert_eq!(scores.score(&key), 12.5);
        assert_eq!(scores.0.borrow().save_count(), 1);

        game.status.current_time = 99.0;
        game.death();
        assert_eq!(scores.score(&key), 12.5, "second death must not re-save");
        assert_eq!(scores.0.borrow().save_count(), 1);
    }

    #[test]
    fn test_death_keeps_existing_better_score() {
        let (mut game, _, scores) = build_game(test_level(), GameConfig::default());
        game.new_game("test", true, 1.0).unwrap();
        let key = score_key("test", 1.0);
        scores.0.borrow_mut().set_score(&key, 50.0);

        game.status.current_time = 10.0;
        game.death();
        assert_eq!(scores.score(&key), 50.0);
    }

    #[test]
    fn test_invincible_death_is_noop() {
        let (mut game, _, scores) = build_game(
            test_level(),
            GameConfig {
                invincible: true,
                ..GameConfig::default()
            },
        );
        game.new_game("test", true, 1.0).unwrap();
        game.status.current_time = 5.0;
        game.death();
        assert!(!game.status().has_died);
        assert_eq!(scores.0.borrow().save_count(), 0);
    }

    #[test]
    fn test_wall_collision_kills_player() {
        // Square arena: side 1 spans the player's starting angle (90 deg)
        let level = LevelData {
            sides: 4,
            sides_min: 4,
            sides_max: 4,
            ..test_level()
        };
        let config = GameConfig {
            spawn_distance: 150.0,
            ..GameConfig::default()
        };
        let (mut game, _, scores) = build_game(level, config);
        game.new_game("test", true, 1.0).unwrap();

        game.spawn_wall_adj(1, 40.0, 2.0);
        let input = TickInput::default();
        for _ in 0..40 {
            game.update(&input, 1.0);
            if game.status().has_died {
                break;
            }
        }
        assert!(game.status().has_died);
        assert!(game.status().flash_effect > 200.0);
        assert!(scores.score(&score_key("test", 1.0)) > 0.0);
    }

    #[test]
    fn test_dry_timeline_refills_from_script() {
        let (mut game, state, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();

        {
            let mut s = state.borrow_mut();
            s.hooks.insert("onStep".into());
            s.pending = vec![
                ScriptRequest::Wall {
                    side: 0,
                    thickness: 40.0,
                },
                ScriptRequest::Wait { frames: 30.0 },
            ];
        }

        let input = TickInput::default();
        game.update(&input, 1.0); // dry -> refill queued
        game.update(&input, 1.0); // spawn step executes
        assert_eq!(game.wall_count(), 1);
    }

    #[test]
    fn test_script_wait_scales_with_delay_mult() {
        let (mut game, state, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();
        game.delay_mult = 2.0;

        state.borrow_mut().hooks.insert("onStep".into());
        state.borrow_mut().pending = vec![
            ScriptRequest::Wait { frames: 2.0 },
            ScriptRequest::Wall {
                side: 0,
                thickness: 40.0,
            },
        ];

        let input = TickInput::default();
        game.update(&input, 1.0); // refill
        // wait is 2 * 2 = 4 frames; the spawn runs the tick it resolves
        for _ in 0..3 {
            game.update(&input, 1.0);
            assert_eq!(game.wall_count(), 0);
        }
        game.update(&input, 1.0);
        assert_eq!(game.wall_count(), 1);
    }

    #[test]
    fn test_message_lifecycle() {
        let (mut game, _, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();

        game.add_message("incoming".into(), 2.0);
        let input = TickInput::default();
        game.update(&input, 1.0);
        assert_eq!(game.message(), Some("incoming"));
        game.update(&input, 1.0);
        assert_eq!(game.message(), None);
    }

    #[test]
    fn test_rotation_advances_camera() {
        let (mut game, _, _) = build_game(test_level(), dodge_config());
        game.new_game("test", true, 1.0).unwrap();

        let input = TickInput::default();
        for _ in 0..10 {
            game.update(&input, 1.0);
        }
        assert!(game.cameras().background.rotation != 0.0);
    }

    #[test]
    fn test_timescale_scales_run_time() {
        let config = GameConfig {
            invincible: true,
            timescale: 2.0,
            ..GameConfig::default()
        };
        let (mut game, _, _) = build_game(test_level(), config);
        game.new_game("test", true, 1.0).unwrap();

        let input = TickInput::default();
        for _ in 0..30 {
            game.update(&input, 1.0);
        }
        // 30 frames at double timescale = one second of run time
        assert!((game.status().current_time - 1.0).abs() < 1e-4);
    }
}
