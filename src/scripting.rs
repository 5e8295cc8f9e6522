//! Embedded level scripting
//!
//! Levels are driven by Lua scripts. The simulation talks to them through
//! the `ScriptEnv` capability interface only, so tests can swap in a no-op
//! environment. Scripts talk back by queueing requests (spawn a wall, wait,
//! show a message) that the game drains after each hook call - the script
//! never holds references into simulation state.
//!
//! Hooks: `onLoad` (level start), `onUnload` (level teardown), `onIncrement`
//! (difficulty increment landed), `onStep` (the main timeline ran dry and
//! wants the next pattern burst).
//!
//! Hook invocations are guarded: a runtime error inside a hook is logged
//! and the hook treated as having produced no effect. A script that fails
//! to parse aborts the level load instead.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use mlua::{Function, Lua};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// A request a script issues back into the simulation
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptRequest {
    /// Spawn a wall on `side` with the given thickness
    Wall { side: u32, thickness: f32 },
    /// Spawn with a radial speed factor
    WallAdj {
        side: u32,
        thickness: f32,
        speed_adj: f32,
    },
    /// Spawn with speed factor and angular curvature
    WallCurved {
        side: u32,
        thickness: f32,
        speed_adj: f32,
        curve: f32,
    },
    /// Queue a timed wait on the main timeline (frames, before the delay
    /// multiplier is applied)
    Wait { frames: f32 },
    /// Show a transient message
    Message { text: String, frames: f32 },
}

/// Read-only live values published to the script before each hook call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScriptView {
    pub sides: u32,
    pub speed_mult: f32,
    pub delay_mult: f32,
    pub current_time: f32,
}

/// Script environment failure surfaced to the host
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// The script source failed to parse or execute at load time
    Load(String),
    /// The environment itself could not be built
    Env(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Load(msg) => write!(f, "script load failed: {msg}"),
            ScriptError::Env(msg) => write!(f, "script environment failed: {msg}"),
        }
    }
}

impl std::error::Error for ScriptError {}

/// Capability interface the orchestrator depends on
pub trait ScriptEnv {
    /// Check a source without touching the live environment
    fn validate(&self, source: &str) -> Result<(), ScriptError>;
    /// Tear down and rebuild the environment (fresh globals, empty queue)
    fn reset(&mut self) -> Result<(), ScriptError>;
    /// Load and execute a script into the live environment
    fn load(&mut self, chunk_name: &str, source: &str) -> Result<(), ScriptError>;
    fn hook_exists(&self, name: &str) -> bool;
    /// Invoke a hook, guarded. Returns true when the hook existed and ran to
    /// completion; on error the pending requests are dropped so the hook
    /// counts as a no-op.
    fn call_hook(&mut self, name: &str) -> bool;
    /// Refresh the read-only values the script sees
    fn publish(&mut self, view: ScriptView);
    /// Take everything the script queued since the last drain
    fn drain_requests(&mut self) -> Vec<ScriptRequest>;
}

/// Shared plumbing between the Lua state and the Rust side
struct Bridge {
    queue: Rc<RefCell<Vec<ScriptRequest>>>,
    view: Rc<RefCell<ScriptView>>,
    rng: Rc<RefCell<Pcg32>>,
}

/// `ScriptEnv` backed by an embedded Lua 5.4 state
pub struct LuaScripting {
    lua: Lua,
    bridge: Bridge,
    seed: u64,
}

impl LuaScripting {
    pub fn new(seed: u64) -> Result<Self, ScriptError> {
        let bridge = Bridge {
            queue: Rc::new(RefCell::new(Vec::new())),
            view: Rc::new(RefCell::new(ScriptView::default())),
            rng: Rc::new(RefCell::new(Pcg32::seed_from_u64(seed))),
        };
        let lua = Lua::new();
        install_api(&lua, &bridge).map_err(|e| ScriptError::Env(e.to_string()))?;
        Ok(Self { lua, bridge, seed })
    }
}

/// Register the level API into a Lua state
fn install_api(lua: &Lua, bridge: &Bridge) -> mlua::Result<()> {
    let globals = lua.globals();

    let queue = bridge.queue.clone();
    globals.set(
        "wall",
        lua.create_function(move |_, (side, thickness): (u32, f32)| {
            queue
                .borrow_mut()
                .push(ScriptRequest::Wall { side, thickness });
            Ok(())
        })?,
    )?;

    let queue = bridge.queue.clone();
    globals.set(
        "wallAdj",
        lua.create_function(move |_, (side, thickness, speed_adj): (u32, f32, f32)| {
            queue.borrow_mut().push(ScriptRequest::WallAdj {
                side,
                thickness,
                speed_adj,
            });
            Ok(())
        })?,
    )?;

    let queue = bridge.queue.clone();
    globals.set(
        "wallCurved",
        lua.create_function(
            move |_, (side, thickness, speed_adj, curve): (u32, f32, f32, f32)| {
                queue.borrow_mut().push(ScriptRequest::WallCurved {
                    side,
                    thickness,
                    speed_adj,
                    curve,
                });
                Ok(())
            },
        )?,
    )?;

    let queue = bridge.queue.clone();
    globals.set(
        "wait",
        lua.create_function(move |_, frames: f32| {
            queue.borrow_mut().push(ScriptRequest::Wait { frames });
            Ok(())
        })?,
    )?;

    let queue = bridge.queue.clone();
    globals.set(
        "message",
        lua.create_function(move |_, (text, frames): (String, f32)| {
            queue
                .borrow_mut()
                .push(ScriptRequest::Message { text, frames });
            Ok(())
        })?,
    )?;

    let view = bridge.view.clone();
    globals.set(
        "getSides",
        lua.create_function(move |_, ()| Ok(view.borrow().sides))?,
    )?;

    let view = bridge.view.clone();
    globals.set(
        "getSpeedMult",
        lua.create_function(move |_, ()| Ok(view.borrow().speed_mult))?,
    )?;

    let view = bridge.view.clone();
    globals.set(
        "getDelayMult",
        lua.create_function(move |_, ()| Ok(view.borrow().delay_mult))?,
    )?;

    let view = bridge.view.clone();
    globals.set(
        "getTime",
        lua.create_function(move |_, ()| Ok(view.borrow().current_time))?,
    )?;

    let rng = bridge.rng.clone();
    globals.set(
        "rnd",
        lua.create_function(move |_, (lo, hi): (i64, i64)| {
            if lo >= hi {
                return Ok(lo);
            }
            Ok(rng.borrow_mut().random_range(lo..=hi))
        })?,
    )?;

    globals.set(
        "log",
        lua.create_function(move |_, text: String| {
            log::info!("[script] {text}");
            Ok(())
        })?,
    )?;

    Ok(())
}

impl ScriptEnv for LuaScripting {
    fn validate(&self, source: &str) -> Result<(), ScriptError> {
        // Scratch state with the same API, so top-level calls resolve
        let scratch = LuaScripting::new(self.seed)?;
        scratch
            .lua
            .load(source)
            .set_name("validate")
            .exec()
            .map_err(|e| ScriptError::Load(e.to_string()))
    }

    fn reset(&mut self) -> Result<(), ScriptError> {
        let lua = Lua::new();
        install_api(&lua, &self.bridge).map_err(|e| ScriptError::Env(e.to_string()))?;
        self.lua = lua;
        self.bridge.queue.borrow_mut().clear();
        Ok(())
    }

    fn load(&mut self, chunk_name: &str, source: &str) -> Result<(), ScriptError> {
        self.lua
            .load(source)
            .set_name(chunk_name)
            .exec()
            .map_err(|e| {
                log::error!("level script '{chunk_name}' failed to load: {e}");
                ScriptError::Load(e.to_string())
            })
    }

    fn hook_exists(&self, name: &str) -> bool {
        self.lua.globals().get::<Function>(name).is_ok()
    }

    fn call_hook(&mut self, name: &str) -> bool {
        let func: Function = match self.lua.globals().get(name) {
            Ok(f) => f,
            Err(_) => return false,
        };
        match func.call::<()>(()) {
            Ok(()) => true,
            Err(e) => {
                log::error!("script hook '{name}' failed: {e}");
                self.bridge.queue.borrow_mut().clear();
                false
            }
        }
    }

    fn publish(&mut self, view: ScriptView) {
        *self.bridge.view.borrow_mut() = view;
    }

    fn drain_requests(&mut self) -> Vec<ScriptRequest> {
        std::mem::take(&mut *self.bridge.queue.borrow_mut())
    }
}

/// Shared observable state of a `NullScripting` environment
#[derive(Debug, Default)]
pub struct NullState {
    /// Hook names in invocation order (plus "<reset>" markers)
    pub hooks_called: Vec<String>,
    /// Hooks that report as existing and "run"
    pub hooks: HashSet<String>,
    /// Requests handed out at the next drain
    pub pending: Vec<ScriptRequest>,
    /// Make validate/load fail, simulating a malformed script
    pub fail_load: bool,
    pub last_view: Option<ScriptView>,
}

/// No-op environment for tests and headless hosts without scripting
#[derive(Debug, Default)]
pub struct NullScripting {
    state: Rc<RefCell<NullState>>,
}

impl NullScripting {
    /// Build the environment plus a handle for observing/steering it
    pub fn new() -> (Self, Rc<RefCell<NullState>>) {
        let state = Rc::new(RefCell::new(NullState::default()));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

impl ScriptEnv for NullScripting {
    fn validate(&self, _source: &str) -> Result<(), ScriptError> {
        if self.state.borrow().fail_load {
            return Err(ScriptError::Load("null: load disabled".into()));
        }
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ScriptError> {
        self.state.borrow_mut().hooks_called.push("<reset>".into());
        Ok(())
    }

    fn load(&mut self, _chunk_name: &str, _source: &str) -> Result<(), ScriptError> {
        if self.state.borrow().fail_load {
            return Err(ScriptError::Load("null: load disabled".into()));
        }
        Ok(())
    }

    fn hook_exists(&self, name: &str) -> bool {
        self.state.borrow().hooks.contains(name)
    }

    fn call_hook(&mut self, name: &str) -> bool {
        let mut state = self.state.borrow_mut();
        state.hooks_called.push(name.to_owned());
        state.hooks.contains(name)
    }

    fn publish(&mut self, view: ScriptView) {
        self.state.borrow_mut().last_view = Some(view);
    }

    fn drain_requests(&mut self) -> Vec<ScriptRequest> {
        std::mem::take(&mut self.state.borrow_mut().pending)
    }
}
