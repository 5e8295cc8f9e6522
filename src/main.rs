//! Hexrush headless demo
//!
//! Runs the simulation core against a built-in level and Lua pattern script
//! at a fixed 60 Hz timestep, with a trivial dodging input, and reports the
//! outcome. Useful for exercising the whole stack without a renderer.

use hexrush::audio::NullAudio;
use hexrush::scores::InMemoryScores;
use hexrush::scripting::LuaScripting;
use hexrush::sim::Game;
use hexrush::{GameConfig, InMemoryLevelStore, LevelData, TickInput};

/// Pattern script for the demo level: alternating gaps, a curved burst on
/// every difficulty increment, and a greeting message.
const DEMO_SCRIPT: &str = r#"
function onLoad()
    message("get ready", 90)
end

function onStep()
    local gap = rnd(0, getSides() - 1)
    for side = 0, getSides() - 1 do
        if side ~= gap then
            wall(side, 40.0)
        end
    end
    wait(60)
end

function onIncrement()
    local dir = rnd(0, 1) == 0 and -1.0 or 1.0
    for side = 0, getSides() - 1, 2 do
        wallCurved(side, 25.0, 0.8, 15.0 * dir)
    end
    wait(40)
end

function onUnload()
    log("demo level unloading")
end
"#;

fn demo_level() -> LevelData {
    LevelData {
        id: "demo".into(),
        name: "Demo Spiral".into(),
        sides: 6,
        sides_min: 5,
        sides_max: 7,
        increment_time: 10.0,
        script_file_id: "demo.lua".into(),
        ..LevelData::default()
    }
}

fn main() {
    env_logger::init();
    log::info!("hexrush headless demo starting");

    let mut levels = InMemoryLevelStore::new();
    levels.insert_level(demo_level());
    levels.insert_script("demo.lua", DEMO_SCRIPT);

    let script = match LuaScripting::new(0xC0FFEE) {
        Ok(env) => env,
        Err(e) => {
            log::error!("failed to build scripting environment: {e}");
            std::process::exit(1);
        }
    };

    let scores = InMemoryScores::new();
    let mut game = Game::new(
        GameConfig::default(),
        Box::new(levels),
        Box::new(script),
        Box::new(NullAudio),
        Box::new(scores),
        0xC0FFEE,
    );

    if let Err(e) = game.new_game("demo", true, 1.0) {
        log::error!("level load failed: {e}");
        std::process::exit(1);
    }

    // 60 Hz fixed timestep, up to two simulated minutes. The "player" just
    // drifts clockwise, so it will die eventually.
    let input = TickInput {
        clockwise: true,
        ..TickInput::default()
    };
    let max_frames = 120 * 60;
    let mut frames = 0;
    while !game.status().has_died && frames < max_frames {
        game.update(&input, 1.0);
        frames += 1;
        if frames % 600 == 0 {
            log::info!(
                "t={:.1}s sides={} walls={} speed x{:.2}",
                game.status().current_time,
                game.sides(),
                game.wall_count(),
                game.speed_mult()
            );
        }
    }

    println!(
        "run over: survived {:.2}s across {} frames ({} sides at the end)",
        game.status().current_time,
        frames,
        game.sides()
    );
}
