//! Headless story runner.
//!
//! Loads the game config, starts a scene and advances it in fixed steps.
//! Input comes from a replay script (see `replay.rs`) or nothing at all, in
//! which case the story plays its timers and cutscenes for `--frames` steps.
//! The final frame is either rasterized to a PNG or summarized in the log.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use oa_game::config::load_game_config_or_default;
use oa_game::game::Game;
use oa_game::render::{DrawList, SoftwareCanvas};
use oa_game::replay::{load_replay_from_path, ReplayPlayer, ReplaySequence};
use oa_game::scene::{SceneId, SceneRegistry};

/// Our Adventure scene runner
#[derive(Parser)]
#[command(version, about = "Runs the Our Adventure story scenes without a window.")]
struct Cli {
    /// Game config JSON. Defaults are used when the file is missing.
    #[arg(long, value_name = "PATH", default_value = "config/game.json")]
    config: PathBuf,

    /// Start here instead of the configured scene
    /// (swipe, date_drive, apartment, moving_drive, dinner).
    #[arg(long, value_name = "NAME")]
    scene: Option<String>,

    /// Replay script that drives the keyboard.
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,

    /// Fixed steps to run when no replay is given.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Write the final frame to this PNG file.
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Our Adventure runner starting...");

    let mut config = load_game_config_or_default(&cli.config);

    let replay = match cli.replay.as_deref().map(load_replay_from_path).transpose() {
        Ok(replay) => replay,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    if let Some(replay) = &replay {
        // Replays are recorded against their own timestep.
        config.fixed_dt = replay.fixed_dt;
    }

    let start = match cli.scene.as_deref() {
        Some(name) => match SceneId::from_name(name) {
            Some(id) => id,
            None => {
                eprintln!("Error: unknown scene '{name}'");
                process::exit(1);
            }
        },
        None => config.start_scene,
    };

    let mut game = Game::new(config, SceneRegistry::story());
    if !game.start_at(start) {
        eprintln!("Error: scene '{}' could not be started", start.name());
        process::exit(1);
    }

    let steps = match &replay {
        Some(replay) => run_replay(&mut game, replay),
        None => run_idle(&mut game, cli.frames),
    };
    log::info!(
        "Ran {} steps, {:.2}s simulated, ended in scene {:?}{}",
        steps,
        steps as f64 * game.config().fixed_dt,
        game.current_scene(),
        if game.is_finished() { " (story finished)" } else { "" }
    );

    match &cli.snapshot {
        Some(path) => {
            if let Err(e) = write_snapshot(&game, path) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            log::info!("Snapshot written to {}", path.display());
        }
        None => log_draw_summary(&game),
    }
}

fn run_replay(game: &mut Game, replay: &ReplaySequence) -> u32 {
    let mut player = ReplayPlayer::new(replay);
    log::info!("Replaying {} steps at dt {}", player.len(), replay.fixed_dt);
    let mut steps = 0;
    while let Some(events) = player.next_events() {
        if game.is_finished() {
            break;
        }
        for event in events {
            game.push_event(event);
        }
        game.step();
        steps += 1;
    }
    for event in player.release_all() {
        game.push_event(event);
    }
    steps
}

fn run_idle(game: &mut Game, frames: u32) -> u32 {
    let mut steps = 0;
    while steps < frames && !game.is_finished() {
        game.step();
        steps += 1;
    }
    steps
}

fn write_snapshot(game: &Game, path: &Path) -> Result<(), String> {
    let config = game.config();
    let mut canvas = SoftwareCanvas::new(config.canvas_width, config.canvas_height);
    canvas.clear([0, 0, 0, 255]);
    {
        let mut pass = canvas.pass(&game.assets().sprites);
        game.draw(&mut pass);
    }
    canvas.save_png(path)
}

fn log_draw_summary(game: &Game) {
    let mut list = DrawList::new();
    game.draw(&mut list);
    log::info!(
        "Final frame: {} draw commands, {} sprites",
        list.commands.len(),
        list.sprite_count()
    );
    for text in list.texts() {
        log::info!("  text: {text}");
    }
}
