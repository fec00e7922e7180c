use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::scene::SceneId;
use crate::scenes::apartment::ApartmentConfig;
use crate::scenes::dinner::DinnerConfig;
use crate::scenes::drive::DriveConfig;
use crate::scenes::swipe::SwipeConfig;
use crate::scenes::transition::TransitionConfig;

/// Top-level game settings. Every field is optional in the JSON file.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub asset_root: PathBuf,
    pub fixed_dt: f64,
    pub start_scene: SceneId,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Minimum seconds between two dialogue advances.
    pub dialogue_cooldown: f32,
    pub player: PlayerConfig,
    pub swipe: SwipeConfig,
    pub date_drive: DriveConfig,
    pub apartment: ApartmentConfig,
    pub moving_drive: DriveConfig,
    pub dinner: DinnerConfig,
    pub transition: TransitionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            fixed_dt: 1.0 / 60.0,
            start_scene: SceneId::Swipe,
            canvas_width: 1280,
            canvas_height: 800,
            dialogue_cooldown: 0.3,
            player: PlayerConfig::default(),
            swipe: SwipeConfig::default(),
            date_drive: DriveConfig::date(),
            apartment: ApartmentConfig::default(),
            moving_drive: DriveConfig::moving(),
            dinner: DinnerConfig::default(),
            transition: TransitionConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walking speed in pixels per second.
    pub speed: f32,
    pub scale: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 200.0,
            scale: 2.0,
        }
    }
}

pub fn load_game_config(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load `path`, or fall back to defaults with a warning.
pub fn load_game_config_or_default(path: &Path) -> GameConfig {
    load_game_config(path).unwrap_or_else(|err| {
        log::warn!("{err}. Using default game config.");
        GameConfig::default()
    })
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if !config.fixed_dt.is_finite() || config.fixed_dt <= 0.0 {
        return Err(format!(
            "Config validation failed: fixed_dt must be > 0 (got {})",
            config.fixed_dt
        ));
    }
    if config.canvas_width == 0 || config.canvas_height == 0 {
        return Err("Config validation failed: canvas size must be non-zero".to_string());
    }
    if config.player.speed < 0.0 {
        return Err(format!(
            "Config validation failed: player.speed must be >= 0 (got {})",
            config.player.speed
        ));
    }
    config
        .swipe
        .validate()
        .map_err(|e| format!("Config validation failed: swipe: {e}"))?;
    for (name, drive) in [
        ("date_drive", &config.date_drive),
        ("moving_drive", &config.moving_drive),
    ] {
        drive
            .validate()
            .map_err(|e| format!("Config validation failed: {name}: {e}"))?;
    }
    if config.transition.duration <= 0.0 {
        return Err("Config validation failed: transition.duration must be > 0".to_string());
    }
    Ok(())
}
