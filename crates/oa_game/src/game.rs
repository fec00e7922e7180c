//! Game host: owns the scene manager, assets, keyboard state and the
//! fixed-step clock. Platform code (or the headless runner) only pushes input
//! events, advances time and asks for a draw.

use oa_core::input::{InputEvent, InputState};
use oa_core::time::TimeState;

use crate::assets::Assets;
use crate::config::GameConfig;
use crate::render::Renderer;
use crate::scene::{SceneId, SceneManager, SceneRegistry};

pub struct Game {
    scenes: SceneManager,
    assets: Assets,
    input: InputState,
    time: TimeState,
}

impl Game {
    pub fn new(config: GameConfig, registry: SceneRegistry) -> Self {
        let assets = Assets::new(config.asset_root.clone());
        let time = TimeState::new(config.fixed_dt);
        Self {
            scenes: SceneManager::new(registry, config),
            assets,
            input: InputState::new(),
            time,
        }
    }

    pub fn config(&self) -> &GameConfig {
        self.scenes.config()
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn time(&self) -> &TimeState {
        &self.time
    }

    pub fn current_scene(&self) -> Option<&'static str> {
        self.scenes.current_name()
    }

    pub fn is_finished(&self) -> bool {
        self.scenes.is_finished()
    }

    /// Start the configured opening scene.
    pub fn start(&mut self) -> bool {
        let id = self.scenes.config().start_scene;
        self.start_at(id)
    }

    pub fn start_at(&mut self, id: SceneId) -> bool {
        self.scenes.go_to_id(id, &mut self.assets)
    }

    /// Number keys jump straight to a scene; everything else goes to the
    /// keyboard state and the current scene.
    pub fn push_event(&mut self, event: InputEvent) {
        if let InputEvent::KeyDown(key) = event {
            let fresh = !self.input.is_held(key);
            if let Some(id) = key.digit().and_then(SceneId::from_shortcut) {
                if fresh {
                    log::info!("Shortcut {} -> scene '{}'", key.name(), id.name());
                    self.scenes.go_to_id(id, &mut self.assets);
                }
            }
        }
        self.input.apply(event);
        self.scenes.handle_event(event);
    }

    /// Advance exactly one fixed step. Just-pressed keys are seen by this
    /// step only.
    pub fn step(&mut self) {
        if self.is_finished() {
            return;
        }
        let dt = self.time.fixed_dt as f32;
        self.scenes.update(dt, &self.input, &mut self.assets);
        self.input.end_frame();
    }

    /// Feed a measured frame delta and run the fixed steps it covers.
    /// Returns the number of steps taken.
    pub fn frame(&mut self, real_dt: f64) -> u32 {
        self.time.begin_frame(real_dt);
        while self.time.should_step() {
            self.step();
        }
        self.time.end_frame();
        if self.time.steps_this_frame > 0 {
            log::trace!(
                "Frame {}: {} steps, alpha {:.2}",
                self.time.frame_count,
                self.time.steps_this_frame,
                self.time.interpolation_alpha
            );
        }
        self.time.steps_this_frame
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        self.scenes.draw(renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;
    use crate::replay::{ReplayPlayer, ReplaySequence};
    use oa_core::input::Key;

    fn config() -> GameConfig {
        GameConfig {
            asset_root: std::env::temp_dir().join("oa_game_test_assets_missing"),
            fixed_dt: 0.0625,
            start_scene: SceneId::DateDrive,
            ..GameConfig::default()
        }
    }

    fn game() -> Game {
        let mut game = Game::new(config(), SceneRegistry::story());
        assert!(game.start());
        game
    }

    #[test]
    fn starts_configured_scene() {
        let game = game();
        assert_eq!(game.current_scene(), Some("date_drive"));
    }

    #[test]
    fn shortcut_keys_jump_between_scenes() {
        let mut game = game();
        game.push_event(InputEvent::KeyDown(Key::Num5));
        assert_eq!(game.current_scene(), Some("dinner"));

        game.push_event(InputEvent::KeyDown(Key::Num3));
        game.push_event(InputEvent::KeyUp(Key::Num5));
        assert_eq!(game.current_scene(), Some("apartment"));

        game.push_event(InputEvent::KeyDown(Key::Num1));
        assert_eq!(game.current_scene(), Some("swipe"));
    }

    #[test]
    fn shortcut_to_unregistered_scene_keeps_current() {
        let mut registry = SceneRegistry::new();
        registry.register(SceneId::DateDrive, |config| {
            Box::new(crate::scenes::drive::DriveScene::new(
                SceneId::DateDrive,
                config.date_drive.clone(),
            ))
        });
        let mut game = Game::new(config(), registry);
        assert!(game.start());
        game.push_event(InputEvent::KeyDown(Key::Num5));
        assert_eq!(game.current_scene(), Some("date_drive"));
    }

    #[test]
    fn default_story_opens_on_swipe() {
        let config = GameConfig {
            asset_root: std::env::temp_dir().join("oa_game_test_assets_missing"),
            ..GameConfig::default()
        };
        let mut game = Game::new(config, SceneRegistry::story());
        assert!(game.start());
        assert_eq!(game.current_scene(), Some("swipe"));

        for key in [Key::X, Key::X, Key::X, Key::Space] {
            game.push_event(InputEvent::KeyDown(key));
            game.step();
            game.push_event(InputEvent::KeyUp(key));
        }
        // 1.2 s match beat at 60 Hz.
        for _ in 0..72 {
            game.step();
        }
        assert_eq!(game.current_scene(), Some("date_drive"));
    }

    #[test]
    fn frame_runs_whole_fixed_steps() {
        let mut game = game();
        assert_eq!(game.frame(0.125), 2);
        assert_eq!(game.frame(0.03125), 0);
        assert_eq!(game.frame(0.03125), 1);
        assert_eq!(game.time().fixed_step_count, 3);
    }

    #[test]
    fn drive_timer_advances_to_apartment() {
        let mut game = game();
        // Ten seconds at 16 steps per second, plus one.
        for _ in 0..161 {
            game.step();
        }
        assert_eq!(game.current_scene(), Some("apartment"));
    }

    #[test]
    fn pressed_keys_reach_exactly_one_step() {
        let mut game = game();
        game.push_event(InputEvent::KeyDown(Key::Space));
        assert!(game.input.is_just_pressed(Key::Space));
        game.step();
        assert!(!game.input.is_just_pressed(Key::Space));
        assert!(game.input.is_held(Key::Space));
    }

    #[test]
    fn draw_reaches_current_scene() {
        let game = game();
        let mut list = DrawList::new();
        game.draw(&mut list);
        assert!(list.sprites().any(|id| id == "vehicles/car"));
    }

    fn run_replay(raw: &str) -> (Option<&'static str>, Vec<String>) {
        let replay: ReplaySequence = serde_json::from_str(raw).expect("replay");
        let mut game = game();
        let mut player = ReplayPlayer::new(&replay);
        while let Some(events) = player.next_events() {
            for event in events {
                game.push_event(event);
            }
            game.step();
        }
        let mut list = DrawList::new();
        game.draw(&mut list);
        let texts = list.texts().map(str::to_string).collect();
        (game.current_scene(), texts)
    }

    #[test]
    fn replay_runs_are_deterministic() {
        let script = r#"{
          "frames": [
            { "held": ["w"], "repeat": 40 },
            { "held": ["s"], "repeat": 60 },
            { "pressed": ["3"] },
            { "held": ["d"], "repeat": 20 }
          ]
        }"#;
        let a = run_replay(script);
        let b = run_replay(script);
        assert_eq!(a, b);
        assert_eq!(a.0, Some("apartment"));
    }
}
