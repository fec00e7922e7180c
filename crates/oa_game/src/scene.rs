//! Scene lifecycle, registry and manager.
//!
//! Exactly one scene is current. Scenes never switch themselves: `update`
//! returns a `SceneCommand` and the manager applies it after the frame. Scene
//! identifiers resolve to constructors through `SceneRegistry`, so scene
//! modules do not import each other.

use std::collections::HashMap;

use serde::Deserialize;

use oa_core::input::{InputEvent, InputState};

use crate::assets::Assets;
use crate::config::GameConfig;
use crate::render::Renderer;
use crate::scenes::transition::TransitionScene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneId {
    Swipe,
    DateDrive,
    Apartment,
    MovingDrive,
    Dinner,
}

impl SceneId {
    pub const ALL: [SceneId; 5] = [
        SceneId::Swipe,
        SceneId::DateDrive,
        SceneId::Apartment,
        SceneId::MovingDrive,
        SceneId::Dinner,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Swipe => "swipe",
            Self::DateDrive => "date_drive",
            Self::Apartment => "apartment",
            Self::MovingDrive => "moving_drive",
            Self::Dinner => "dinner",
        }
    }

    pub fn from_name(name: &str) -> Option<SceneId> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(name))
    }

    /// Number-key jump used for playtesting (1 = first scene).
    pub fn from_shortcut(digit: u8) -> Option<SceneId> {
        Self::ALL.get(usize::from(digit).checked_sub(1)?).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    Continue,
    GoTo(SceneId),
    /// Show a full-screen message, then continue to `next` (or finish the
    /// story when `None`).
    Transition {
        message: String,
        next: Option<SceneId>,
    },
    Finish,
}

pub trait Scene {
    fn name(&self) -> &'static str;

    /// Called once when the scene becomes current. Actors, collision data
    /// and timers are created here, not in the constructor.
    fn start(&mut self, assets: &mut Assets) -> Result<(), String>;

    /// Called once when the scene is replaced.
    fn end(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn handle_event(&mut self, _event: InputEvent) {}

    fn update(&mut self, dt: f32, input: &InputState) -> SceneCommand;

    fn draw(&self, renderer: &mut dyn Renderer);
}

pub type SceneFactory = Box<dyn Fn(&GameConfig) -> Box<dyn Scene>>;

#[derive(Default)]
pub struct SceneRegistry {
    factories: HashMap<SceneId, SceneFactory>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every story scene.
    pub fn story() -> Self {
        use crate::scenes::{
            apartment::ApartmentScene, dinner::DinnerScene, drive::DriveScene, swipe::SwipeScene,
        };

        let mut registry = Self::new();
        registry.register(SceneId::Swipe, |config| {
            Box::new(SwipeScene::new(config.swipe.clone()))
        });
        registry.register(SceneId::DateDrive, |config| {
            Box::new(DriveScene::new(SceneId::DateDrive, config.date_drive.clone()))
        });
        registry.register(SceneId::Apartment, |config| {
            Box::new(ApartmentScene::new(config.apartment.clone(), config))
        });
        registry.register(SceneId::MovingDrive, |config| {
            Box::new(DriveScene::new(SceneId::MovingDrive, config.moving_drive.clone()))
        });
        registry.register(SceneId::Dinner, |config| {
            Box::new(DinnerScene::new(config.dinner.clone(), config))
        });
        registry
    }

    pub fn register<F>(&mut self, id: SceneId, factory: F)
    where
        F: Fn(&GameConfig) -> Box<dyn Scene> + 'static,
    {
        self.factories.insert(id, Box::new(factory));
    }

    pub fn contains(&self, id: SceneId) -> bool {
        self.factories.contains_key(&id)
    }

    pub fn create(&self, id: SceneId, config: &GameConfig) -> Option<Box<dyn Scene>> {
        self.factories.get(&id).map(|factory| factory(config))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Started,
    Active,
    Ended,
}

pub struct SceneManager {
    registry: SceneRegistry,
    config: GameConfig,
    current: Option<Box<dyn Scene>>,
    phase: ScenePhase,
    finished: bool,
}

impl SceneManager {
    pub fn new(registry: SceneRegistry, config: GameConfig) -> Self {
        Self {
            registry,
            config,
            current: None,
            phase: ScenePhase::Ended,
            finished: false,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.current.as_ref().map(|scene| scene.name())
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    /// True once a scene asked to finish the story.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// End the current scene, then start `scene`. Lifecycle errors are
    /// logged and swallowed; the new scene becomes current regardless.
    pub fn go_to(&mut self, mut scene: Box<dyn Scene>, assets: &mut Assets) {
        self.end_current();

        log::info!("Starting scene '{}'", scene.name());
        if let Err(err) = scene.start(assets) {
            log::error!("Scene '{}' failed to start: {}", scene.name(), err);
        }
        self.phase = ScenePhase::Started;
        self.current = Some(scene);
    }

    pub fn go_to_id(&mut self, id: SceneId, assets: &mut Assets) -> bool {
        match self.registry.create(id, &self.config) {
            Some(scene) => {
                self.go_to(scene, assets);
                true
            }
            None => {
                log::warn!("Scene '{}' is not registered", id.name());
                false
            }
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        if let Some(scene) = self.current.as_mut() {
            scene.handle_event(event);
        }
    }

    pub fn update(&mut self, dt: f32, input: &InputState, assets: &mut Assets) {
        let Some(scene) = self.current.as_mut() else {
            return;
        };
        self.phase = ScenePhase::Active;
        let command = scene.update(dt, input);
        self.apply(command, assets);
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        if let Some(scene) = self.current.as_ref() {
            scene.draw(renderer);
        }
    }

    fn apply(&mut self, command: SceneCommand, assets: &mut Assets) {
        match command {
            SceneCommand::Continue => {}
            SceneCommand::GoTo(id) => {
                self.go_to_id(id, assets);
            }
            SceneCommand::Transition { message, next } => {
                let transition = TransitionScene::new(message, next, self.config.transition.clone());
                self.go_to(Box::new(transition), assets);
            }
            SceneCommand::Finish => {
                self.end_current();
                self.finished = true;
                log::info!("Story finished");
            }
        }
    }

    fn end_current(&mut self) {
        if let Some(mut old) = self.current.take() {
            if let Err(err) = old.end() {
                log::error!("Scene '{}' failed to end cleanly: {}", old.name(), err);
            }
            log::info!("Scene '{}' ended", old.name());
        }
        self.phase = ScenePhase::Ended;
    }
}
