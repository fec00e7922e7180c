//! Dating-app swipe. Profiles come up one at a time; rejecting moves to the
//! next one and accepting only sticks on the match. A short beat after the
//! match the story moves on.

use serde::Deserialize;

use oa_core::geometry::Rect;
use oa_core::input::{InputEvent, InputState, Key};
use oa_core::timer::Countdown;

use crate::assets::Assets;
use crate::render::Renderer;
use crate::scene::{Scene, SceneCommand, SceneId};

const HINT: &str = "X or Left to reject, Space or Enter to accept";
const MATCH_BANNER: &str = "It's a match!";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub bio: String,
    #[serde(default, rename = "match")]
    pub is_match: bool,
}

impl Profile {
    fn new(name: &str, bio: &str, is_match: bool) -> Self {
        Self {
            name: name.to_string(),
            bio: bio.to_string(),
            is_match,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SwipeConfig {
    pub profiles: Vec<Profile>,
    /// Seconds the match banner stays up before moving on.
    pub match_delay: f32,
    pub width: f32,
    pub height: f32,
    pub next: Option<SceneId>,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            profiles: vec![
                Profile::new("Profile 1", "If you can't handle me at my worst...", false),
                Profile::new("Profile 2", "I am not really single...", false),
                Profile::new(
                    "Profile 3",
                    "successful software engineer, has a cute dog and super cute",
                    false,
                ),
                Profile::new("Shani", "THIS ONE IS CUTE", true),
            ],
            match_delay: 1.2,
            width: 1280.0,
            height: 800.0,
            next: Some(SceneId::DateDrive),
        }
    }
}

impl SwipeConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.profiles.iter().any(|p| p.is_match) {
            return Err("no profile is marked as the match".to_string());
        }
        if self.match_delay < 0.0 {
            return Err(format!("match_delay must be >= 0 (got {})", self.match_delay));
        }
        Ok(())
    }
}

pub struct SwipeScene {
    config: SwipeConfig,
    index: usize,
    matched: bool,
    delay: Countdown,
    done: bool,
}

impl SwipeScene {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            index: 0,
            matched: false,
            delay: Countdown::default(),
            done: false,
        }
    }

    pub fn current(&self) -> Option<&Profile> {
        self.config.profiles.get(self.index)
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    /// Next profile; the last one stays up.
    fn reject(&mut self) {
        if self.index + 1 < self.config.profiles.len() {
            self.index += 1;
        }
    }

    /// Accepting anyone but the match counts as a pass.
    fn accept(&mut self) {
        let Some(profile) = self.config.profiles.get(self.index) else {
            return;
        };
        if !profile.is_match {
            self.reject();
            return;
        }
        log::info!("Matched with {}", profile.name);
        self.matched = true;
        self.delay.start(self.config.match_delay);
    }

    fn card(&self) -> Rect {
        let (w, h) = (700.0, 300.0);
        Rect::new(
            (self.config.width - w) / 2.0,
            (self.config.height - h) / 2.0,
            w,
            h,
        )
    }
}

impl Scene for SwipeScene {
    fn name(&self) -> &'static str {
        SceneId::Swipe.name()
    }

    fn start(&mut self, _assets: &mut Assets) -> Result<(), String> {
        self.index = 0;
        self.matched = false;
        self.done = false;
        self.delay.cancel();
        self.config.validate()
    }

    fn handle_event(&mut self, event: InputEvent) {
        let InputEvent::KeyDown(key) = event else {
            return;
        };
        if self.matched {
            return;
        }
        match key {
            Key::X | Key::Left | Key::A => self.reject(),
            Key::Enter | Key::Space | Key::Right | Key::D => self.accept(),
            _ => {}
        }
    }

    fn update(&mut self, dt: f32, _input: &InputState) -> SceneCommand {
        if !self.matched || self.done || !self.delay.tick(dt) {
            return SceneCommand::Continue;
        }
        self.done = true;
        match self.config.next {
            Some(next) => SceneCommand::GoTo(next),
            None => SceneCommand::Finish,
        }
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        renderer.fill_rect(
            Rect::new(0.0, 0.0, self.config.width, self.config.height),
            [40, 30, 60, 255],
        );
        let card = self.card();
        renderer.fill_rect(card, [230, 230, 240, 255]);
        if let Some(profile) = self.current() {
            renderer.draw_text(&profile.name, card.x + 20.0, card.y + 20.0);
            renderer.draw_text(&profile.bio, card.x + 20.0, card.y + 70.0);
        }
        renderer.draw_text(HINT, card.x + 20.0, card.bottom() - 44.0);
        if self.matched {
            renderer.draw_text(MATCH_BANNER, card.x + 250.0, card.y - 64.0);
        }
    }
}
