//! Full-screen story message between scenes: typewriter text over black with
//! a fade in and a fade out.

use serde::Deserialize;

use oa_core::geometry::Rect;
use oa_core::input::InputState;

use crate::assets::Assets;
use crate::render::Renderer;
use crate::scene::{Scene, SceneCommand, SceneId};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TransitionConfig {
    /// Total seconds on screen.
    pub duration: f32,
    /// Characters revealed per second.
    pub type_speed: f32,
    pub fade_in: f32,
    pub fade_out: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration: 5.0,
            type_speed: 15.0,
            fade_in: 1.0,
            fade_out: 1.0,
            width: 1280.0,
            height: 800.0,
        }
    }
}

pub struct TransitionScene {
    message: String,
    next: Option<SceneId>,
    config: TransitionConfig,
    elapsed: f32,
    done: bool,
}

impl TransitionScene {
    pub fn new(message: String, next: Option<SceneId>, config: TransitionConfig) -> Self {
        Self {
            message,
            next,
            config,
            elapsed: 0.0,
            done: false,
        }
    }

    pub fn next(&self) -> Option<SceneId> {
        self.next
    }

    /// The part of the message typed so far.
    pub fn visible_text(&self) -> &str {
        let count = (self.elapsed * self.config.type_speed).max(0.0) as usize;
        match self.message.char_indices().nth(count) {
            Some((end, _)) => &self.message[..end],
            None => &self.message,
        }
    }

    /// Black overlay opacity, 1 at both ends of the transition.
    pub fn overlay_alpha(&self) -> f32 {
        let fade_in = if self.config.fade_in > 0.0 {
            1.0 - (self.elapsed / self.config.fade_in).min(1.0)
        } else {
            0.0
        };
        let until_end = self.config.duration - self.elapsed;
        let fade_out = if self.config.fade_out > 0.0 {
            1.0 - (until_end / self.config.fade_out).clamp(0.0, 1.0)
        } else {
            0.0
        };
        fade_in.max(fade_out)
    }
}

impl Scene for TransitionScene {
    fn name(&self) -> &'static str {
        "transition"
    }

    fn start(&mut self, _assets: &mut Assets) -> Result<(), String> {
        self.elapsed = 0.0;
        self.done = false;
        log::info!("Transition: \"{}\"", self.message);
        Ok(())
    }

    fn update(&mut self, dt: f32, _input: &InputState) -> SceneCommand {
        if self.done {
            return SceneCommand::Continue;
        }
        self.elapsed += dt;
        if self.elapsed < self.config.duration {
            return SceneCommand::Continue;
        }
        self.done = true;
        match self.next {
            Some(id) => SceneCommand::GoTo(id),
            None => SceneCommand::Finish,
        }
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let screen = Rect::new(0.0, 0.0, self.config.width, self.config.height);
        renderer.fill_rect(screen, [0, 0, 0, 255]);
        renderer.draw_text(
            self.visible_text(),
            self.config.width * 0.1,
            self.config.height * 0.45,
        );
        let alpha = (self.overlay_alpha() * 255.0).round() as u8;
        if alpha > 0 {
            renderer.fill_rect(screen, [0, 0, 0, alpha]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;

    fn scene(next: Option<SceneId>) -> TransitionScene {
        TransitionScene::new("Later that year".to_string(), next, TransitionConfig::default())
    }

    #[test]
    fn text_types_out_over_time() {
        let mut scene = scene(None);
        let input = InputState::new();
        assert_eq!(scene.visible_text(), "");

        scene.update(0.2, &input);
        assert_eq!(scene.visible_text(), "Lat");

        scene.update(2.0, &input);
        assert_eq!(scene.visible_text(), "Later that year");
    }

    #[test]
    fn goes_to_next_scene_after_duration() {
        let mut scene = scene(Some(SceneId::MovingDrive));
        let input = InputState::new();
        assert_eq!(scene.update(4.0, &input), SceneCommand::Continue);
        assert_eq!(scene.update(1.0, &input), SceneCommand::GoTo(SceneId::MovingDrive));
        assert_eq!(scene.update(1.0, &input), SceneCommand::Continue);
    }

    #[test]
    fn finishes_story_without_next() {
        let mut scene = scene(None);
        assert_eq!(scene.update(5.0, &InputState::new()), SceneCommand::Finish);
    }

    #[test]
    fn fades_in_and_out() {
        let mut scene = scene(None);
        let input = InputState::new();
        assert_eq!(scene.overlay_alpha(), 1.0);

        scene.update(0.5, &input);
        assert!((scene.overlay_alpha() - 0.5).abs() < 1e-5);

        scene.update(2.0, &input);
        assert_eq!(scene.overlay_alpha(), 0.0);

        scene.update(2.0, &input);
        assert!((scene.overlay_alpha() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn draw_emits_typed_text() {
        let mut scene = scene(None);
        scene.update(2.0, &InputState::new());
        let mut list = DrawList::new();
        scene.draw(&mut list);
        assert_eq!(list.texts().collect::<Vec<_>>(), vec!["Later that year"]);
    }
}
