//! Dialogue box state. Layout and word-wrap live in the renderer; this module
//! only tracks which line is showing.

use oa_core::geometry::Rect;
use oa_core::timer::Countdown;

use crate::render::Renderer;

/// Minimal surface the cutscene sequencer and scenes rely on.
pub trait Dialogue {
    fn is_showing(&self) -> bool;

    /// Move to the next line; advancing past the last line hides the box.
    fn advance(&mut self);

    fn show(&mut self, lines: Vec<String>);

    fn hide(&mut self);

    fn current_line(&self) -> Option<&str>;
}

#[derive(Debug, Default, Clone)]
pub struct DialogueBox {
    lines: Vec<String>,
    index: usize,
    visible: bool,
}

impl DialogueBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&self, renderer: &mut dyn Renderer, area: Rect) {
        let Some(line) = self.current_line() else {
            return;
        };
        renderer.fill_rect(area, [20, 20, 30, 220]);
        renderer.draw_text(line, area.x + 16.0, area.y + 16.0);
    }
}

impl Dialogue for DialogueBox {
    fn is_showing(&self) -> bool {
        self.visible
    }

    fn advance(&mut self) {
        if !self.visible {
            return;
        }
        self.index += 1;
        if self.index >= self.lines.len() {
            self.hide();
        }
    }

    fn show(&mut self, lines: Vec<String>) {
        self.visible = !lines.is_empty();
        self.lines = lines;
        self.index = 0;
    }

    fn hide(&mut self) {
        self.visible = false;
        self.lines.clear();
        self.index = 0;
    }

    fn current_line(&self) -> Option<&str> {
        if !self.visible {
            return None;
        }
        self.lines.get(self.index).map(String::as_str)
    }
}

/// Rate limit on advancing, so one long key press does not skip lines.
#[derive(Debug, Clone)]
pub struct AdvanceGate {
    interval: f32,
    cooldown: Countdown,
}

impl AdvanceGate {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            cooldown: Countdown::default(),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown.tick(dt);
    }

    /// Advance `dialogue` if it is showing and the cooldown has elapsed.
    pub fn try_advance(&mut self, dialogue: &mut dyn Dialogue) -> bool {
        if !dialogue.is_showing() || !self.cooldown.is_ready() {
            return false;
        }
        dialogue.advance();
        self.cooldown.start(self.interval);
        true
    }
}

pub fn lines(text: &[&str]) -> Vec<String> {
    text.iter().map(|line| line.to_string()).collect()
}
