//! Per-actor animation manager.
//!
//! Wraps the core `AnimationClip` type from `oa_core::animation` and keeps a
//! named set of clips for one character, with at most one of them current.

use std::collections::HashMap;

use oa_core::animation::{AnimationClip, AnimationFrame};

use crate::render::Renderer;

#[derive(Debug, Default, Clone)]
pub struct AnimationManager {
    clips: HashMap<String, AnimationClip>,
    current: Option<String>,
}

impl AnimationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip, replacing any clip with the same name.
    pub fn add(&mut self, name: impl Into<String>, clip: AnimationClip) {
        self.clips.insert(name.into(), clip);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_clip(&self) -> Option<&AnimationClip> {
        self.current.as_ref().and_then(|name| self.clips.get(name))
    }

    /// Switch to `name` and rewind it. Re-playing the current clip is a no-op
    /// so a walk cycle is not restarted every frame; unknown names are ignored.
    pub fn play(&mut self, name: &str) -> bool {
        if self.current.as_deref() == Some(name) {
            return false;
        }
        let Some(clip) = self.clips.get_mut(name) else {
            log::trace!("Animation '{}' not found; keeping current clip", name);
            return false;
        };
        clip.reset();
        self.current = Some(name.to_string());
        true
    }

    /// Play the first clip in `names` that exists. Returns the chosen name.
    pub fn play_first<'a>(&mut self, names: &[&'a str]) -> Option<&'a str> {
        let chosen = names.iter().copied().find(|name| self.contains(name))?;
        self.play(chosen);
        Some(chosen)
    }

    /// Switch to `name` and freeze it on its last visible frame.
    pub fn hold_last(&mut self, name: &str) -> bool {
        let Some(clip) = self.clips.get_mut(name) else {
            log::trace!("Animation '{}' not found; cannot hold", name);
            return false;
        };
        clip.hold_last();
        self.current = Some(name.to_string());
        true
    }

    pub fn update(&mut self, dt_us: u64) {
        if let Some(clip) = self.current.as_ref().and_then(|n| self.clips.get_mut(n)) {
            clip.update(dt_us);
        }
    }

    pub fn current_frame(&self) -> Option<&AnimationFrame> {
        self.current_clip()?.current_frame()
    }

    /// Draw the current frame; nothing is drawn without one.
    pub fn draw(&self, renderer: &mut dyn Renderer, x: f32, y: f32, scale: f32) {
        if let Some(frame) = self.current_frame() {
            renderer.draw_sprite(&frame.sprite_id, x, y, scale);
        }
    }
}
