//! Draw back-ends.
//!
//! Scenes only see the `Renderer` trait. `DrawList` records commands for
//! tests and headless logging; `SoftwareCanvas` rasterizes sprites from a
//! `SpriteStore` into an RGBA framebuffer that can be written out as PNG.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use image::{Rgba, RgbaImage};
use oa_core::geometry::Rect;

pub type Color = [u8; 4];

pub trait Renderer {
    /// Blit a sprite with its top-left corner at (x, y).
    fn draw_sprite(&mut self, sprite_id: &str, x: f32, y: f32, scale: f32);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Text is rendered by an external collaborator; back-ends without a
    /// font may ignore it.
    fn draw_text(&mut self, _text: &str, _x: f32, _y: f32) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite {
        sprite_id: String,
        x: f32,
        y: f32,
        scale: f32,
    },
    Rect {
        rect: Rect,
        color: Color,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
    },
}

#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn sprite_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Sprite { .. }))
            .count()
    }

    pub fn sprites(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Sprite { sprite_id, .. } => Some(sprite_id.as_str()),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Renderer for DrawList {
    fn draw_sprite(&mut self, sprite_id: &str, x: f32, y: f32, scale: f32) {
        self.commands.push(DrawCommand::Sprite {
            sprite_id: sprite_id.to_string(),
            x,
            y,
            scale,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
        });
    }
}

/// Decoded sprite pixels keyed by sprite id.
#[derive(Default)]
pub struct SpriteStore {
    sprites: HashMap<String, RgbaImage>,
}

impl SpriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sprite_id: impl Into<String>, pixels: RgbaImage) {
        self.sprites.insert(sprite_id.into(), pixels);
    }

    pub fn get(&self, sprite_id: &str) -> Option<&RgbaImage> {
        self.sprites.get(sprite_id)
    }

    pub fn contains(&self, sprite_id: &str) -> bool {
        self.sprites.contains_key(sprite_id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

pub struct SoftwareCanvas {
    frame: RgbaImage,
    missing: HashSet<String>,
}

impl SoftwareCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: RgbaImage::new(width, height),
            missing: HashSet::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    pub fn clear(&mut self, color: Color) {
        for pixel in self.frame.pixels_mut() {
            *pixel = Rgba(color);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.frame.width() && y < self.frame.height() {
            Some(self.frame.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// Begin a draw pass that resolves sprite ids against `store`.
    pub fn pass<'a>(&'a mut self, store: &'a SpriteStore) -> CanvasPass<'a> {
        CanvasPass {
            canvas: self,
            store,
        }
    }

    pub fn save_png(&self, path: &Path) -> Result<(), String> {
        self.frame
            .save(path)
            .map_err(|e| format!("Failed to write snapshot {}: {e}", path.display()))
    }

    fn blend(&mut self, x: i64, y: i64, src: Color) {
        if x < 0 || y < 0 || x >= self.frame.width() as i64 || y >= self.frame.height() as i64 {
            return;
        }
        let alpha = src[3] as u32;
        if alpha == 0 {
            return;
        }
        let dst = self.frame.get_pixel_mut(x as u32, y as u32);
        if alpha == 255 {
            *dst = Rgba(src);
            return;
        }
        let inv = 255 - alpha;
        for c in 0..3 {
            dst.0[c] = ((src[c] as u32 * alpha + dst.0[c] as u32 * inv) / 255) as u8;
        }
        dst.0[3] = (alpha + dst.0[3] as u32 * inv / 255).min(255) as u8;
    }
}

/// A canvas borrowed together with the sprite pixels it draws from.
pub struct CanvasPass<'a> {
    canvas: &'a mut SoftwareCanvas,
    store: &'a SpriteStore,
}

impl Renderer for CanvasPass<'_> {
    fn draw_sprite(&mut self, sprite_id: &str, x: f32, y: f32, scale: f32) {
        let Some(src) = self.store.get(sprite_id) else {
            if self.canvas.missing.insert(sprite_id.to_string()) {
                log::warn!("Sprite '{}' is not loaded; skipping draw", sprite_id);
            }
            return;
        };
        if scale <= 0.0 {
            return;
        }

        // Nearest-neighbour: each destination pixel samples the source texel
        // under its center.
        let dst_w = (src.width() as f32 * scale).round() as i64;
        let dst_h = (src.height() as f32 * scale).round() as i64;
        let origin_x = x.round() as i64;
        let origin_y = y.round() as i64;
        for dy in 0..dst_h {
            let sy = (((dy as f32 + 0.5) / scale) as u32).min(src.height() - 1);
            for dx in 0..dst_w {
                let sx = (((dx as f32 + 0.5) / scale) as u32).min(src.width() - 1);
                let texel = src.get_pixel(sx, sy).0;
                self.canvas.blend(origin_x + dx, origin_y + dy, texel);
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        let x0 = rect.left().round() as i64;
        let y0 = rect.top().round() as i64;
        let x1 = rect.right().round() as i64;
        let y1 = rect.bottom().round() as i64;
        for y in y0.max(0)..y1.min(self.canvas.height() as i64) {
            for x in x0.max(0)..x1.min(self.canvas.width() as i64) {
                self.canvas.blend(x, y, color);
            }
        }
    }
}
