//! Characters placed in a scene.

use glam::Vec2;
use serde::Deserialize;

use oa_core::geometry::Rect;

use crate::animation::AnimationManager;
use crate::render::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Facing for scripted motion: the dominant axis wins, vertical on ties.
    pub fn from_direction(dir: Vec2) -> Option<Facing> {
        if dir == Vec2::ZERO {
            return None;
        }
        if dir.x.abs() > dir.y.abs() {
            Some(if dir.x < 0.0 { Self::Left } else { Self::Right })
        } else {
            Some(if dir.y < 0.0 { Self::Up } else { Self::Down })
        }
    }

    /// Facing for keyboard motion: any vertical intent wins over horizontal.
    pub fn from_input_axis(axis: Vec2) -> Option<Facing> {
        if axis.y < 0.0 {
            Some(Self::Up)
        } else if axis.y > 0.0 {
            Some(Self::Down)
        } else if axis.x < 0.0 {
            Some(Self::Left)
        } else if axis.x > 0.0 {
            Some(Self::Right)
        } else {
            None
        }
    }
}

/// Hitboxes as offsets from the actor position. `None` means that box never
/// collides.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Hitboxes {
    pub head: Option<Rect>,
    pub body: Option<Rect>,
}

impl Hitboxes {
    /// Narrow head box for actor-vs-actor checks and a tall body box for the
    /// environment, both anchored at the same horizontal inset.
    pub fn character(inset_x: f32, width: f32, head_h: f32, body_h: f32) -> Self {
        Self {
            head: Some(Rect::new(inset_x, 0.0, width, head_h)),
            body: Some(Rect::new(inset_x, 0.0, width, body_h)),
        }
    }

    pub fn head_at(&self, position: Vec2) -> Option<Rect> {
        self.head.map(|r| r.translated(position))
    }

    pub fn body_at(&self, position: Vec2) -> Option<Rect> {
        self.body.map(|r| r.translated(position))
    }
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub position: Vec2,
    pub facing: Facing,
    pub moving: bool,
    pub hitboxes: Hitboxes,
    pub anim: AnimationManager,
    pub scale: f32,
    /// When set, locomotion no longer drives the animation (seated, emoting).
    pub pose_locked: bool,
}

impl Actor {
    pub fn new(name: impl Into<String>, position: Vec2, facing: Facing) -> Self {
        Self {
            name: name.into(),
            position,
            facing,
            moving: false,
            hitboxes: Hitboxes::default(),
            anim: AnimationManager::new(),
            scale: 1.0,
            pose_locked: false,
        }
    }

    pub fn with_hitboxes(mut self, hitboxes: Hitboxes) -> Self {
        self.hitboxes = hitboxes;
        self
    }

    pub fn with_animations(mut self, anim: AnimationManager) -> Self {
        self.anim = anim;
        self.sync_animation();
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn head_box(&self) -> Option<Rect> {
        self.hitboxes.head_at(self.position)
    }

    pub fn body_box(&self) -> Option<Rect> {
        self.hitboxes.body_at(self.position)
    }

    /// "walk_left", "idle_down", ...
    pub fn locomotion_clip(&self) -> String {
        let verb = if self.moving { "walk" } else { "idle" };
        format!("{}_{}", verb, self.facing.name())
    }

    /// Select the clip matching the movement state. Falls back to the
    /// undirected clip for characters with a single walk or idle strip.
    pub fn sync_animation(&mut self) {
        if self.pose_locked {
            return;
        }
        let directed = self.locomotion_clip();
        let plain = if self.moving { "walk" } else { "idle" };
        self.anim.play_first(&[directed.as_str(), plain]);
    }

    pub fn set_motion(&mut self, facing: Option<Facing>, moving: bool) {
        if let Some(facing) = facing {
            self.facing = facing;
        }
        self.moving = moving;
        self.sync_animation();
    }

    pub fn update_animation(&mut self, dt_us: u64) {
        self.anim.update(dt_us);
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        self.anim
            .draw(renderer, self.position.x, self.position.y, self.scale);
    }
}

/// The actors of one scene, addressed by name from cutscene scripts.
#[derive(Debug, Default, Clone)]
pub struct ActorSet {
    actors: Vec<Actor>,
}

impl ActorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, actor: Actor) {
        if let Some(slot) = self.actors.iter_mut().find(|a| a.name == actor.name) {
            *slot = actor;
        } else {
            self.actors.push(actor);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| a.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn clear(&mut self) {
        self.actors.clear();
    }

    /// Head boxes of every actor except `name`.
    pub fn head_boxes_except(&self, name: &str) -> Vec<Rect> {
        self.actors
            .iter()
            .filter(|a| a.name != name)
            .filter_map(Actor::head_box)
            .collect()
    }

    /// Draw back to front by feet position so lower actors overlap higher ones.
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        let mut order: Vec<&Actor> = self.actors.iter().collect();
        order.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
        for actor in order {
            actor.draw(renderer);
        }
    }
}
