//! Collision underlay: axis-aligned rectangles kept separate from visuals.
//!
//! Art is drawn from sprite sheets and full-screen backgrounds, but gameplay
//! truth lives here as a flat list of obstacle rectangles plus named
//! interaction rectangles. Two resolution policies exist:
//!
//!  1. **Reject-and-revert** for top-down scenes: if the candidate position
//!     collides, the mover stays exactly where it was this frame.
//!  2. **Push-out** for the side-scrolling drive: the mover is translated out
//!     of each obstacle along the axis of least overlap, and the hit kicks off
//!     a decaying bump impulse.

use glam::Vec2;
use serde::Deserialize;

use oa_core::geometry::Rect;
use oa_core::timer::Countdown;

use crate::actor::Hitboxes;

/// Extra separation added on push-out so the pair does not re-collide on the
/// next query due to float rounding.
pub const SEPARATION_EPSILON: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    RejectAndRevert,
    PushOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRect {
    pub name: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    pub obstacles: Vec<Rect>,
    pub interactions: Vec<InteractionRect>,
}

impl CollisionWorld {
    pub fn new(obstacles: Vec<Rect>) -> Self {
        Self {
            obstacles,
            interactions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty() && self.interactions.is_empty()
    }

    pub fn add_obstacle(&mut self, rect: Rect) {
        self.obstacles.push(rect);
    }

    pub fn add_interaction(&mut self, name: impl Into<String>, rect: Rect) {
        self.interactions.push(InteractionRect {
            name: name.into(),
            rect,
        });
    }

    /// Four walls of `thickness` hugging the inside of `bounds`.
    pub fn add_boundary_walls(&mut self, bounds: Rect, thickness: f32) {
        self.obstacles.extend([
            Rect::new(bounds.x, bounds.y, bounds.w, thickness),
            Rect::new(bounds.x, bounds.bottom() - thickness, bounds.w, thickness),
            Rect::new(bounds.x, bounds.y, thickness, bounds.h),
            Rect::new(bounds.right() - thickness, bounds.y, thickness, bounds.h),
        ]);
    }

    /// Index of the first obstacle overlapping `rect`.
    pub fn first_blocking(&self, rect: &Rect) -> Option<usize> {
        self.obstacles.iter().position(|o| rect.overlaps(o))
    }

    pub fn interaction_at(&self, area: &Rect) -> Option<&InteractionRect> {
        self.interactions.iter().find(|i| area.overlaps(&i.rect))
    }

    pub fn interaction(&self, name: &str) -> Option<&InteractionRect> {
        self.interactions.iter().find(|i| i.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocker {
    Obstacle(usize),
    /// Index into the `others` slice passed to `resolve_reject`.
    Actor(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    pub position: Vec2,
    pub blocker: Option<Blocker>,
}

impl MoveOutcome {
    pub fn blocked(&self) -> bool {
        self.blocker.is_some()
    }
}

/// Reject-and-revert. The mover's body box is tested against the static
/// obstacles and its head box against `others` (head boxes of the other
/// actors). Any hit keeps `from` exactly.
pub fn resolve_reject(
    from: Vec2,
    to: Vec2,
    hitboxes: &Hitboxes,
    world: &CollisionWorld,
    others: &[Rect],
) -> MoveOutcome {
    if let Some(body) = hitboxes.body_at(to) {
        if let Some(index) = world.first_blocking(&body) {
            return MoveOutcome {
                position: from,
                blocker: Some(Blocker::Obstacle(index)),
            };
        }
    }

    if let Some(head) = hitboxes.head_at(to) {
        if let Some(index) = others.iter().position(|o| head.overlaps(o)) {
            return MoveOutcome {
                position: from,
                blocker: Some(Blocker::Actor(index)),
            };
        }
    }

    MoveOutcome {
        position: to,
        blocker: None,
    }
}

/// Direction the mover is pushed to leave the obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushAxis {
    Left,
    Right,
    Up,
    Down,
}

impl PushAxis {
    pub fn unit(self) -> Vec2 {
        match self {
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
        }
    }
}

/// Penetration depth on each side of an overlapping pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlaps {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Overlaps {
    /// `None` when the rectangles do not overlap.
    pub fn between(mover: &Rect, obstacle: &Rect) -> Option<Self> {
        if !mover.overlaps(obstacle) {
            return None;
        }
        Some(Self {
            left: mover.right() - obstacle.left(),
            right: obstacle.right() - mover.left(),
            top: mover.bottom() - obstacle.top(),
            bottom: obstacle.bottom() - mover.top(),
        })
    }

    /// Smallest overlap and the push that resolves it. Ties go to the first
    /// axis in left, right, top, bottom order.
    pub fn minimal(&self) -> (PushAxis, f32) {
        let candidates = [
            (PushAxis::Left, self.left),
            (PushAxis::Right, self.right),
            (PushAxis::Up, self.top),
            (PushAxis::Down, self.bottom),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1 < best.1 {
                best = *candidate;
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushOut {
    pub axis: PushAxis,
    pub depth: f32,
    pub delta: Vec2,
}

pub fn push_out(mover: &Rect, obstacle: &Rect) -> Option<PushOut> {
    let overlaps = Overlaps::between(mover, obstacle)?;
    let (axis, depth) = overlaps.minimal();
    Some(PushOut {
        axis,
        depth,
        delta: axis.unit() * (depth + SEPARATION_EPSILON),
    })
}

/// Push `mover` out of every obstacle in order. Returns the resolved rect and
/// the pushes that were applied, paired with obstacle indices.
pub fn resolve_push_out(mover: Rect, obstacles: &[Rect]) -> (Rect, Vec<(usize, PushOut)>) {
    let mut resolved = mover;
    let mut hits = Vec::new();
    for (index, obstacle) in obstacles.iter().enumerate() {
        if let Some(push) = push_out(&resolved, obstacle) {
            resolved = resolved.translated(push.delta);
            hits.push((index, push));
        }
    }
    (resolved, hits)
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BumpConfig {
    /// Initial bump speed, px/s.
    pub impulse: f32,
    /// Linear deceleration, px/s².
    pub friction: f32,
    /// Seconds before another hit can trigger a reaction.
    pub cooldown: f32,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            impulse: 240.0,
            friction: 900.0,
            cooldown: 0.8,
        }
    }
}

/// Transient knock-back after a push-out hit.
#[derive(Debug, Clone, Default)]
pub struct Bump {
    velocity: Vec2,
    cooldown: Countdown,
}

impl Bump {
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_active(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    pub fn can_react(&self) -> bool {
        self.cooldown.is_ready()
    }

    /// Start a bump along `axis` unless the cooldown from the previous one is
    /// still running. Returns true when the hit counts as a new reaction.
    pub fn trigger(&mut self, axis: PushAxis, config: &BumpConfig) -> bool {
        if !self.cooldown.is_ready() {
            return false;
        }
        self.velocity = axis.unit() * config.impulse;
        self.cooldown.start(config.cooldown);
        true
    }

    /// Advance one step; returns the displacement to apply this step.
    pub fn step(&mut self, dt: f32, config: &BumpConfig) -> Vec2 {
        self.cooldown.tick(dt);
        if !self.is_active() {
            return Vec2::ZERO;
        }
        let displacement = self.velocity * dt;
        let speed = self.velocity.length();
        let slowed = move_towards(speed, 0.0, config.friction * dt);
        self.velocity = if slowed > 0.0 {
            self.velocity * (slowed / speed)
        } else {
            Vec2::ZERO
        };
        displacement
    }

    pub fn clear(&mut self) {
        self.velocity = Vec2::ZERO;
        self.cooldown.cancel();
    }
}

pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else if target > current {
        current + max_delta
    } else {
        current - max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn reject_keeps_previous_position_against_obstacle() {
        let world = CollisionWorld::new(vec![Rect::new(140.0, 90.0, 50.0, 50.0)]);
        let hitboxes = Hitboxes {
            head: None,
            body: Some(Rect::new(0.0, 0.0, 48.0, 128.0)),
        };
        let from = Vec2::new(100.0, 100.0);
        let outcome = resolve_reject(from, Vec2::new(110.0, 100.0), &hitboxes, &world, &[]);

        assert_eq!(outcome.position, from);
        assert_eq!(outcome.blocker, Some(Blocker::Obstacle(0)));
    }

    #[test]
    fn reject_allows_clear_move() {
        let world = CollisionWorld::new(vec![Rect::new(400.0, 400.0, 10.0, 10.0)]);
        let hitboxes = Hitboxes::character(0.0, 48.0, 40.0, 128.0);
        let to = Vec2::new(110.0, 100.0);
        let outcome = resolve_reject(Vec2::new(100.0, 100.0), to, &hitboxes, &world, &[]);
        assert_eq!(outcome.position, to);
        assert!(!outcome.blocked());
    }

    #[test]
    fn reject_blocks_on_other_actor_head() {
        let hitboxes = Hitboxes::character(0.0, 48.0, 40.0, 128.0);
        let others = [
            Rect::new(900.0, 0.0, 48.0, 40.0),
            Rect::new(150.0, 110.0, 48.0, 40.0),
        ];
        let from = Vec2::new(100.0, 100.0);
        let outcome = resolve_reject(
            from,
            Vec2::new(110.0, 100.0),
            &hitboxes,
            &CollisionWorld::default(),
            &others,
        );
        assert_eq!(outcome.position, from);
        assert_eq!(outcome.blocker, Some(Blocker::Actor(1)));
    }

    #[test]
    fn unconfigured_hitboxes_and_empty_obstacles_never_collide() {
        let world = CollisionWorld::new(vec![
            Rect::new(0.0, 0.0, 0.0, 500.0),
            Rect::new(0.0, 0.0, 500.0, 0.0),
        ]);
        let full = Hitboxes::character(0.0, 48.0, 40.0, 128.0);
        let to = Vec2::new(10.0, 10.0);
        assert!(!resolve_reject(Vec2::ZERO, to, &full, &world, &[]).blocked());

        let solid = CollisionWorld::new(vec![Rect::new(0.0, 0.0, 500.0, 500.0)]);
        let none = Hitboxes::default();
        let outcome = resolve_reject(Vec2::ZERO, to, &none, &solid, &[Rect::new(0.0, 0.0, 500.0, 500.0)]);
        assert_eq!(outcome.position, to);
    }

    #[test]
    fn push_out_picks_left_for_smallest_overlap() {
        let overlaps = Overlaps {
            left: 5.0,
            right: 40.0,
            top: 30.0,
            bottom: 60.0,
        };
        assert_eq!(overlaps.minimal(), (PushAxis::Left, 5.0));
    }

    #[test]
    fn push_out_moves_exactly_the_overlap() {
        // Overlaps: left 5, right 40, top 30, bottom 60.
        let mover = Rect::new(0.0, 0.0, 20.0, 50.0);
        let obstacle = Rect::new(15.0, 20.0, 25.0, 40.0);
        let overlaps = Overlaps::between(&mover, &obstacle).expect("overlapping");
        assert_eq!(
            overlaps,
            Overlaps {
                left: 5.0,
                right: 40.0,
                top: 30.0,
                bottom: 60.0
            }
        );

        let push = push_out(&mover, &obstacle).expect("overlapping");
        assert_eq!(push.axis, PushAxis::Left);
        assert!(approx(push.depth, 5.0));
        assert!(approx(push.delta.x, -5.0));
        assert_eq!(push.delta.y, 0.0);

        let moved = mover.translated(push.delta);
        assert!(!moved.overlaps(&obstacle));
    }

    #[test]
    fn push_out_square_scenario() {
        let mover = Rect::new(200.0, 200.0, 40.0, 40.0);
        let obstacle = Rect::new(230.0, 210.0, 40.0, 40.0);
        let push = push_out(&mover, &obstacle).expect("overlapping");
        assert_eq!(push.axis, PushAxis::Left);

        let moved = mover.translated(push.delta);
        assert!(approx(moved.x, obstacle.left() - 40.0 - SEPARATION_EPSILON));
        assert!(moved.x < 190.0);
        assert_eq!(moved.y, 200.0);
    }

    #[test]
    fn push_out_ties_go_to_lowest_axis() {
        // Centered overlap: every side overlaps by the same amount.
        let mover = Rect::new(0.0, 0.0, 10.0, 10.0);
        let push = push_out(&mover, &mover).expect("overlapping");
        assert_eq!(push.axis, PushAxis::Left);

        // top == bottom and both smaller than left/right.
        let wide = Rect::new(0.0, 0.0, 100.0, 10.0);
        let bar = Rect::new(-10.0, 0.0, 120.0, 10.0);
        assert_eq!(push_out(&wide, &bar).unwrap().axis, PushAxis::Up);
    }

    #[test]
    fn push_out_none_without_overlap() {
        let mover = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(push_out(&mover, &Rect::new(10.0, 0.0, 10.0, 10.0)).is_none());
        assert!(push_out(&mover, &Rect::new(5.0, 5.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn resolve_push_out_handles_several_obstacles() {
        let mover = Rect::new(100.0, 100.0, 20.0, 20.0);
        let obstacles = [
            Rect::new(115.0, 90.0, 40.0, 40.0),
            Rect::new(0.0, 0.0, 5.0, 5.0),
        ];
        let (resolved, hits) = resolve_push_out(mover, &obstacles);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 0);
        assert!(!obstacles.iter().any(|o| resolved.overlaps(o)));
    }

    #[test]
    fn bump_decays_linearly_to_zero() {
        let config = BumpConfig {
            impulse: 100.0,
            friction: 400.0,
            cooldown: 0.5,
        };
        let mut bump = Bump::default();
        assert!(bump.trigger(PushAxis::Left, &config));
        assert_eq!(bump.velocity(), Vec2::new(-100.0, 0.0));

        let d = bump.step(0.1, &config);
        assert!(approx(d.x, -10.0));
        assert!(approx(bump.velocity().x, -60.0));

        bump.step(0.1, &config);
        bump.step(0.1, &config);
        assert!(!bump.is_active());
        assert_eq!(bump.step(0.1, &config), Vec2::ZERO);
    }

    #[test]
    fn bump_cooldown_gates_reactions() {
        let config = BumpConfig {
            impulse: 50.0,
            friction: 1000.0,
            cooldown: 0.5,
        };
        let mut bump = Bump::default();
        assert!(bump.trigger(PushAxis::Up, &config));
        assert!(!bump.trigger(PushAxis::Up, &config));
        bump.step(0.3, &config);
        assert!(!bump.can_react());
        bump.step(0.3, &config);
        assert!(bump.can_react());
        assert!(bump.trigger(PushAxis::Down, &config));
    }

    #[test]
    fn boundary_walls_enclose_bounds() {
        let mut world = CollisionWorld::default();
        world.add_boundary_walls(Rect::new(0.0, 0.0, 100.0, 50.0), 5.0);
        assert_eq!(world.obstacles.len(), 4);
        assert!(world.first_blocking(&Rect::new(-2.0, 20.0, 4.0, 4.0)).is_some());
        assert!(world.first_blocking(&Rect::new(97.0, 20.0, 4.0, 4.0)).is_some());
        assert!(world.first_blocking(&Rect::new(20.0, 48.0, 4.0, 4.0)).is_some());
        assert!(world.first_blocking(&Rect::new(40.0, 20.0, 4.0, 4.0)).is_none());
    }

    #[test]
    fn interaction_lookup() {
        let mut world = CollisionWorld::default();
        world.add_interaction("box", Rect::new(0.0, 0.0, 10.0, 10.0));
        world.add_interaction("wine_bottle", Rect::new(20.0, 0.0, 10.0, 10.0));
        let area = Rect::new(22.0, 2.0, 2.0, 2.0);
        assert_eq!(world.interaction_at(&area).unwrap().name, "wine_bottle");
        assert!(world.interaction("box").is_some());
        assert!(world.interaction_at(&Rect::new(50.0, 50.0, 1.0, 1.0)).is_none());
    }
}
