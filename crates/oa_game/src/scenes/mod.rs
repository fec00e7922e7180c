//! Story scenes. Each one composes actors, a collision world, a dialogue box
//! and cutscenes for one narrative beat.

pub mod apartment;
pub mod dinner;
pub mod drive;
pub mod swipe;
pub mod transition;

use glam::Vec2;
use serde::Deserialize;

use oa_core::geometry::Rect;
use oa_core::input::InputState;
use oa_core::time::seconds_to_us;

use crate::actor::{Actor, Facing};
use crate::collision::{resolve_push_out, resolve_reject, CollisionPolicy, CollisionWorld, MoveOutcome};

/// Rectangle with a name, as written in scene configs.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NamedRect {
    pub name: String,
    #[serde(flatten)]
    pub rect: Rect,
}

impl NamedRect {
    pub fn new(name: &str, rect: Rect) -> Self {
        Self {
            name: name.to_string(),
            rect,
        }
    }
}

pub(crate) fn point(p: [f32; 2]) -> Vec2 {
    Vec2::new(p[0], p[1])
}

/// Seconds to whole microseconds for animation playback.
pub(crate) fn dt_us(dt: f32) -> u64 {
    seconds_to_us(f64::from(dt))
}

/// Keyboard walking for top-down scenes.
///
/// The environment is resolved with `policy`; other actors (`others`, head
/// boxes) always reject the move.
pub(crate) fn walk_player(
    actor: &mut Actor,
    input: &InputState,
    speed: f32,
    dt: f32,
    policy: CollisionPolicy,
    world: &CollisionWorld,
    others: &[Rect],
) -> MoveOutcome {
    let axis = input.movement_axis();
    let dir = axis.normalize_or_zero();
    if dir == Vec2::ZERO {
        actor.set_motion(None, false);
        return MoveOutcome {
            position: actor.position,
            blocker: None,
        };
    }

    let from = actor.position;
    let mut candidate = from + dir * speed * dt;
    let outcome = match policy {
        CollisionPolicy::RejectAndRevert => {
            resolve_reject(from, candidate, &actor.hitboxes, world, others)
        }
        CollisionPolicy::PushOut => {
            if let Some(body) = actor.hitboxes.body_at(candidate) {
                let (resolved, _) = resolve_push_out(body, &world.obstacles);
                candidate += resolved.position() - body.position();
            }
            // Environment already resolved; only actors can still block.
            resolve_reject(from, candidate, &actor.hitboxes, &CollisionWorld::default(), others)
        }
    };

    actor.position = outcome.position;
    actor.set_motion(Facing::from_input_axis(axis), true);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Hitboxes;
    use crate::collision::Blocker;
    use oa_core::input::Key;

    fn maria() -> Actor {
        Actor::new("maria", Vec2::new(100.0, 100.0), Facing::Down)
            .with_hitboxes(Hitboxes::character(0.0, 48.0, 40.0, 128.0))
    }

    #[test]
    fn idle_input_keeps_position() {
        let mut actor = maria();
        actor.moving = true;
        let outcome = walk_player(
            &mut actor,
            &InputState::new(),
            200.0,
            0.1,
            CollisionPolicy::RejectAndRevert,
            &CollisionWorld::default(),
            &[],
        );
        assert_eq!(outcome.position, Vec2::new(100.0, 100.0));
        assert!(!actor.moving);
    }

    #[test]
    fn reject_policy_reverts_into_wall() {
        let mut actor = maria();
        let mut input = InputState::new();
        input.key_down(Key::D);
        let world = CollisionWorld::new(vec![Rect::new(150.0, 0.0, 20.0, 400.0)]);

        let outcome = walk_player(
            &mut actor,
            &input,
            200.0,
            0.1,
            CollisionPolicy::RejectAndRevert,
            &world,
            &[],
        );
        assert_eq!(outcome.blocker, Some(Blocker::Obstacle(0)));
        assert_eq!(actor.position, Vec2::new(100.0, 100.0));
        assert_eq!(actor.facing, Facing::Right);
        assert!(actor.moving);
    }

    #[test]
    fn push_policy_slides_up_to_wall() {
        let mut actor = maria();
        let mut input = InputState::new();
        input.key_down(Key::D);
        let world = CollisionWorld::new(vec![Rect::new(150.0, 0.0, 20.0, 400.0)]);

        walk_player(&mut actor, &input, 200.0, 0.1, CollisionPolicy::PushOut, &world, &[]);
        // Body would reach x 120..168; pushed back to touch the wall at 150.
        assert!((actor.position.x - (150.0 - 48.0)).abs() < 0.01);
        assert!(actor.position.x + 48.0 <= 150.0);
    }

    #[test]
    fn other_actor_blocks_under_either_policy() {
        let others = [Rect::new(110.0, 100.0, 48.0, 40.0)];
        for policy in [CollisionPolicy::RejectAndRevert, CollisionPolicy::PushOut] {
            let mut actor = maria();
            let mut input = InputState::new();
            input.key_down(Key::Right);
            let outcome = walk_player(
                &mut actor,
                &input,
                100.0,
                0.1,
                policy,
                &CollisionWorld::default(),
                &others,
            );
            assert_eq!(outcome.blocker, Some(Blocker::Actor(0)));
            assert_eq!(actor.position, Vec2::new(100.0, 100.0));
        }
    }

    #[test]
    fn microsecond_conversion() {
        assert_eq!(dt_us(1.0 / 60.0), 16_667);
        assert_eq!(dt_us(-1.0), 0);
    }
}
