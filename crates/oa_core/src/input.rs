//! Keyboard state with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every frame the key is
//!   down. Player walking reads this.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only for the frame
//!   the transition happened. Cleared by `end_frame()`, which the host calls
//!   after at least one fixed step has consumed them, so a press is never lost
//!   on a frame with zero simulation steps.

use std::collections::HashSet;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    P,
    X,
    Space,
    Enter,
    Escape,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
}

impl Key {
    pub const ALL: &'static [Key] = &[
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::P,
        Key::X,
        Key::Space,
        Key::Enter,
        Key::Escape,
        Key::Num1,
        Key::Num2,
        Key::Num3,
        Key::Num4,
        Key::Num5,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::W => "w",
            Self::A => "a",
            Self::S => "s",
            Self::D => "d",
            Self::P => "p",
            Self::X => "x",
            Self::Space => "space",
            Self::Enter => "enter",
            Self::Escape => "escape",
            Self::Num1 => "1",
            Self::Num2 => "2",
            Self::Num3 => "3",
            Self::Num4 => "4",
            Self::Num5 => "5",
        }
    }

    /// Parse the lowercase name used by replay scripts.
    pub fn from_name(name: &str) -> Option<Key> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }

    /// Scene shortcut digit, if this is one of the number keys.
    pub fn digit(self) -> Option<u8> {
        match self {
            Self::Num1 => Some(1),
            Self::Num2 => Some(2),
            Self::Num3 => Some(3),
            Self::Num4 => Some(4),
            Self::Num5 => Some(5),
            _ => None,
        }
    }
}

/// Discrete key transition delivered to `Scene::handle_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.key_down(key),
            InputEvent::KeyUp(key) => self.key_up(key),
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Raw movement intent from WASD / arrow keys, each component in {-1, 0, 1}.
    /// Opposite keys cancel out.
    pub fn movement_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.is_held(Key::A) || self.is_held(Key::Left) {
            axis.x -= 1.0;
        }
        if self.is_held(Key::D) || self.is_held(Key::Right) {
            axis.x += 1.0;
        }
        if self.is_held(Key::W) || self.is_held(Key::Up) {
            axis.y -= 1.0;
        }
        if self.is_held(Key::S) || self.is_held(Key::Down) {
            axis.y += 1.0;
        }
        axis
    }

    /// Unit-length movement direction; diagonals are not faster than straights.
    pub fn movement_direction(&self) -> Vec2 {
        self.movement_axis().normalize_or_zero()
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        assert!(input.is_held(Key::A));
        assert!(input.is_just_pressed(Key::A));
    }

    #[test]
    fn key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_up(Key::A);
        assert!(!input.is_held(Key::A));
        assert!(input.is_just_released(Key::A));
    }

    #[test]
    fn key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::A);
        assert!(!input.is_just_released(Key::A));
        assert!(!input.is_held(Key::A));
    }

    #[test]
    fn end_frame_clears_transient_state() {
        let mut input = InputState::new();
        input.apply(InputEvent::KeyDown(Key::A));
        input.apply(InputEvent::KeyDown(Key::Space));
        input.end_frame();
        assert!(!input.is_just_pressed(Key::A));
        assert!(!input.is_just_pressed(Key::Space));
        assert!(input.is_held(Key::A));
        assert!(input.is_held(Key::Space));
    }

    #[test]
    fn movement_axis_combines_wasd_and_arrows() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.key_down(Key::S);
        assert_eq!(input.movement_axis(), Vec2::new(-1.0, 1.0));

        input.key_down(Key::D);
        assert_eq!(input.movement_axis(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn diagonal_direction_is_normalized() {
        let mut input = InputState::new();
        input.key_down(Key::W);
        input.key_down(Key::D);
        let dir = input.movement_direction();
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.x > 0.0 && dir.y < 0.0);
    }

    #[test]
    fn key_names_round_trip() {
        for &key in Key::ALL {
            assert_eq!(Key::from_name(key.name()), Some(key));
        }
        assert_eq!(Key::from_name("SPACE"), Some(Key::Space));
        assert_eq!(Key::from_name("f13"), None);
    }

    #[test]
    fn digits_only_for_number_keys() {
        assert_eq!(Key::Num3.digit(), Some(3));
        assert_eq!(Key::Num5.digit(), Some(5));
        assert_eq!(Key::Space.digit(), None);
        assert_eq!(Key::from_name("6"), None);
    }
}
