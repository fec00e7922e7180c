//! Deterministic engine primitives shared by every scene: animation clips,
//! rectangles, keyboard state, the fixed-step clock and countdown timers.

pub mod animation;
pub mod geometry;
pub mod input;
pub mod time;
pub mod timer;
