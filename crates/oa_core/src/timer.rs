//! Countdown timers. All "wait N seconds" and cooldown behavior in scenes is
//! expressed with these rather than any form of yielding.
//!
//! Time is kept in whole microseconds so that a run of equal ticks expires on
//! the same tick regardless of float rounding in the step size.

use crate::time::seconds_to_us;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining_us: u64,
    running: bool,
}

impl Countdown {
    /// A countdown that is already running.
    pub fn started(seconds: f32) -> Self {
        let mut timer = Self::default();
        timer.start(seconds);
        timer
    }

    pub fn start(&mut self, seconds: f32) {
        self.remaining_us = seconds_to_us(f64::from(seconds));
        self.running = true;
    }

    pub fn cancel(&mut self) {
        self.remaining_us = 0;
        self.running = false;
    }

    /// Advance by `dt` seconds. Returns true exactly once, on the tick that
    /// expires it.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        self.remaining_us = self
            .remaining_us
            .saturating_sub(seconds_to_us(f64::from(dt)));
        if self.remaining_us == 0 {
            self.running = false;
            return true;
        }
        false
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Not counting down: never started, expired or cancelled.
    pub fn is_ready(&self) -> bool {
        !self.running
    }

    /// Seconds left.
    pub fn remaining(&self) -> f32 {
        (self.remaining_us as f64 / 1_000_000.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ready() {
        let timer = Countdown::default();
        assert!(timer.is_ready());
        assert!(!timer.is_running());
    }

    #[test]
    fn fires_once_on_expiry() {
        let mut timer = Countdown::started(0.3);
        assert!(!timer.tick(0.1));
        assert!(!timer.tick(0.1));
        assert!(timer.tick(0.2));
        assert!(timer.is_ready());
        assert!(!timer.tick(0.2));
    }

    #[test]
    fn zero_duration_fires_on_first_tick() {
        let mut timer = Countdown::started(0.0);
        assert!(timer.is_running());
        assert!(timer.tick(0.0));
    }

    #[test]
    fn cancel_stops_without_firing() {
        let mut timer = Countdown::started(1.0);
        timer.cancel();
        assert!(!timer.tick(5.0));
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn sixty_hz_ticks_expire_on_exact_frame() {
        let dt = 1.0 / 60.0;
        let mut timer = Countdown::started(2.0);
        let mut ticks = 0;
        while !timer.tick(dt) {
            ticks += 1;
        }
        assert_eq!(ticks + 1, 120);

        let mut cooldown = Countdown::started(0.3);
        assert!(!cooldown.tick(0.1));
        assert!(!cooldown.tick(0.1));
        assert!(cooldown.tick(0.1));
    }
}
