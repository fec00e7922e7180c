//! Fixed-timestep clock.
//!
//! The host feeds the measured frame delta into `begin_frame`; simulation
//! then consumes it in fixed slices via `should_step`. The wall clock is not
//! read here so runs are reproducible from a recorded delta sequence.

/// Seconds to whole microseconds. Negative and NaN inputs give 0.
pub fn seconds_to_us(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1_000_000.0).round() as u64
}

pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    pub interpolation_alpha: f64,
}

impl TimeState {
    pub fn new(fixed_dt: f64) -> Self {
        Self {
            fixed_dt,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            interpolation_alpha: 0.0,
        }
    }

    /// Fixed step as integer microseconds for animation playback.
    pub fn fixed_dt_us(&self) -> u64 {
        seconds_to_us(self.fixed_dt)
    }

    pub fn begin_frame(&mut self, frame_dt: f64) {
        self.real_dt = frame_dt.max(0.0);

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        if self.fixed_dt > 0.0 && self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn end_frame(&mut self) {
        self.interpolation_alpha = if self.fixed_dt > 0.0 {
            self.accumulator / self.fixed_dt
        } else {
            0.0
        };
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frame(time: &mut TimeState, dt: f64) -> u32 {
        time.begin_frame(dt);
        let mut steps = 0;
        while time.should_step() {
            steps += 1;
        }
        time.end_frame();
        steps
    }

    #[test]
    fn exact_multiple_yields_exact_steps() {
        let mut time = TimeState::new(0.01);
        assert_eq!(run_frame(&mut time, 0.03 + 1e-9), 3);
        assert_eq!(time.fixed_step_count, 3);
    }

    #[test]
    fn remainder_carries_into_next_frame() {
        let mut time = TimeState::new(0.02);
        assert_eq!(run_frame(&mut time, 0.015), 0);
        assert!(time.interpolation_alpha > 0.7);
        assert_eq!(run_frame(&mut time, 0.015), 1);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut time = TimeState::new(0.0625);
        let steps = run_frame(&mut time, 10.0);
        assert_eq!(steps, 4);
        assert!((time.real_dt - 0.25).abs() < 1e-12);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut time = TimeState::default();
        assert_eq!(run_frame(&mut time, -1.0), 0);
        assert_eq!(time.real_dt, 0.0);
    }

    #[test]
    fn fixed_dt_in_microseconds() {
        assert_eq!(TimeState::default().fixed_dt_us(), 16_667);
        assert_eq!(seconds_to_us(-0.5), 0);
        assert_eq!(seconds_to_us(f64::NAN), 0);
        assert_eq!(seconds_to_us(2.0), 2_000_000);
    }

    #[test]
    fn total_time_tracks_fixed_steps() {
        let mut time = TimeState::new(0.25);
        run_frame(&mut time, 0.25);
        run_frame(&mut time, 0.25);
        assert_eq!(time.frame_count, 2);
        assert_eq!(time.total_time, 0.5);
    }
}
