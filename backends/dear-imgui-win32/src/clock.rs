//! Monotonic frame clock

use web_time::Instant;

use crate::PlatformOptions;

/// Produces Dear ImGui's per-frame delta time
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame: Option<Instant>,
    first_frame_delta: f32,
    min_delta: f32,
}

impl FrameClock {
    pub fn new(options: PlatformOptions) -> Self {
        Self {
            last_frame: None,
            first_frame_delta: options.first_frame_delta,
            min_delta: options.min_delta,
        }
    }

    /// Seconds since the previous tick
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Seconds between the previous tick and `now`.
    ///
    /// The first tick reports the configured first-frame delta. The result is
    /// never below `min_delta`, even if `now` is not after the previous tick.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = match self.last_frame {
            None => self.first_frame_delta,
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
        };
        self.last_frame = Some(now);
        delta.max(self.min_delta)
    }

    /// Forget the previous tick so the next one counts as a first frame
    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(PlatformOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::time::Duration;

    #[test]
    fn first_tick_uses_first_frame_delta() {
        let mut clock = FrameClock::default();
        assert_relative_eq!(clock.tick_at(Instant::now()), 1.0 / 60.0);
    }

    #[test]
    fn later_ticks_measure_elapsed_time() {
        let mut clock = FrameClock::default();
        let start = Instant::now();
        clock.tick_at(start);
        let delta = clock.tick_at(start + Duration::from_millis(25));
        assert_relative_eq!(delta, 0.025, epsilon = 1e-6);
    }

    #[test]
    fn delta_is_never_zero_or_negative() {
        let options = PlatformOptions::default();
        let mut clock = FrameClock::new(options);
        let start = Instant::now() + Duration::from_secs(1);
        clock.tick_at(start);
        assert_relative_eq!(clock.tick_at(start), options.min_delta);
        assert_relative_eq!(
            clock.tick_at(start - Duration::from_millis(5)),
            options.min_delta
        );
    }

    #[test]
    fn reset_restarts_first_frame() {
        let mut clock = FrameClock::new(PlatformOptions::default().with_first_frame_delta(0.5));
        let start = Instant::now();
        clock.tick_at(start);
        clock.reset();
        assert_relative_eq!(clock.tick_at(start + Duration::from_secs(3)), 0.5);
    }
}
