use std::time::{Duration, Instant};

/// Drives both the day/night cycle (elapsed time) and the animation mixer (delta time)
/// from a single time source.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_tick: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        delta.as_secs_f32()
    }

    /// Seconds since the clock was created, as of the last tick.
    pub fn elapsed(&self) -> f32 {
        self.last_tick.duration_since(self.start).as_secs_f32()
    }

    pub fn since_last_tick(&self) -> Duration {
        self.last_tick.elapsed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_and_elapsed_agree() {
        let mut clock = FrameClock::new();
        let start = clock.start;

        let first = clock.tick_at(start + Duration::from_millis(250));
        let second = clock.tick_at(start + Duration::from_millis(1000));

        assert!((first - 0.25).abs() < 1e-6);
        assert!((second - 0.75).abs() < 1e-6);
        assert!((clock.elapsed() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn elapsed_is_zero_before_first_tick() {
        let clock = FrameClock::new();
        assert_eq!(clock.elapsed(), 0.0);
    }
}
