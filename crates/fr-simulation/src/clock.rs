/// Host frame rate the companion simulation is stepped at.
pub const TICKS_PER_SECOND: u32 = 60;

/// Tracks simulation time: a monotonic tick counter at a fixed step.
#[derive(Debug, Clone)]
pub struct SimClock {
    tick: u64,
    seconds_per_tick: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(TICKS_PER_SECOND)
    }
}

impl SimClock {
    /// Create a clock at tick 0 stepping `ticks_per_second` times per second.
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            tick: 0,
            seconds_per_tick: 1.0 / ticks_per_second.max(1) as f32,
        }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Return the current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Length of one tick in seconds.
    pub fn dt(&self) -> f32 {
        self.seconds_per_tick
    }

    /// Total elapsed simulated seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.tick as f64 * f64::from(self.seconds_per_tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_initial_state() {
        let clock = SimClock::default();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.elapsed_seconds(), 0.0);
        assert!((clock.dt() - 1.0 / 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn clock_advance_increments() {
        let mut clock = SimClock::new(60);
        for _ in 0..120 {
            clock.advance();
        }
        assert_eq!(clock.tick(), 120);
        assert!((clock.elapsed_seconds() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn zero_rate_is_treated_as_one() {
        let clock = SimClock::new(0);
        assert_eq!(clock.dt(), 1.0);
    }
}
