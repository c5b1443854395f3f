use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped. Always positive.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Per-window clock feeding the UI its delta time.
///
/// Delta time is clamped: UI libraries reject a zero delta, and a stall
/// (debugger, minimized window) should not produce a multi-second step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub const DEFAULT_MIN: Duration = Duration::from_micros(100);
    pub const DEFAULT_MAX: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_clamps(Self::DEFAULT_MIN, Self::DEFAULT_MAX)
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(!dt_min.is_zero() && dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the baseline, e.g. when leaving a minimized state.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    fn reset_at(&mut self, now: Instant) {
        self.last = now;
    }

    /// Advances the clock.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
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
    fn delta_is_clamped_both_ways() {
        let mut clock = FrameClock::new();
        let start = clock.last;

        let first = clock.tick_at(start);
        assert_eq!(first.dt, FrameClock::DEFAULT_MIN.as_secs_f32());

        let second = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(second.dt, FrameClock::DEFAULT_MAX.as_secs_f32());
    }

    #[test]
    fn delta_inside_range_passes_through() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let ft = clock.tick_at(start + Duration::from_millis(16));
        assert!((ft.dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn frame_index_counts_ticks() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        assert_eq!(clock.tick_at(start).frame_index, 0);
        assert_eq!(clock.tick_at(start).frame_index, 1);
    }

    #[test]
    fn reset_measures_from_the_new_baseline() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        clock.tick_at(start);

        clock.reset_at(start + Duration::from_secs(30));
        let ft = clock.tick_at(start + Duration::from_secs(30) + Duration::from_millis(16));

        assert!((ft.dt - 0.016).abs() < 1e-6);
        assert_eq!(ft.frame_index, 1);
    }
}
