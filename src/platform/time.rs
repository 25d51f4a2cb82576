//! Frame pacing and the frame-rate counter

use std::time::{Duration, Instant};

/// Fixed-step accumulator
///
/// Wall-clock time is fed in each frame and drained in whole ticks, so
/// simulation speed is independent of the display's refresh rate.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: Duration,
    accumulator: Duration,
    max_substeps: u32,
    last: Option<Instant>,
}

impl FixedStep {
    pub fn new(ticks_per_second: u32, max_substeps: u32) -> Self {
        Self {
            step: Duration::from_secs(1) / ticks_per_second.max(1),
            accumulator: Duration::ZERO,
            max_substeps: max_substeps.max(1),
            last: None,
        }
    }

    /// Ticks to run for a frame observed at `now`
    ///
    /// The first call runs one tick. Long stalls are clamped to
    /// `max_substeps` and the excess is dropped rather than replayed.
    pub fn advance(&mut self, now: Instant) -> u32 {
        let Some(last) = self.last.replace(now) else {
            return 1;
        };
        self.accumulator += now.saturating_duration_since(last);

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_substeps {
            self.accumulator -= self.step;
            ticks += 1;
        }
        if ticks == self.max_substeps {
            self.accumulator = self.accumulator.min(self.step);
        }
        ticks
    }

    /// Time from `now` until the next tick is due; zero when one is pending
    pub fn until_next(&self, now: Instant) -> Duration {
        let Some(last) = self.last else {
            return Duration::ZERO;
        };
        let pending = self.accumulator + now.saturating_duration_since(last);
        self.step.saturating_sub(pending)
    }
}

/// Frames presented during the last whole wall-clock second
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Option<Instant>,
    frames: u32,
    display: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            window_start: None,
            frames: 0,
            display: 0,
        }
    }

    /// Count a presented frame; returns the current reading
    pub fn frame(&mut self, now: Instant) -> u32 {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        if now.saturating_duration_since(start) >= Duration::from_secs(1) {
            self.display = self.frames;
            self.frames = 0;
            self.window_start = Some(now);
        }
        self.display
    }

    pub fn fps(&self) -> u32 {
        self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_drains_whole_ticks() {
        let mut step = FixedStep::new(60, 5);
        let t0 = Instant::now();
        assert_eq!(step.advance(t0), 1);
        assert_eq!(step.advance(t0 + Duration::from_millis(10)), 0);
        // 10ms + 25ms carries two ticks (16.6ms each)
        assert_eq!(step.advance(t0 + Duration::from_millis(35)), 2);
    }

    #[test]
    fn test_until_next_counts_elapsed_time() {
        let mut step = FixedStep::new(50, 5);
        let t0 = Instant::now();
        assert_eq!(step.until_next(t0), Duration::ZERO);
        step.advance(t0);
        assert_eq!(step.until_next(t0), Duration::from_millis(20));
        assert_eq!(step.until_next(t0 + Duration::from_millis(15)), Duration::from_millis(5));
        assert_eq!(step.until_next(t0 + Duration::from_millis(30)), Duration::ZERO);
        // 30ms drains one tick and carries 10ms
        assert_eq!(step.advance(t0 + Duration::from_millis(30)), 1);
        assert_eq!(step.until_next(t0 + Duration::from_millis(30)), Duration::from_millis(10));
    }

    #[test]
    fn test_fixed_step_clamps_stalls() {
        let mut step = FixedStep::new(60, 4);
        let t0 = Instant::now();
        step.advance(t0);
        assert_eq!(step.advance(t0 + Duration::from_secs(2)), 4);
        // Backlog was dropped
        assert!(step.advance(t0 + Duration::from_secs(2) + Duration::from_millis(1)) <= 1);
    }

    #[test]
    fn test_fps_counter_reports_per_second() {
        let mut fps = FpsCounter::new();
        let t0 = Instant::now();
        for i in 0..30 {
            fps.frame(t0 + Duration::from_millis(i * 33));
        }
        assert_eq!(fps.fps(), 0);
        assert_eq!(fps.frame(t0 + Duration::from_millis(1000)), 31);
        assert_eq!(fps.fps(), 31);
    }
}
