use std::time::Duration;

use log::warn;

/// How many fixed steps a frame should run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepPlan {
    pub steps: u32,
    /// Backlog discarded because the frame exceeded `max_steps_per_frame`.
    pub dropped_backlog: Duration,
}

/// Converts variable frame deltas into a whole number of fixed steps.
#[derive(Clone, Debug)]
pub struct FixedStepClock {
    step: Duration,
    accumulator: Duration,
    max_steps_per_frame: u32,
    total_steps: u64,
    dropped_total: Duration,
}

impl FixedStepClock {
    pub fn new(step_hz: u32, max_steps_per_frame: u32) -> Self {
        let hz = if step_hz == 0 {
            warn!("Fixed step rate of 0 Hz requested; using 60 Hz.");
            60
        } else {
            step_hz
        };
        Self {
            step: Duration::from_secs_f64(1.0 / f64::from(hz)),
            accumulator: Duration::ZERO,
            max_steps_per_frame: max_steps_per_frame.max(1),
            total_steps: 0,
            dropped_total: Duration::ZERO,
        }
    }

    #[inline(always)]
    pub const fn step(&self) -> Duration {
        self.step
    }

    #[inline(always)]
    pub const fn total_steps(&self) -> u64 {
        self.total_steps
    }

    #[inline(always)]
    pub const fn dropped_total(&self) -> Duration {
        self.dropped_total
    }

    pub fn advance(&mut self, frame_dt: Duration) -> StepPlan {
        let mut acc = self.accumulator.saturating_add(frame_dt);
        let mut steps = 0u32;
        while acc >= self.step && steps < self.max_steps_per_frame {
            acc -= self.step;
            steps += 1;
        }

        let mut dropped_backlog = Duration::ZERO;
        if acc >= self.step {
            dropped_backlog = acc;
            acc = Duration::ZERO;
            self.dropped_total = self.dropped_total.saturating_add(dropped_backlog);
        }
        self.accumulator = acc;
        self.total_steps += u64::from(steps);
        StepPlan {
            steps,
            dropped_backlog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FixedStepClock;
    use std::time::Duration;

    #[test]
    fn accumulates_partial_frames() {
        let mut clock = FixedStepClock::new(100, 5);
        assert_eq!(clock.advance(Duration::from_millis(4)).steps, 0);
        assert_eq!(clock.advance(Duration::from_millis(4)).steps, 0);
        assert_eq!(clock.advance(Duration::from_millis(4)).steps, 1);
        assert_eq!(clock.advance(Duration::from_millis(25)).steps, 2);
        assert_eq!(clock.total_steps(), 3);
    }

    #[test]
    fn long_frames_are_clamped_and_backlog_dropped() {
        let mut clock = FixedStepClock::new(100, 3);
        let plan = clock.advance(Duration::from_millis(100));
        assert_eq!(plan.steps, 3);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(70));
        assert_eq!(clock.advance(Duration::ZERO).steps, 0, "dropped backlog does not come back");
    }

    #[test]
    fn zero_rate_falls_back() {
        let clock = FixedStepClock::new(0, 0);
        assert!(clock.step() > Duration::ZERO);
    }
}
