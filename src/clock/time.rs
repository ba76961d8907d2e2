use std::time::{Duration, Instant};

/// Source of "now" for the animation clock.
///
/// Times are offsets from an arbitrary, fixed origin. `sleep_until` is the only place the
/// clock suspends.
pub trait TimeSource {
    /// Current time.
    fn now(&self) -> Duration;

    /// Block until `now() >= deadline`. Returns immediately for past deadlines.
    fn sleep_until(&mut self, deadline: Duration);
}

/// Wall-clock time backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    /// Origin is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Deterministic time that only moves when told to.
///
/// Sleeping jumps straight to the deadline, which makes offline rendering and tests exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManualTime {
    now: Duration,
}

impl ManualTime {
    /// Start at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `now`.
    pub fn at(now: Duration) -> Self {
        Self { now }
    }

    /// Jump to `now` (may move backwards).
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Move forward by `d`.
    pub fn advance(&mut self, d: Duration) {
        self.now += d;
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep_until(&mut self, deadline: Duration) {
        if deadline > self.now {
            self.now = deadline;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/time.rs"]
mod tests;
