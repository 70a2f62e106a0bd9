use std::time::{Duration, Instant};

/// Default input poll interval in milliseconds
pub const DEFAULT_POLL_MS: u64 = 250;

/// Interval between timer ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Get the input poll duration
pub fn poll_duration() -> Duration {
    Duration::from_millis(DEFAULT_POLL_MS)
}

/// A cancellable repeating one-second schedule.
///
/// The schedule is either armed (next tick due at some instant) or not.
/// Cancelling disarms it exactly once; cancelling again is a no-op, so no
/// exit path can leave a tick behind or cancel one twice.
#[derive(Debug, Default)]
pub struct Ticker {
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the first tick one interval after `now`. Re-arming an armed
    /// ticker keeps the existing schedule.
    pub fn arm(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + TICK_INTERVAL);
        }
    }

    /// Disarm; returns whether a tick was pending
    pub fn cancel(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Fire every tick due at or before `now` and return how many fired
    pub fn fire_due(&mut self, now: Instant) -> u64 {
        let Some(mut due) = self.next_due else {
            return 0;
        };

        let mut fired = 0;
        while due <= now {
            fired += 1;
            due += TICK_INTERVAL;
        }
        self.next_due = Some(due);
        fired
    }
}
