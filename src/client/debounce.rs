// src/client/debounce.rs

//! Trailing-edge debounce with an optional leading edge.

use std::time::{Duration, Instant};

/// A single pending-timer handle.
///
/// `schedule` restarts the wait window on every call; the debounced action
/// runs once the window elapses without another call (trailing edge). With
/// `leading` set, the action instead fires immediately when no window is
/// pending, and the trailing fire is suppressed.
///
/// The caller owns the clock: `schedule(now)` reports whether to fire
/// right away, `poll(now)` reports whether the trailing deadline has
/// passed.
#[derive(Debug)]
pub struct Debouncer {
    wait: Duration,
    leading: bool,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            leading: false,
            deadline: None,
        }
    }

    /// Fire on the leading edge instead of the trailing one.
    pub fn leading(wait: Duration) -> Self {
        Self {
            wait,
            leading: true,
            deadline: None,
        }
    }

    /// Record a call at `now`. Returns `true` when the action should run
    /// immediately (leading mode with no pending window).
    pub fn schedule(&mut self, now: Instant) -> bool {
        let idle = self.deadline.is_none_or(|deadline| now >= deadline);
        let fire_now = self.leading && idle;
        self.deadline = Some(now + self.wait);
        fire_now
    }

    /// Check the timer at `now`. Returns `true` exactly once per elapsed
    /// window, and only in trailing mode.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                !self.leading
            }
            _ => false,
        }
    }

    /// Drop any pending window without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn trailing_fires_once_after_quiet_period() {
        let mut d = Debouncer::new(ms(100));
        let t0 = Instant::now();

        assert!(!d.schedule(t0));
        assert!(!d.schedule(t0 + ms(50)));

        // Window restarted at t0+50, so t0+120 is still inside it.
        assert!(!d.poll(t0 + ms(120)));
        assert!(d.poll(t0 + ms(150)));

        // Already fired; nothing pending.
        assert!(!d.poll(t0 + ms(300)));
    }

    #[test]
    fn leading_fires_immediately_when_idle() {
        let mut d = Debouncer::leading(ms(100));
        let t0 = Instant::now();

        assert!(d.schedule(t0));
        // Calls inside the window do not fire again.
        assert!(!d.schedule(t0 + ms(20)));
        assert!(!d.schedule(t0 + ms(40)));

        // Leading mode suppresses the trailing fire.
        assert!(!d.poll(t0 + ms(200)));

        // Window elapsed, so the next call fires again.
        assert!(d.schedule(t0 + ms(250)));
    }

    #[test]
    fn cancel_discards_pending_window() {
        let mut d = Debouncer::new(ms(100));
        let t0 = Instant::now();

        d.schedule(t0);
        assert!(d.is_pending());
        d.cancel();
        assert!(!d.is_pending());
        assert!(!d.poll(t0 + ms(200)));
    }
}
