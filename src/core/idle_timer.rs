//! Debounced idle timer - fires once after a quiet period.
//!
//! Drives the controls overlay: every qualifying interaction re-arms the
//! timer, and only a full quiet window lets it expire.
//!
//! The timer holds no thread and no callback. The owner polls it with the
//! current time from its own loop:
//!
//! ```ignore
//! // On interaction:
//! timer.arm(clock.now());
//!
//! // In update loop:
//! if timer.poll(clock.now()) {
//!     hide_controls();
//! }
//! ```

use std::time::{Duration, Instant};

/// Controls overlay default idle window
pub const DEFAULT_IDLE_MS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct IdleTimer {
    /// Quiet period before expiry
    delay: Duration,
    /// Expiry deadline while armed
    deadline: Option<Instant>,
}

impl Default for IdleTimer {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_MS)
    }
}

impl IdleTimer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay.as_millis() as u64
    }

    pub fn set_delay(&mut self, delay_ms: u64) {
        self.delay = Duration::from_millis(delay_ms);
    }

    /// Arm the timer. If already armed, the deadline moves (debounce).
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
        log::trace!("IdleTimer: armed for {}ms", self.delay.as_millis());
    }

    /// Drop any pending deadline
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            log::trace!("IdleTimer: cancelled");
        }
    }

    /// True exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };

        if now >= deadline {
            self.deadline = None;
            log::trace!("IdleTimer: expired");
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before expiry, if armed
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fire_before_deadline() {
        let mut timer = IdleTimer::new(100);
        let t0 = Instant::now();

        timer.arm(t0);
        assert!(timer.is_pending());
        assert!(!timer.poll(t0));
        assert!(!timer.poll(t0 + Duration::from_millis(99)));
    }

    #[test]
    fn test_fires_once_after_delay() {
        let mut timer = IdleTimer::new(10);
        let t0 = Instant::now();

        timer.arm(t0);
        assert!(timer.poll(t0 + Duration::from_millis(10)));
        assert!(!timer.is_pending());
        assert!(!timer.poll(t0 + Duration::from_millis(20)));
    }

    #[test]
    fn test_rearm_resets_deadline() {
        let mut timer = IdleTimer::new(50);
        let t0 = Instant::now();

        timer.arm(t0);
        timer.arm(t0 + Duration::from_millis(30));

        // Original deadline passed, new one not yet
        assert!(!timer.poll(t0 + Duration::from_millis(60)));
        assert_eq!(
            timer.remaining(t0 + Duration::from_millis(60)),
            Some(Duration::from_millis(20))
        );
        assert!(timer.poll(t0 + Duration::from_millis(80)));
    }

    #[test]
    fn test_cancel() {
        let mut timer = IdleTimer::default();
        let t0 = Instant::now();
        assert_eq!(timer.delay_ms(), DEFAULT_IDLE_MS);

        timer.arm(t0);
        timer.cancel();
        assert!(!timer.is_pending());
        assert!(!timer.poll(t0 + Duration::from_secs(10)));
    }
}
