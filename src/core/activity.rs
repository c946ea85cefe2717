//! User-activity tracking for the controls overlay.
//!
//! `is_user_active` is true while controls should be shown. Interactions on
//! the bare playback surface toggle it; interactions on a control only keep
//! an already visible overlay alive. Once active, an [`IdleTimer`] clears
//! the flag after a quiet window.

use crate::core::idle_timer::IdleTimer;
use serde::Deserialize;
use std::time::Instant;

/// Where a pointer/touch interaction landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionTarget {
    /// Video surface or any non-control area
    Surface,
    /// A persistent control element (button, progress bar, ...)
    Control,
}

#[derive(Debug, Clone)]
pub struct ActivityTracker {
    active: bool,
    timer: IdleTimer,
}

impl ActivityTracker {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            active: false,
            timer: IdleTimer::new(timeout_ms),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timer.delay_ms()
    }

    pub fn is_timer_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Apply one interaction. Returns the new state if it changed.
    pub fn interact(&mut self, target: InteractionTarget, now: Instant) -> Option<bool> {
        self.timer.cancel();
        let before = self.active;
        if target == InteractionTarget::Surface {
            self.active = !self.active;
        }
        if self.active {
            self.timer.arm(now);
        }
        (self.active != before).then_some(self.active)
    }

    /// Show the overlay for one idle window without any interaction.
    /// Returns true if it was hidden before.
    pub fn seed(&mut self, now: Instant) -> bool {
        let changed = !self.active;
        self.active = true;
        self.timer.arm(now);
        changed
    }

    /// Returns true when the idle window elapsed and the overlay was hidden.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.timer.poll(now) && self.active {
            self.active = false;
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }
}
