//! Per-event countdown.
//!
//! [`Countdown`] is a plain state machine advanced one second at a time by
//! whoever owns it. The race runtime drives it from a tokio interval; tests
//! drive it by calling [`Countdown::tick`] directly.
//!
//! Every activation gets a new generation number and expiry is reported
//! at most once per generation, so a countdown that was stopped and
//! restarted can never deliver the old run's expiry.

/// Default seconds a player has to answer an event.
pub const DEFAULT_EVENT_SECONDS: u32 = 5;

/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is not running.
    Idle,
    /// Still running with this many seconds left.
    Running {
        /// Seconds remaining
        time_left: u32,
    },
    /// Reached zero on this tick. The countdown is now stopped.
    Expired {
        /// Activation that expired
        generation: u64,
    },
}

/// Suspendable whole-second countdown with single-fire expiry.
#[derive(Debug, Clone)]
pub struct Countdown {
    duration: u32,
    time_left: u32,
    active: bool,
    generation: u64,
}

impl Countdown {
    /// Creates an inactive countdown of `duration` seconds.
    #[must_use]
    pub const fn new(duration: u32) -> Self {
        Self {
            duration,
            time_left: duration,
            active: false,
            generation: 0,
        }
    }

    /// Starts a fresh run from the full duration.
    ///
    /// Activating an already-running countdown is a no-op and keeps the
    /// current generation.
    pub fn activate(&mut self) -> u64 {
        if self.active {
            return self.generation;
        }
        self.generation += 1;
        self.active = true;
        self.time_left = self.duration;
        self.generation
    }

    /// Stops the countdown. No expiry is reported for the stopped run.
    ///
    /// Returns `true` if the countdown was running.
    pub const fn deactivate(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        was_active
    }

    /// Advances the countdown by one second.
    pub const fn tick(&mut self) -> Tick {
        if !self.active {
            return Tick::Idle;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.active = false;
            Tick::Expired {
                generation: self.generation,
            }
        } else {
            Tick::Running {
                time_left: self.time_left,
            }
        }
    }

    /// Returns whether the countdown is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the seconds left in the current (or last) run.
    #[must_use]
    pub const fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Returns the configured duration in seconds.
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.duration
    }

    /// Returns the activation counter.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Percentage of time remaining, for display only.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration == 0 {
            return 0.0;
        }
        f64::from(self.time_left) / f64::from(self.duration) * 100.0
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_SECONDS)
    }
}
