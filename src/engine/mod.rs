//! Race state machine.
//!
//! # Architecture
//!
//! - [`phase`]: phases, triggers, and the transition table
//! - [`queue`]: per-session event queue with injectable shuffling
//! - [`session`]: score, position, timeline, and feedback for one playthrough
//! - [`race`]: the [`RaceEngine`] tying these to the countdown
//! - [`snapshot`]: cloned outputs for readers

pub mod phase;
pub mod queue;
pub mod race;
pub mod session;
pub mod snapshot;

pub use phase::{GamePhase, Input, PhaseChange, Trigger, target_phase};
pub use queue::{KeepOrder, RandomShuffler, Shuffler, build_event_queue};
pub use race::RaceEngine;
pub use session::{DecisionRecord, Feedback, Session};
pub use snapshot::RaceSnapshot;
