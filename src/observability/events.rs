//! Structured game-event stream.
//!
//! Discrete, typed events emitted as a session is played. Events are
//! serialized as newline-delimited JSON (JSONL) with a monotonically
//! increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::{Decision, Severity};
use crate::engine::{GamePhase, Trigger};
use crate::score::ProtectionTier;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a race.
///
/// Each variant is tagged with `"type"` when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A stage was selected and a queue built.
    SessionStarted {
        /// When the session started.
        timestamp: DateTime<Utc>,
        /// New session id.
        session_id: Uuid,
        /// Starting stage id.
        stage: String,
        /// Number of queued events.
        queue_length: usize,
    },

    /// The state machine entered a phase.
    PhaseEntered {
        /// When the transition occurred.
        timestamp: DateTime<Utc>,
        /// Phase left.
        from: GamePhase,
        /// Phase entered.
        to: GamePhase,
        /// What caused it.
        trigger: Trigger,
    },

    /// An event was resolved.
    DecisionResolved {
        /// When the decision was made.
        timestamp: DateTime<Utc>,
        /// Catalog event id.
        event_id: String,
        /// Protected or exposed.
        decision: Decision,
        /// Event severity.
        severity: Severity,
        /// Delta applied.
        score_delta: i32,
        /// Score afterwards.
        score_after: i32,
        /// Resolved by countdown expiry.
        automatic: bool,
    },

    /// The countdown ran out on an event.
    TimerExpired {
        /// When the countdown expired.
        timestamp: DateTime<Utc>,
        /// Event that was auto-resolved.
        event_id: String,
    },

    /// Every event was resolved.
    SessionFinished {
        /// When the last event was passed.
        timestamp: DateTime<Utc>,
        /// Session id.
        session_id: Uuid,
        /// Final score.
        final_score: i32,
        /// Final tier.
        tier: ProtectionTier,
        /// Number of exposed decisions.
        risk_gaps: usize,
    },

    /// A lead was accepted downstream.
    LeadSubmitted {
        /// When the endpoint accepted the lead.
        timestamp: DateTime<Utc>,
        /// Session the lead belongs to.
        game_id: Uuid,
        /// Chosen time slot.
        preferred_slot: String,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: GameEvent,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter,
/// writes one JSON line, and flushes. Serialization and I/O failures are
/// dropped.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: GameEvent) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
