//! Single-writer runtime for a [`RaceEngine`].
//!
//! The engine lives inside one tokio task. Inputs arrive over an mpsc
//! channel and the countdown is driven by a one-second interval; both are
//! handled in the same `select!` loop, commands first, so a manual decision
//! always lands before a tick that would have expired the same event.
//!
//! Readers either ask for a [`RaceSnapshot`] or subscribe to the `watch`
//! channel, which is refreshed after every phase change and every tick
//! while the countdown runs.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::engine::{GamePhase, Input, PhaseChange, RaceEngine, RaceSnapshot, Trigger};
use crate::error::EngineError;
use crate::observability::metrics;
use crate::observability::{EventEmitter, GameEvent};

/// Countdown resolution.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Command channel capacity.
const COMMAND_BUFFER: usize = 32;

enum Command {
    Apply {
        input: Input,
        reply: oneshot::Sender<Result<Option<PhaseChange>, EngineError>>,
    },
    Snapshot {
        reply: oneshot::Sender<RaceSnapshot>,
    },
}

/// Cloneable handle to a running race.
#[derive(Debug, Clone)]
pub struct RaceHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<RaceSnapshot>,
    cancel: CancellationToken,
}

impl RaceHandle {
    /// Sends an input and waits for the engine's answer.
    ///
    /// # Errors
    ///
    /// Returns the engine's error for the input, or
    /// [`EngineError::RuntimeStopped`] if the runtime task has exited.
    pub async fn apply(&self, input: Input) -> Result<Option<PhaseChange>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Apply { input, reply })
            .await
            .map_err(|_| EngineError::RuntimeStopped)?;
        rx.await.map_err(|_| EngineError::RuntimeStopped)?
    }

    /// Returns a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RuntimeStopped`] if the runtime task has exited.
    pub async fn snapshot(&self) -> Result<RaceSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply })
            .await
            .map_err(|_| EngineError::RuntimeStopped)?;
        rx.await.map_err(|_| EngineError::RuntimeStopped)
    }

    /// Subscribes to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RaceSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the runtime task.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Owner of the engine inside the runtime task.
pub struct RaceRuntime {
    engine: RaceEngine,
    emitter: Arc<EventEmitter>,
    snapshots: watch::Sender<RaceSnapshot>,
    /// Countdown generation the ticker was last aligned to.
    aligned_generation: u64,
}

impl RaceRuntime {
    /// Spawns the runtime task and returns its handle.
    #[must_use]
    pub fn spawn(engine: RaceEngine, emitter: Arc<EventEmitter>) -> (RaceHandle, JoinHandle<()>) {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshots, snapshot_rx) = watch::channel(engine.snapshot());
        let cancel = CancellationToken::new();

        let runtime = Self {
            aligned_generation: engine.countdown().generation(),
            engine,
            emitter,
            snapshots,
        };
        let task = tokio::spawn(runtime.run(rx, cancel.clone()));

        let handle = RaceHandle {
            commands,
            snapshots: snapshot_rx,
            cancel,
        };
        (handle, task)
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("race runtime cancelled");
                    break;
                }
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("all race handles dropped");
                        break;
                    };
                    self.handle(command, &mut ticker);
                }
                _ = ticker.tick() => {
                    self.on_tick();
                }
            }
        }
    }

    fn handle(&mut self, command: Command, ticker: &mut Interval) {
        match command {
            Command::Apply { input, reply } => {
                let result = self.engine.apply(input);
                if let Ok(Some(change)) = &result {
                    self.record(*change);
                }
                self.align_ticker(ticker);
                self.publish();
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
        }
    }

    fn on_tick(&mut self) {
        if !self.engine.countdown().is_active() {
            return;
        }
        if let Some(change) = self.engine.tick() {
            self.record(change);
        }
        self.publish();
    }

    /// Restarts the ticker whenever the countdown has been re-activated,
    /// so each run gets a full first second.
    fn align_ticker(&mut self, ticker: &mut Interval) {
        let generation = self.engine.countdown().generation();
        if generation != self.aligned_generation && self.engine.countdown().is_active() {
            ticker.reset();
        }
        self.aligned_generation = generation;
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.engine.snapshot());
    }

    fn record(&self, change: PhaseChange) {
        let timestamp = Utc::now();
        metrics::record_phase_transition(change.from, change.to);
        self.emitter.emit(GameEvent::PhaseEntered {
            timestamp,
            from: change.from,
            to: change.to,
            trigger: change.trigger,
        });

        let Some(session) = self.engine.session() else {
            return;
        };

        match change.to {
            GamePhase::Racing if change.trigger == Trigger::SelectStage => {
                metrics::record_session_started(
                    session.selected_stage(),
                    self.engine.catalog().stages(),
                );
                self.emitter.emit(GameEvent::SessionStarted {
                    timestamp,
                    session_id: session.id(),
                    stage: session.selected_stage().to_string(),
                    queue_length: session.queue().len(),
                });
            }
            GamePhase::EventFeedback => {
                let Some(record) = session.timeline().last() else {
                    return;
                };
                if record.automatic {
                    metrics::record_timer_expiry();
                    self.emitter.emit(GameEvent::TimerExpired {
                        timestamp,
                        event_id: record.event_id.clone(),
                    });
                }
                metrics::record_decision(
                    record.decision,
                    record.severity,
                    record.automatic,
                    record.score_after,
                );
                self.emitter.emit(GameEvent::DecisionResolved {
                    timestamp,
                    event_id: record.event_id.clone(),
                    decision: record.decision,
                    severity: record.severity,
                    score_delta: record.score_delta,
                    score_after: record.score_after,
                    automatic: record.automatic,
                });
            }
            GamePhase::Finish => {
                let final_score = self.engine.final_score();
                metrics::record_final_score(final_score);
                self.emitter.emit(GameEvent::SessionFinished {
                    timestamp,
                    session_id: session.id(),
                    final_score,
                    tier: self.engine.tier(),
                    risk_gaps: self.engine.risk_gaps().len(),
                });
            }
            _ => {}
        }
    }
}
