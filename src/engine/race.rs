//! Race engine orchestration.
//!
//! The `RaceEngine` owns the phase, the active session, and the countdown.
//! Every input is a method taking `&mut self`; inputs that are not valid in
//! the current phase are ignored and return `None`.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{Catalog, Decision, Event, StageId};
use crate::error::EngineError;
use crate::score::{self, INITIAL_SCORE, ProtectionTier};
use crate::timer::{Countdown, Tick};

use super::phase::{GamePhase, Input, PhaseChange, Trigger, target_phase};
use super::queue::{RandomShuffler, Shuffler, build_event_queue};
use super::session::{DecisionRecord, Session};
use super::snapshot::RaceSnapshot;

/// Race state machine.
///
/// Coordinates:
/// - Phase transitions per the transition table in [`target_phase`]
/// - Session creation and teardown
/// - Decision resolution, manual or by countdown expiry
/// - Countdown activation on entering `Racing`, deactivation on leaving it
pub struct RaceEngine {
    catalog: Arc<Catalog>,
    shuffler: Box<dyn Shuffler>,
    phase: GamePhase,
    session: Option<Session>,
    countdown: Countdown,
}

impl std::fmt::Debug for RaceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceEngine")
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("countdown", &self.countdown)
            .finish_non_exhaustive()
    }
}

impl RaceEngine {
    /// Creates an engine in `Intro` with an OS-seeded shuffler.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, event_seconds: u32) -> Self {
        Self {
            catalog,
            shuffler: Box::new(RandomShuffler::from_os_rng()),
            phase: GamePhase::Intro,
            session: None,
            countdown: Countdown::new(event_seconds),
        }
    }

    /// Replaces the shuffler used for future queues.
    #[must_use]
    pub fn with_shuffler(mut self, shuffler: impl Shuffler + 'static) -> Self {
        self.shuffler = Box::new(shuffler);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Catalog the engine builds queues from.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The per-event countdown.
    #[must_use]
    pub const fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Current score; [`INITIAL_SCORE`] when no session is active.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.session.as_ref().map_or(INITIAL_SCORE, Session::score)
    }

    /// Event currently on screen.
    #[must_use]
    pub fn current_event(&self) -> Option<&Arc<Event>> {
        self.session.as_ref().and_then(Session::current_event)
    }

    /// Resolved decisions of the active session.
    #[must_use]
    pub fn timeline(&self) -> &[DecisionRecord] {
        self.session
            .as_ref()
            .map(Session::timeline)
            .unwrap_or_default()
    }

    /// Returns `true` when the current event is the last one in the queue.
    #[must_use]
    pub fn is_last_event(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_last_event)
    }

    // ========================================================================
    // Derived values
    // ========================================================================

    /// Tier of the current score.
    #[must_use]
    pub fn tier(&self) -> ProtectionTier {
        ProtectionTier::from_score(self.score())
    }

    /// Score as reported at the end of the race.
    #[must_use]
    pub fn final_score(&self) -> i32 {
        score::normalize_score(f64::from(self.score()))
    }

    /// One line per exposed decision so far.
    #[must_use]
    pub fn risk_gaps(&self) -> Vec<String> {
        score::risk_gaps(self.timeline())
    }

    /// `round((position + 1) / queue_len * 100)`, or 0 with no queue.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        let Some(session) = self.session.as_ref() else {
            return 0;
        };
        let len = session.queue().len();
        if len == 0 {
            return 0;
        }
        let done = session.position() + 1;
        let percent = (done * 200 + len) / (2 * len);
        u32::try_from(percent).unwrap_or(u32::MAX)
    }

    /// Point-in-time copy of every engine output.
    #[must_use]
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot::capture(self)
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Dispatches a payload-carrying input to the matching method.
    ///
    /// # Errors
    ///
    /// Only [`Input::SelectStage`] can fail; see [`Self::select_stage`].
    pub fn apply(&mut self, input: Input) -> Result<Option<PhaseChange>, EngineError> {
        Ok(match input {
            Input::Start => self.start(),
            Input::SelectStage(stage) => return self.select_stage(&stage),
            Input::Decide(decision) => self.decide(decision),
            Input::TimerExpired => self.timer_expired(),
            Input::Advance => self.advance(),
            Input::RevealScore => self.reveal_score(),
            Input::ViewTimeline => self.view_timeline(),
            Input::ProceedToConversion => self.proceed_to_conversion(),
            Input::OpenLeadForm => self.open_lead_form(),
            Input::SubmissionSucceeded => self.submission_succeeded(),
            Input::Restart => Some(self.restart()),
        })
    }

    /// `Intro` to `StageSelection`.
    pub fn start(&mut self) -> Option<PhaseChange> {
        self.simple(Trigger::Start)
    }

    /// Starts a session from `stage` onward and begins racing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownStage`] or [`EngineError::EmptyQueue`]
    /// if no queue can be built; the phase is left unchanged.
    pub fn select_stage(&mut self, stage: &StageId) -> Result<Option<PhaseChange>, EngineError> {
        if self.phase != GamePhase::StageSelection {
            return Ok(self.ignored(Trigger::SelectStage));
        }

        let queue = build_event_queue(&self.catalog, stage, self.shuffler.as_mut())?;
        let session = Session::new(Uuid::new_v4(), stage.clone(), queue);
        info!(
            session_id = %session.id(),
            stage = %stage,
            events = session.queue().len(),
            "session started"
        );
        self.session = Some(session);
        self.countdown.activate();
        Ok(Some(self.transition(Trigger::SelectStage, GamePhase::Racing)))
    }

    /// Resolves the current event with the player's answer.
    pub fn decide(&mut self, decision: Decision) -> Option<PhaseChange> {
        self.resolve(decision, Trigger::Decide)
    }

    /// Resolves the current event as exposed, as if the player ran out of time.
    pub fn timer_expired(&mut self) -> Option<PhaseChange> {
        self.resolve(Decision::Exposed, Trigger::TimerExpired)
    }

    /// Advances the countdown by one second, resolving the current event
    /// on expiry.
    pub fn tick(&mut self) -> Option<PhaseChange> {
        match self.countdown.tick() {
            Tick::Expired { generation } if self.phase == GamePhase::Racing => {
                debug!(generation, "countdown expired");
                self.timer_expired()
            }
            Tick::Expired { generation } => {
                debug!(generation, phase = %self.phase, "countdown expired outside racing");
                None
            }
            Tick::Running { .. } | Tick::Idle => None,
        }
    }

    /// Leaves feedback for the next event, or for `Finish` after the last one.
    pub fn advance(&mut self) -> Option<PhaseChange> {
        if self.phase != GamePhase::EventFeedback {
            return self.ignored(Trigger::Advance);
        }
        let session = self.session.as_mut()?;
        let was_last = session.is_last_event();
        session.advance();
        let to = target_phase(self.phase, Trigger::Advance, was_last)?;
        if to == GamePhase::Racing {
            self.countdown.activate();
        }
        Some(self.transition(Trigger::Advance, to))
    }

    /// `Finish` to `ScoreReveal`.
    pub fn reveal_score(&mut self) -> Option<PhaseChange> {
        self.simple(Trigger::RevealScore)
    }

    /// `ScoreReveal` to `Timeline`.
    pub fn view_timeline(&mut self) -> Option<PhaseChange> {
        self.simple(Trigger::ViewTimeline)
    }

    /// `Timeline` to `Conversion`.
    pub fn proceed_to_conversion(&mut self) -> Option<PhaseChange> {
        self.simple(Trigger::ProceedToConversion)
    }

    /// `Conversion` to `LeadForm`.
    pub fn open_lead_form(&mut self) -> Option<PhaseChange> {
        self.simple(Trigger::OpenLeadForm)
    }

    /// Lead accepted downstream; discards the session.
    pub fn submission_succeeded(&mut self) -> Option<PhaseChange> {
        if self.phase != GamePhase::LeadForm {
            return self.ignored(Trigger::SubmissionSucceeded);
        }
        self.reset();
        Some(self.transition(Trigger::SubmissionSucceeded, GamePhase::Intro))
    }

    /// Discards the session and returns to `Intro`. Valid in every phase.
    pub fn restart(&mut self) -> PhaseChange {
        self.reset();
        self.transition(Trigger::Restart, GamePhase::Intro)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn simple(&mut self, trigger: Trigger) -> Option<PhaseChange> {
        match target_phase(self.phase, trigger, false) {
            Some(to) => Some(self.transition(trigger, to)),
            None => self.ignored(trigger),
        }
    }

    fn resolve(&mut self, decision: Decision, trigger: Trigger) -> Option<PhaseChange> {
        if self.phase != GamePhase::Racing {
            return self.ignored(trigger);
        }
        self.countdown.deactivate();

        let automatic = trigger == Trigger::TimerExpired;
        let session = self.session.as_mut()?;
        let Some(record) = session.resolve(decision, automatic, self.catalog.stages()) else {
            debug!(trigger = %trigger, "no unresolved event; decision ignored");
            return None;
        };
        info!(
            event_id = %record.event_id,
            decision = %record.decision,
            severity = %record.severity,
            delta = record.score_delta,
            score = record.score_after,
            automatic,
            "decision resolved"
        );
        Some(self.transition(trigger, GamePhase::EventFeedback))
    }

    fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(session_id = %session.id(), "session discarded");
        }
        self.countdown.deactivate();
    }

    fn transition(&mut self, trigger: Trigger, to: GamePhase) -> PhaseChange {
        let change = PhaseChange {
            from: self.phase,
            to,
            trigger,
        };
        self.phase = to;
        info!(from = %change.from, to = %change.to, trigger = %trigger, "phase transition");
        change
    }

    fn ignored(&self, trigger: Trigger) -> Option<PhaseChange> {
        debug!(phase = %self.phase, trigger = %trigger, "trigger ignored");
        None
    }
}
