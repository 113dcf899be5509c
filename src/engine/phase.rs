//! Game phases, triggers, and the transition table.

use serde::{Deserialize, Serialize};

use crate::catalog::{Decision, StageId};

/// State of the race state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Landing state.
    Intro,
    /// Waiting for the player to pick a starting stage.
    StageSelection,
    /// An event is on screen and the countdown is running.
    Racing,
    /// The last decision's outcome is on screen.
    EventFeedback,
    /// Every queued event has been resolved.
    Finish,
    /// Final score shown.
    ScoreReveal,
    /// Decision timeline shown.
    Timeline,
    /// Call-to-action screen.
    Conversion,
    /// Lead form open.
    LeadForm,
}

impl GamePhase {
    /// Every phase in forward order.
    pub const ALL: [Self; 9] = [
        Self::Intro,
        Self::StageSelection,
        Self::Racing,
        Self::EventFeedback,
        Self::Finish,
        Self::ScoreReveal,
        Self::Timeline,
        Self::Conversion,
        Self::LeadForm,
    ];

    /// Snake-case name, also used as a metrics label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::StageSelection => "stage_selection",
            Self::Racing => "racing",
            Self::EventFeedback => "event_feedback",
            Self::Finish => "finish",
            Self::ScoreReveal => "score_reveal",
            Self::Timeline => "timeline",
            Self::Conversion => "conversion",
            Self::LeadForm => "lead_form",
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of an input, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Leave the intro.
    Start,
    /// Pick the starting stage.
    SelectStage,
    /// Manual protected/exposed answer.
    Decide,
    /// Countdown reached zero; resolves as exposed.
    TimerExpired,
    /// Continue after feedback.
    Advance,
    /// Show the final score.
    RevealScore,
    /// Show the timeline.
    ViewTimeline,
    /// Go to the call-to-action screen.
    ProceedToConversion,
    /// Open the lead form ("book a slot").
    OpenLeadForm,
    /// The lead was accepted downstream.
    SubmissionSucceeded,
    /// Discard the session and return to the intro.
    Restart,
}

impl Trigger {
    /// Snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SelectStage => "select_stage",
            Self::Decide => "decide",
            Self::TimerExpired => "timer_expired",
            Self::Advance => "advance",
            Self::RevealScore => "reveal_score",
            Self::ViewTimeline => "view_timeline",
            Self::ProceedToConversion => "proceed_to_conversion",
            Self::OpenLeadForm => "open_lead_form",
            Self::SubmissionSucceeded => "submission_succeeded",
            Self::Restart => "restart",
        }
    }

    /// Returns the phase this trigger is valid in, or `None` for
    /// [`Trigger::Restart`], which is valid everywhere.
    #[must_use]
    pub const fn source_phase(self) -> Option<GamePhase> {
        match self {
            Self::Start => Some(GamePhase::Intro),
            Self::SelectStage => Some(GamePhase::StageSelection),
            Self::Decide | Self::TimerExpired => Some(GamePhase::Racing),
            Self::Advance => Some(GamePhase::EventFeedback),
            Self::RevealScore => Some(GamePhase::Finish),
            Self::ViewTimeline => Some(GamePhase::ScoreReveal),
            Self::ProceedToConversion => Some(GamePhase::Timeline),
            Self::OpenLeadForm => Some(GamePhase::Conversion),
            Self::SubmissionSucceeded => Some(GamePhase::LeadForm),
            Self::Restart => None,
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes the target phase for `trigger` fired in `from`.
///
/// `is_last_event` only matters for [`Trigger::Advance`]. Returns `None`
/// when the trigger is not valid in `from`.
#[must_use]
pub const fn target_phase(from: GamePhase, trigger: Trigger, is_last_event: bool) -> Option<GamePhase> {
    if let Trigger::Restart = trigger {
        return Some(GamePhase::Intro);
    }
    match (from, trigger) {
        (GamePhase::Intro, Trigger::Start) => Some(GamePhase::StageSelection),
        (GamePhase::StageSelection, Trigger::SelectStage) => Some(GamePhase::Racing),
        (GamePhase::Racing, Trigger::Decide | Trigger::TimerExpired) => {
            Some(GamePhase::EventFeedback)
        }
        (GamePhase::EventFeedback, Trigger::Advance) => {
            if is_last_event {
                Some(GamePhase::Finish)
            } else {
                Some(GamePhase::Racing)
            }
        }
        (GamePhase::Finish, Trigger::RevealScore) => Some(GamePhase::ScoreReveal),
        (GamePhase::ScoreReveal, Trigger::ViewTimeline) => Some(GamePhase::Timeline),
        (GamePhase::Timeline, Trigger::ProceedToConversion) => Some(GamePhase::Conversion),
        (GamePhase::Conversion, Trigger::OpenLeadForm) => Some(GamePhase::LeadForm),
        (GamePhase::LeadForm, Trigger::SubmissionSucceeded) => Some(GamePhase::Intro),
        _ => None,
    }
}

/// An input to the engine, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// See [`Trigger::Start`].
    Start,
    /// See [`Trigger::SelectStage`].
    SelectStage(StageId),
    /// See [`Trigger::Decide`].
    Decide(Decision),
    /// See [`Trigger::TimerExpired`].
    TimerExpired,
    /// See [`Trigger::Advance`].
    Advance,
    /// See [`Trigger::RevealScore`].
    RevealScore,
    /// See [`Trigger::ViewTimeline`].
    ViewTimeline,
    /// See [`Trigger::ProceedToConversion`].
    ProceedToConversion,
    /// See [`Trigger::OpenLeadForm`].
    OpenLeadForm,
    /// See [`Trigger::SubmissionSucceeded`].
    SubmissionSucceeded,
    /// See [`Trigger::Restart`].
    Restart,
}

/// Record of one phase change, returned to the caller of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseChange {
    /// Phase before the trigger
    pub from: GamePhase,
    /// Phase after the trigger
    pub to: GamePhase,
    /// What caused the change
    pub trigger: Trigger,
}
