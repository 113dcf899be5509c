//! Read-only view of the engine for presentation layers.

use serde::Serialize;
use uuid::Uuid;

use crate::catalog::{Event, StageId};
use crate::score::ProtectionTier;

use super::phase::GamePhase;
use super::race::RaceEngine;
use super::session::{DecisionRecord, Feedback};

/// Point-in-time copy of everything a consumer may render.
///
/// Derived fields (`protection_tier`, `final_score`, `risk_gaps`,
/// `progress_percent`) are computed at capture time from session state;
/// nothing here is stored back into the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceSnapshot {
    /// Active session id
    pub session_id: Option<Uuid>,
    /// Current phase
    pub phase: GamePhase,
    /// Current score (50 with no session)
    pub score: i32,
    /// Stage the session started from
    pub selected_stage: Option<StageId>,
    /// Event at the current position
    pub current_event: Option<Event>,
    /// Index of the current event
    pub current_event_index: usize,
    /// Total events in the queue
    pub queue_length: usize,
    /// Resolved decisions, oldest first
    pub timeline: Vec<DecisionRecord>,
    /// Most recent decision, until advanced past
    pub last_feedback: Option<Feedback>,
    /// Whether the countdown is running
    pub timer_active: bool,
    /// Seconds left on the countdown
    pub time_left: u32,
    /// Percentage of the countdown remaining
    pub timer_progress: f64,
    /// Whether the current event is the last one
    pub is_last_event: bool,
    /// Tier for the current score
    pub protection_tier: ProtectionTier,
    /// Display label for the tier
    pub tier_label: String,
    /// Color token for the tier
    pub tier_color: String,
    /// Rounded, clamped score
    pub final_score: i32,
    /// One line per exposed decision
    pub risk_gaps: Vec<String>,
    /// Race progress, 0..=100
    pub progress_percent: u32,
}

impl RaceSnapshot {
    pub(super) fn capture(engine: &RaceEngine) -> Self {
        let session = engine.session();
        let countdown = engine.countdown();
        let tier = engine.tier();
        Self {
            session_id: session.map(super::Session::id),
            phase: engine.phase(),
            score: engine.score(),
            selected_stage: session.map(|s| s.selected_stage().clone()),
            current_event: engine.current_event().map(|e| e.as_ref().clone()),
            current_event_index: session.map_or(0, super::Session::position),
            queue_length: session.map_or(0, |s| s.queue().len()),
            timeline: engine.timeline().to_vec(),
            last_feedback: session.and_then(|s| s.last_feedback().cloned()),
            timer_active: countdown.is_active(),
            time_left: countdown.time_left(),
            timer_progress: countdown.progress(),
            is_last_event: engine.is_last_event(),
            protection_tier: tier,
            tier_label: tier.label().to_string(),
            tier_color: tier.color().to_string(),
            final_score: engine.final_score(),
            risk_gaps: engine.risk_gaps(),
            progress_percent: engine.progress_percent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::catalog::{Catalog, Decision, StageId};
    use crate::engine::{GamePhase, KeepOrder, RaceEngine};

    #[test]
    fn idle_snapshot() {
        let engine = RaceEngine::new(Arc::new(Catalog::builtin()), 5);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, GamePhase::Intro);
        assert!(snapshot.session_id.is_none());
        assert_eq!(snapshot.score, 50);
        assert_eq!(snapshot.tier_label, "Medium Protection");
        assert_eq!(snapshot.queue_length, 0);
        assert_eq!(snapshot.progress_percent, 0);
    }

    #[test]
    fn snapshot_reflects_feedback() {
        let mut engine =
            RaceEngine::new(Arc::new(Catalog::builtin()), 5).with_shuffler(KeepOrder);
        engine.start();
        engine.select_stage(&StageId::new("marriage")).unwrap();
        engine.decide(Decision::Exposed);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, GamePhase::EventFeedback);
        assert_eq!(snapshot.selected_stage, Some(StageId::new("marriage")));
        assert_eq!(snapshot.queue_length, 12);
        assert_eq!(snapshot.score, 30);
        assert_eq!(snapshot.timeline.len(), 1);
        assert_eq!(snapshot.last_feedback.as_ref().unwrap().delta, -20);
        assert_eq!(snapshot.risk_gaps.len(), 1);
        assert!(snapshot.risk_gaps[0].starts_with("Marriage: "));
        assert!(!snapshot.timer_active);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let engine = RaceEngine::new(Arc::new(Catalog::builtin()), 5);
        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert_eq!(json["phase"], "intro");
        assert_eq!(json["protectionTier"], "MEDIUM");
        assert!(json.get("progressPercent").is_some());
        assert!(json.get("sessionId").is_some());
    }
}
