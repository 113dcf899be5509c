//! Per-playthrough session state.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::catalog::{Decision, Event, Severity, StageId, StageRegistry};
use crate::score::{self, INITIAL_SCORE};

/// Immutable log entry for one resolved event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    /// Catalog event id
    pub event_id: String,
    /// Stage label (raw stage id if the registry does not know the stage)
    pub stage_label: String,
    /// Stage id
    pub stage_id: StageId,
    /// Event title
    pub title: String,
    /// Event severity
    pub severity: Severity,
    /// Protected or exposed
    pub decision: Decision,
    /// Delta applied, after compounding
    pub score_delta: i32,
    /// Score after clamping
    pub score_after: i32,
    /// `true` when the countdown resolved the event
    pub automatic: bool,
}

/// Summary of the most recent decision, shown between events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Protected or exposed
    pub decision: Decision,
    /// Delta applied
    pub delta: i32,
    /// Event severity
    pub severity: Severity,
    /// Event title
    pub title: String,
}

/// Mutable state of one playthrough.
///
/// The event queue is fixed at construction. `position` only moves
/// forward and the timeline only grows, one record per queue index.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    selected_stage: StageId,
    score: i32,
    queue: Vec<Arc<Event>>,
    position: usize,
    timeline: Vec<DecisionRecord>,
    last_feedback: Option<Feedback>,
    /// Consecutive exposed high-severity decisions, including the latest.
    exposed_high_streak: u32,
}

impl Session {
    /// Starts a session over a prebuilt queue.
    #[must_use]
    pub fn new(id: Uuid, selected_stage: StageId, queue: Vec<Arc<Event>>) -> Self {
        Self {
            id,
            selected_stage,
            score: INITIAL_SCORE,
            queue,
            position: 0,
            timeline: Vec::new(),
            last_feedback: None,
            exposed_high_streak: 0,
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Stage the session started from.
    #[must_use]
    pub const fn selected_stage(&self) -> &StageId {
        &self.selected_stage
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> i32 {
        self.score
    }

    /// The session's event queue.
    #[must_use]
    pub fn queue(&self) -> &[Arc<Event>] {
        &self.queue
    }

    /// Index of the current event.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Resolved decisions, oldest first.
    #[must_use]
    pub fn timeline(&self) -> &[DecisionRecord] {
        &self.timeline
    }

    /// The most recent decision summary, if not yet cleared.
    #[must_use]
    pub const fn last_feedback(&self) -> Option<&Feedback> {
        self.last_feedback.as_ref()
    }

    /// Event at `position`, if any.
    #[must_use]
    pub fn current_event(&self) -> Option<&Arc<Event>> {
        self.queue.get(self.position)
    }

    /// Returns `true` when `position` is on (or past) the final event.
    #[must_use]
    pub const fn is_last_event(&self) -> bool {
        self.position + 1 >= self.queue.len()
    }

    /// Returns `true` if the event at `position` already has a record.
    #[must_use]
    pub const fn is_current_resolved(&self) -> bool {
        self.timeline.len() > self.position
    }

    /// Resolves the current event.
    ///
    /// Returns `None` without touching any state when there is no current
    /// event or it has already been resolved.
    pub fn resolve(
        &mut self,
        decision: Decision,
        automatic: bool,
        stages: &StageRegistry,
    ) -> Option<&DecisionRecord> {
        if self.is_current_resolved() {
            return None;
        }
        let event = Arc::clone(self.current_event()?);

        let is_exposed_high = decision == Decision::Exposed && event.severity.is_high();
        if is_exposed_high {
            self.exposed_high_streak += 1;
        } else {
            self.exposed_high_streak = 0;
        }

        let change = score::calculate_score(
            self.score,
            event.impact_for(decision),
            is_exposed_high,
            self.exposed_high_streak,
        );
        self.score = change.new_score;

        self.last_feedback = Some(Feedback {
            decision,
            delta: change.applied_delta,
            severity: event.severity,
            title: event.title.clone(),
        });
        self.timeline.push(DecisionRecord {
            event_id: event.id.clone(),
            stage_label: stages.label_or_id(&event.stage).to_string(),
            stage_id: event.stage.clone(),
            title: event.title.clone(),
            severity: event.severity,
            decision,
            score_delta: change.applied_delta,
            score_after: change.new_score,
            automatic,
        });
        self.timeline.last()
    }

    /// Clears feedback and, unless on the last event, moves to the next one.
    ///
    /// Returns `true` if `position` moved.
    pub fn advance(&mut self) -> bool {
        self.last_feedback = None;
        if self.is_last_event() {
            return false;
        }
        self.position += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Stage};

    fn high_events(n: usize) -> Vec<Arc<Event>> {
        (0..n)
            .map(|i| {
                Arc::new(Event::new(
                    format!("h-{i}"),
                    "first-job",
                    format!("High {i}"),
                    "",
                    Severity::High,
                ))
            })
            .collect()
    }

    fn session_with(queue: Vec<Arc<Event>>) -> Session {
        Session::new(Uuid::new_v4(), StageId::new("first-job"), queue)
    }

    #[test]
    fn new_session_defaults() {
        let session = session_with(high_events(2));
        assert_eq!(session.score(), 50);
        assert_eq!(session.position(), 0);
        assert!(session.timeline().is_empty());
        assert!(session.last_feedback().is_none());
        assert_eq!(session.current_event().unwrap().id, "h-0");
    }

    #[test]
    fn exposed_high_streak_compounds() {
        let stages = Catalog::builtin().stages().clone();
        let mut session = session_with(high_events(3));

        let mut deltas = Vec::new();
        for _ in 0..3 {
            let record = session.resolve(Decision::Exposed, false, &stages).unwrap();
            deltas.push((record.score_delta, record.score_after));
            session.advance();
        }
        assert_eq!(deltas, [(-20, 30), (-25, 5), (-30, 0)]);
    }

    #[test]
    fn protected_decision_breaks_streak() {
        let stages = Catalog::builtin().stages().clone();
        let mut session = session_with(high_events(3));

        session.resolve(Decision::Exposed, false, &stages);
        session.advance();
        session.resolve(Decision::Protected, false, &stages);
        session.advance();
        let record = session.resolve(Decision::Exposed, false, &stages).unwrap();
        assert_eq!(record.score_delta, -20);
    }

    #[test]
    fn non_high_exposed_breaks_streak() {
        let stages = Catalog::builtin().stages().clone();
        let queue = vec![
            Arc::new(Event::new("a", "first-job", "A", "", Severity::High)),
            Arc::new(Event::new("b", "first-job", "B", "", Severity::Medium)),
            Arc::new(Event::new("c", "first-job", "C", "", Severity::High)),
        ];
        let mut session = session_with(queue);
        session.resolve(Decision::Exposed, false, &stages);
        session.advance();
        let medium = session.resolve(Decision::Exposed, false, &stages).unwrap();
        assert_eq!(medium.score_delta, -12);
        session.advance();
        let high = session.resolve(Decision::Exposed, false, &stages).unwrap();
        assert_eq!(high.score_delta, -20);
    }

    #[test]
    fn second_resolve_of_same_event_is_ignored() {
        let stages = Catalog::builtin().stages().clone();
        let mut session = session_with(high_events(2));
        assert!(session.resolve(Decision::Protected, false, &stages).is_some());
        assert!(session.resolve(Decision::Exposed, true, &stages).is_none());
        assert_eq!(session.timeline().len(), 1);
        assert_eq!(session.score(), 65);
    }

    #[test]
    fn unknown_stage_label_falls_back_to_id() {
        let stages = StageRegistry::new(vec![Stage {
            id: StageId::new("marriage"),
            label: "Marriage".to_string(),
            description: String::new(),
            order: 1,
        }]);
        let mut session = session_with(high_events(1));
        let record = session.resolve(Decision::Protected, false, &stages).unwrap();
        assert_eq!(record.stage_label, "first-job");
    }

    #[test]
    fn advance_stops_at_last_event() {
        let mut session = session_with(high_events(2));
        assert!(!session.is_last_event());
        assert!(session.advance());
        assert!(session.is_last_event());
        assert!(!session.advance());
        assert_eq!(session.position(), 1);
    }

    #[test]
    fn advance_clears_feedback() {
        let stages = Catalog::builtin().stages().clone();
        let mut session = session_with(high_events(2));
        session.resolve(Decision::Exposed, false, &stages);
        assert_eq!(
            session.last_feedback().map(|f| f.decision),
            Some(Decision::Exposed)
        );

        assert!(session.advance());
        assert!(session.last_feedback().is_none());

        session.resolve(Decision::Protected, false, &stages);
        assert!(!session.advance());
        assert!(session.last_feedback().is_none());
    }

    #[test]
    fn empty_queue_has_no_current_event() {
        let stages = Catalog::builtin().stages().clone();
        let mut session = session_with(Vec::new());
        assert!(session.current_event().is_none());
        assert!(session.resolve(Decision::Exposed, true, &stages).is_none());
        assert!(session.timeline().is_empty());
    }
}
