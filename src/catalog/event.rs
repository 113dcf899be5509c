//! Risk events.

use serde::Serialize;

use super::severity::{Decision, Severity};
use super::stage::StageId;

/// One immutable risk event from the catalog.
///
/// Impacts are not stored independently: they are copied from the
/// severity table at construction, so every event of a tier scores
/// the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier (e.g. `"fj-01"`)
    pub id: String,
    /// Stage this event belongs to
    #[serde(rename = "stageId")]
    pub stage: StageId,
    /// Short headline
    pub title: String,
    /// Scenario description shown to the player
    pub description: String,
    /// Severity tier
    pub severity: Severity,
    /// Delta when protected
    pub impact_protected: i32,
    /// Delta when exposed
    pub impact_exposed: i32,
}

impl Event {
    /// Creates an event, deriving impacts from `severity`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        stage: impl Into<StageId>,
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        let impact = severity.impact();
        Self {
            id: id.into(),
            stage: stage.into(),
            title: title.into(),
            description: description.into(),
            severity,
            impact_protected: impact.protected,
            impact_exposed: impact.exposed,
        }
    }

    /// Returns the base delta for the given decision.
    #[must_use]
    pub const fn impact_for(&self, decision: Decision) -> i32 {
        match decision {
            Decision::Protected => self.impact_protected,
            Decision::Exposed => self.impact_exposed,
        }
    }
}
