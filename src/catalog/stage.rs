//! Life stages and the ordered stage registry.

use serde::{Deserialize, Serialize};

/// Newtype wrapper for stage identifiers such as `"first-job"`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub String);

impl StageId {
    /// Creates a new `StageId` from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A named life milestone grouping related risk events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Unique identifier
    pub id: StageId,
    /// Display label
    pub label: String,
    /// Short tagline
    #[serde(default)]
    pub description: String,
    /// Sort key; strictly increasing across the registry
    pub order: u32,
}

/// Stages sorted by `order`.
///
/// The registry is immutable once built. Slicing "from stage N onward"
/// is what scopes a session's event queue.
#[derive(Debug, Clone, Default)]
pub struct StageRegistry {
    stages: Vec<Stage>,
}

impl StageRegistry {
    /// Builds a registry, sorting stages by `order`.
    #[must_use]
    pub fn new(mut stages: Vec<Stage>) -> Self {
        stages.sort_by_key(|s| s.order);
        Self { stages }
    }

    /// Returns all stages in order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if no stages are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Looks up a stage by id.
    #[must_use]
    pub fn get(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| &s.id == id)
    }

    /// Returns the index of the stage within the ordering.
    #[must_use]
    pub fn position(&self, id: &StageId) -> Option<usize> {
        self.stages.iter().position(|s| &s.id == id)
    }

    /// Returns the given stage and every later stage, or `None` if the
    /// stage is not registered.
    #[must_use]
    pub fn from_stage(&self, id: &StageId) -> Option<&[Stage]> {
        self.position(id).map(|idx| &self.stages[idx..])
    }

    /// Returns the stage label, falling back to the raw id for stages
    /// the registry does not know.
    #[must_use]
    pub fn label_or_id<'a>(&'a self, id: &'a StageId) -> &'a str {
        self.get(id).map_or(id.as_str(), |s| s.label.as_str())
    }
}
