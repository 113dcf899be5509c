//! Static game data: stages, events, and the severity impact table.
//!
//! # Architecture
//!
//! - [`StageRegistry`]: stages ordered by `order`, sliceable "from stage N onward"
//! - [`Event`]: immutable risk event; impacts derived from [`Severity`]
//! - [`Catalog`]: stages plus events, shared read-only behind an `Arc`
//! - [`builtin`]: the default five-stage, fifteen-event data set

pub mod builtin;
pub mod event;
pub mod severity;
pub mod stage;

use std::sync::Arc;

pub use event::Event;
pub use severity::{Decision, Impact, Severity};
pub use stage::{Stage, StageId, StageRegistry};

/// Stages and events for one game.
#[derive(Debug, Clone)]
pub struct Catalog {
    stages: StageRegistry,
    events: Vec<Arc<Event>>,
}

impl Catalog {
    /// Builds a catalog from stages and events.
    ///
    /// Event order is preserved; it is the order the queue builder sees
    /// before shuffling.
    #[must_use]
    pub fn new(stages: Vec<Stage>, events: Vec<Event>) -> Self {
        Self {
            stages: StageRegistry::new(stages),
            events: events.into_iter().map(Arc::new).collect(),
        }
    }

    /// The default catalog: five stages with three events each.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin::stages(), builtin::events())
    }

    /// Returns the stage registry.
    #[must_use]
    pub const fn stages(&self) -> &StageRegistry {
        &self.stages
    }

    /// Returns every event in catalog order.
    #[must_use]
    pub fn events(&self) -> &[Arc<Event>] {
        &self.events
    }

    /// Returns the events tagged with `stage`, in catalog order.
    pub fn events_for<'a>(&'a self, stage: &'a StageId) -> impl Iterator<Item = &'a Arc<Event>> {
        self.events.iter().filter(move |e| &e.stage == stage)
    }

    /// Looks up an event by id.
    #[must_use]
    pub fn event(&self, id: &str) -> Option<&Arc<Event>> {
        self.events.iter().find(|e| e.id == id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_has_five_ordered_stages() {
        let catalog = Catalog::builtin();
        let ids: Vec<&str> = catalog
            .stages()
            .stages()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(
            ids,
            ["first-job", "marriage", "parenthood", "mid-career", "retirement"]
        );
        let orders: Vec<u32> = catalog.stages().stages().iter().map(|s| s.order).collect();
        assert!(orders.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn builtin_has_three_events_per_stage() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.events().len(), 15);
        for stage in catalog.stages().stages() {
            let severities: HashSet<Severity> =
                catalog.events_for(&stage.id).map(|e| e.severity).collect();
            assert_eq!(catalog.events_for(&stage.id).count(), 3, "stage {}", stage.id);
            assert_eq!(severities.len(), 3, "stage {} should cover all tiers", stage.id);
        }
    }

    #[test]
    fn builtin_event_ids_are_unique() {
        let catalog = Catalog::builtin();
        let ids: HashSet<&str> = catalog.events().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.events().len());
    }

    #[test]
    fn event_lookup() {
        let catalog = Catalog::builtin();
        let event = catalog.event("mr-02").unwrap();
        assert_eq!(event.title, "Home Loan EMI Default Risk");
        assert_eq!(event.severity, Severity::Medium);
        assert!(catalog.event("zz-99").is_none());
    }
}
