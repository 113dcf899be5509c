//! Event queue construction.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::catalog::{Catalog, Event, StageId};
use crate::error::EngineError;

/// Reorders one stage's events in place.
pub trait Shuffler: Send {
    /// Shuffles `events`.
    fn shuffle(&mut self, events: &mut [Arc<Event>]);
}

/// Uniform Fisher-Yates shuffle over a `StdRng`.
#[derive(Debug)]
pub struct RandomShuffler {
    rng: StdRng,
}

impl RandomShuffler {
    /// Seeds from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic shuffler for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomShuffler {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

impl Shuffler for RandomShuffler {
    fn shuffle(&mut self, events: &mut [Arc<Event>]) {
        events.shuffle(&mut self.rng);
    }
}

/// Leaves catalog order untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepOrder;

impl Shuffler for KeepOrder {
    fn shuffle(&mut self, _events: &mut [Arc<Event>]) {}
}

/// Builds the queue for a session starting at `start`.
///
/// Stages are visited in registry order from `start` onward; each stage's
/// events are shuffled independently, so stage grouping survives.
///
/// # Errors
///
/// Returns [`EngineError::UnknownStage`] if `start` is not registered and
/// [`EngineError::EmptyQueue`] if no events fall in the selected range.
pub fn build_event_queue(
    catalog: &Catalog,
    start: &StageId,
    shuffler: &mut dyn Shuffler,
) -> Result<Vec<Arc<Event>>, EngineError> {
    let stages = catalog
        .stages()
        .from_stage(start)
        .ok_or_else(|| EngineError::UnknownStage(start.to_string()))?;

    let mut queue = Vec::new();
    for stage in stages {
        let mut group: Vec<Arc<Event>> = catalog.events_for(&stage.id).cloned().collect();
        shuffler.shuffle(&mut group);
        queue.extend(group);
    }

    if queue.is_empty() {
        return Err(EngineError::EmptyQueue(start.to_string()));
    }
    Ok(queue)
}
