//! Configuration validation.
//!
//! Runs on the deserialized [`RaceConfig`] and collects every problem
//! instead of stopping at the first.

use std::collections::HashSet;

use crate::catalog::Severity;
use crate::config::schema::{CatalogConfig, LeadConfig, RaceConfig, TimerConfig};
use crate::error::ValidationIssue;

/// Accepted range for `timer.event_seconds`.
pub const EVENT_SECONDS_RANGE: std::ops::RangeInclusive<u32> = 1..=60;

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns the result.
    pub fn validate(&mut self, config: &RaceConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_timer(&config.timer);
        if let Some(catalog) = &config.catalog {
            self.validate_catalog(catalog);
        }
        if let Some(lead) = &config.lead {
            self.validate_lead(lead);
        }

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_timer(&mut self, timer: &TimerConfig) {
        if !EVENT_SECONDS_RANGE.contains(&timer.event_seconds) {
            self.add_error(
                "timer.event_seconds",
                &format!(
                    "must be between {} and {} seconds, got {}",
                    EVENT_SECONDS_RANGE.start(),
                    EVENT_SECONDS_RANGE.end(),
                    timer.event_seconds
                ),
            );
        }
    }

    fn validate_catalog(&mut self, catalog: &CatalogConfig) {
        if catalog.stages.is_empty() {
            self.add_error("catalog.stages", "at least one stage is required");
        }

        let mut stage_ids = HashSet::new();
        let mut orders = HashSet::new();
        for (i, stage) in catalog.stages.iter().enumerate() {
            let path = format!("catalog.stages[{i}]");
            if stage.id.as_str().trim().is_empty() {
                self.add_error(&format!("{path}.id"), "stage id cannot be empty");
            } else if !stage_ids.insert(stage.id.as_str()) {
                self.add_error(
                    &format!("{path}.id"),
                    &format!("duplicate stage id '{}'", stage.id),
                );
            }
            if stage.label.trim().is_empty() {
                self.add_error(&format!("{path}.label"), "stage label cannot be empty");
            }
            if !orders.insert(stage.order) {
                self.add_error(
                    &format!("{path}.order"),
                    &format!("duplicate stage order {}", stage.order),
                );
            }
        }

        if catalog.events.is_empty() {
            self.add_error("catalog.events", "at least one event is required");
        }

        let mut event_ids = HashSet::new();
        let mut stages_with_events = HashSet::new();
        for (i, event) in catalog.events.iter().enumerate() {
            let path = format!("catalog.events[{i}]");
            if event.id.trim().is_empty() {
                self.add_error(&format!("{path}.id"), "event id cannot be empty");
            } else if !event_ids.insert(event.id.as_str()) {
                self.add_error(
                    &format!("{path}.id"),
                    &format!("duplicate event id '{}'", event.id),
                );
            }
            if event.title.trim().is_empty() {
                self.add_error(&format!("{path}.title"), "event title cannot be empty");
            }
            if stage_ids.contains(event.stage.as_str()) {
                stages_with_events.insert(event.stage.as_str());
            } else {
                self.add_error(
                    &format!("{path}.stage"),
                    &format!("unknown stage '{}'", event.stage),
                );
            }
            if event.severity == Severity::Unknown {
                self.add_warning(
                    &format!("{path}.severity"),
                    "unknown severity; the event will not change the score",
                );
            }
        }

        for (i, stage) in catalog.stages.iter().enumerate() {
            if !stage.id.as_str().is_empty() && !stages_with_events.contains(stage.id.as_str()) {
                self.add_warning(
                    &format!("catalog.stages[{i}]"),
                    &format!("stage '{}' has no events", stage.id),
                );
            }
        }
    }

    fn validate_lead(&mut self, lead: &LeadConfig) {
        if let Some(endpoint) = &lead.endpoint {
            let endpoint = endpoint.trim();
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                self.add_error("lead.endpoint", "endpoint must be an http:// or https:// URL");
            }
        }

        if lead.time_slots.is_empty() {
            self.add_error("lead.time_slots", "at least one time slot is required");
        }
        for (i, slot) in lead.time_slots.iter().enumerate() {
            if slot.trim().is_empty() {
                self.add_error(&format!("lead.time_slots[{i}]"), "time slot cannot be empty");
            }
        }

        if lead.timeout_secs == Some(0) {
            self.add_error("lead.timeout_secs", "timeout must be at least 1 second");
        }
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue::error(path, message));
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue::warning(path, message));
    }
}
