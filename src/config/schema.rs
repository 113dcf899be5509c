//! Configuration schema types.
//!
//! Every section is optional; an empty file yields the built-in game.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Event, Severity, Stage, StageId};
use crate::lead::default_time_slots;
use crate::timer::DEFAULT_EVENT_SECONDS;

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration for a race.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RaceConfig {
    /// Countdown settings
    #[serde(default)]
    pub timer: TimerConfig,

    /// Custom stages and events; the built-in catalog when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogConfig>,

    /// Lead capture settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead: Option<LeadConfig>,
}

impl RaceConfig {
    /// Builds the catalog this configuration describes.
    #[must_use]
    pub fn build_catalog(&self) -> Catalog {
        self.catalog
            .as_ref()
            .map_or_else(Catalog::builtin, CatalogConfig::build)
    }

    /// Offered consultation slots.
    #[must_use]
    pub fn time_slots(&self) -> Vec<String> {
        self.lead
            .as_ref()
            .map_or_else(default_time_slots, |l| l.time_slots.clone())
    }

    /// Configured lead endpoint, if any.
    #[must_use]
    pub fn lead_endpoint(&self) -> Option<&str> {
        self.lead.as_ref().and_then(|l| l.endpoint.as_deref())
    }
}

// ============================================================================
// Timer
// ============================================================================

/// Countdown settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Seconds per event (1..=60)
    #[serde(default = "default_event_seconds")]
    pub event_seconds: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            event_seconds: DEFAULT_EVENT_SECONDS,
        }
    }
}

const fn default_event_seconds() -> u32 {
    DEFAULT_EVENT_SECONDS
}

// ============================================================================
// Catalog
// ============================================================================

/// Custom game data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Life stages
    #[serde(default)]
    pub stages: Vec<Stage>,

    /// Risk events
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

impl CatalogConfig {
    /// Converts to a runtime catalog. Impacts come from the severity table.
    #[must_use]
    pub fn build(&self) -> Catalog {
        Catalog::new(
            self.stages.clone(),
            self.events.iter().map(EventConfig::to_event).collect(),
        )
    }
}

/// One risk event as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Unique event id
    pub id: String,
    /// Stage the event belongs to
    pub stage: StageId,
    /// Headline
    pub title: String,
    /// Scenario text
    #[serde(default)]
    pub description: String,
    /// `high`, `medium` or `moderate`
    pub severity: Severity,
}

impl EventConfig {
    /// Builds the catalog event.
    #[must_use]
    pub fn to_event(&self) -> Event {
        Event::new(
            self.id.clone(),
            self.stage.clone(),
            self.title.clone(),
            self.description.clone(),
            self.severity,
        )
    }
}

// ============================================================================
// Lead
// ============================================================================

/// Lead capture settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadConfig {
    /// Base URL; leads are posted to `<endpoint>/leads`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Consultation slots offered on the form
    #[serde(default = "default_time_slots")]
    pub time_slots: Vec<String>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            time_slots: default_time_slots(),
            timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: RaceConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.timer.event_seconds, 5);
        assert!(config.catalog.is_none());
        assert_eq!(config.time_slots().len(), 5);
        assert!(config.lead_endpoint().is_none());
        assert_eq!(config.build_catalog().events().len(), 15);
    }

    #[test]
    fn custom_catalog_derives_impacts() {
        let yaml = r"
timer:
  event_seconds: 8
catalog:
  stages:
    - id: student
      label: Student
      order: 1
  events:
    - id: st-01
      stage: student
      title: Laptop Stolen
      severity: moderate
    - id: st-02
      stage: student
      title: Hostel Fire
      severity: catastrophic
lead:
  endpoint: https://crm.example.com/api
  time_slots: ['Morning']
";
        let config: RaceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.timer.event_seconds, 8);
        let catalog = config.build_catalog();
        assert_eq!(catalog.stages().len(), 1);

        let laptop = catalog.event("st-01").unwrap();
        assert_eq!(laptop.impact_protected, 5);
        assert_eq!(laptop.impact_exposed, -8);

        let fire = catalog.event("st-02").unwrap();
        assert_eq!(fire.severity, Severity::Unknown);
        assert_eq!(fire.impact_exposed, 0);

        assert_eq!(config.lead_endpoint(), Some("https://crm.example.com/api"));
        assert_eq!(config.time_slots(), ["Morning"]);
    }

    #[test]
    fn lead_section_without_slots_gets_defaults() {
        let config: RaceConfig = serde_yaml::from_str("lead:\n  endpoint: http://x\n").unwrap();
        assert_eq!(config.time_slots().len(), 5);
    }
}
