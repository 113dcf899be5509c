//! Lead payload and HTTP delivery.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::engine::{GamePhase, RaceSnapshot};
use crate::error::LeadError;

use super::form::LeadForm;

/// Value of the `source` field on every submission.
pub const LEAD_SOURCE: &str = "life-milestone-race";

/// Default request timeout for lead delivery.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON body posted to `<endpoint>/leads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    /// Session id the lead came from
    pub game_id: Uuid,
    /// Trimmed name
    pub name: String,
    /// Digits-only mobile number
    pub mobile: String,
    /// `YYYY-MM-DD`
    pub preferred_date: String,
    /// Chosen slot
    pub preferred_slot: String,
    /// Final score
    pub life_protection_score: i32,
    /// Tier label, e.g. "Medium Protection"
    pub protection_category: String,
    /// Risk gap lines
    pub risk_summary: Vec<String>,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
    /// Always [`LEAD_SOURCE`]
    pub source: &'static str,
}

impl LeadSubmission {
    /// Validates `form` and combines it with the race results.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::NotReady`] unless the snapshot is in the lead
    /// form phase with a session, or [`LeadError::Invalid`] if the form
    /// fails validation.
    pub fn from_snapshot(
        form: &LeadForm,
        snapshot: &RaceSnapshot,
        time_slots: &[String],
        today: NaiveDate,
    ) -> Result<Self, LeadError> {
        if snapshot.phase != GamePhase::LeadForm {
            return Err(LeadError::NotReady(snapshot.phase.to_string()));
        }
        let game_id = snapshot
            .session_id
            .ok_or_else(|| LeadError::NotReady("no active session".to_string()))?;

        form.validate(time_slots, today)?;

        Ok(Self {
            game_id,
            name: form.name.trim().to_string(),
            mobile: form.normalized_mobile(),
            preferred_date: form.preferred_date.trim().to_string(),
            preferred_slot: form.preferred_slot.trim().to_string(),
            life_protection_score: snapshot.final_score,
            protection_category: snapshot.tier_label.clone(),
            risk_summary: snapshot.risk_gaps.clone(),
            submitted_at: Utc::now(),
            source: LEAD_SOURCE,
        })
    }
}

/// Delivers leads to a downstream system.
#[async_trait::async_trait]
pub trait LeadSubmitter: Send + Sync {
    /// Delivers one lead. Returns the response body, if it was JSON.
    async fn submit(&self, lead: &LeadSubmission) -> Result<Option<serde_json::Value>, LeadError>;
}

/// Posts leads as JSON to `<endpoint>/leads`.
#[derive(Debug, Clone)]
pub struct HttpLeadSubmitter {
    client: reqwest::Client,
    url: String,
}

impl HttpLeadSubmitter {
    /// Creates a submitter for `endpoint` (a base URL).
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::MissingEndpoint`] for a blank endpoint or
    /// [`LeadError::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, LeadError> {
        let base = endpoint.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(LeadError::MissingEndpoint);
        }
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: format!("{base}/leads"),
        })
    }

    /// Full URL leads are posted to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl LeadSubmitter for HttpLeadSubmitter {
    async fn submit(&self, lead: &LeadSubmission) -> Result<Option<serde_json::Value>, LeadError> {
        debug!(url = %self.url, game_id = %lead.game_id, "submitting lead");

        let response = self.client.post(&self.url).json(lead).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "lead rejected");
            return Err(LeadError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<serde_json::Value>().await.ok())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{Catalog, Decision, StageId};
    use crate::engine::{KeepOrder, RaceEngine};
    use crate::lead::default_time_slots;

    fn form() -> LeadForm {
        LeadForm {
            name: "  Vikram Shah ".to_string(),
            mobile: "70123 45678".to_string(),
            preferred_date: "2030-01-15".to_string(),
            preferred_slot: "6:00 PM - 8:00 PM".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    fn engine_at_lead_form() -> RaceEngine {
        let mut engine =
            RaceEngine::new(Arc::new(Catalog::builtin()), 5).with_shuffler(KeepOrder);
        engine.start();
        engine.select_stage(&StageId::new("retirement")).unwrap();
        for decision in [Decision::Protected, Decision::Exposed, Decision::Protected] {
            engine.decide(decision);
            engine.advance();
        }
        engine.reveal_score();
        engine.view_timeline();
        engine.proceed_to_conversion();
        engine.open_lead_form();
        engine
    }

    #[test]
    fn submission_carries_race_results() {
        let engine = engine_at_lead_form();
        let snapshot = engine.snapshot();
        let lead =
            LeadSubmission::from_snapshot(&form(), &snapshot, &default_time_slots(), today())
                .unwrap();

        assert_eq!(Some(lead.game_id), snapshot.session_id);
        assert_eq!(lead.name, "Vikram Shah");
        assert_eq!(lead.mobile, "7012345678");
        // 50 + 15 - 12 + 5
        assert_eq!(lead.life_protection_score, 58);
        assert_eq!(lead.protection_category, "Medium Protection");
        assert_eq!(lead.risk_summary.len(), 1);
        assert_eq!(lead.source, "life-milestone-race");
    }

    #[test]
    fn submission_serializes_camel_case() {
        let engine = engine_at_lead_form();
        let lead = LeadSubmission::from_snapshot(
            &form(),
            &engine.snapshot(),
            &default_time_slots(),
            today(),
        )
        .unwrap();
        let json = serde_json::to_value(&lead).unwrap();
        for key in [
            "gameId",
            "name",
            "mobile",
            "preferredDate",
            "preferredSlot",
            "lifeProtectionScore",
            "protectionCategory",
            "riskSummary",
            "submittedAt",
            "source",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn submission_requires_lead_form_phase() {
        let engine = RaceEngine::new(Arc::new(Catalog::builtin()), 5);
        let err = LeadSubmission::from_snapshot(
            &form(),
            &engine.snapshot(),
            &default_time_slots(),
            today(),
        )
        .unwrap_err();
        assert!(matches!(err, LeadError::NotReady(_)));
    }

    #[test]
    fn invalid_form_is_rejected_before_delivery() {
        let engine = engine_at_lead_form();
        let bad = LeadForm {
            mobile: "12345".to_string(),
            ..form()
        };
        let err =
            LeadSubmission::from_snapshot(&bad, &engine.snapshot(), &default_time_slots(), today())
                .unwrap_err();
        assert!(matches!(err, LeadError::Invalid { .. }));
    }

    #[test]
    fn submitter_appends_leads_path() {
        let submitter =
            HttpLeadSubmitter::new("https://crm.example.com/api/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(submitter.url(), "https://crm.example.com/api/leads");
    }

    #[test]
    fn blank_endpoint_is_missing() {
        let err = HttpLeadSubmitter::new("  ", DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, LeadError::MissingEndpoint));
    }
}
