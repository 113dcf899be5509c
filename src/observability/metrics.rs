//! Prometheus metrics for races.
//!
//! Typed recording helpers over the `metrics` facade. Stage labels come
//! from loadable configuration, so only the first registered stages get
//! their own label.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::catalog::{Decision, Severity, StageId, StageRegistry};
use crate::engine::GamePhase;
use crate::error::RaceError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Maximum length for stage labels.
const MAX_STAGE_LABEL_LEN: usize = 32;

/// Registered stages beyond this many share [`OTHER_STAGE_LABEL`].
const MAX_STAGE_LABELS: usize = 16;

/// Label for stages outside the registry or past [`MAX_STAGE_LABELS`].
const OTHER_STAGE_LABEL: &str = "other";

/// Initializes the global metrics recorder.
///
/// With `Some(port)` a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`; otherwise the recorder is installed without one.
///
/// # Errors
///
/// Returns `RaceError::Io` if the recorder or listener cannot be installed.
pub fn init_metrics(port: Option<u16>) -> Result<(), RaceError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| RaceError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "milestone_race_sessions_started_total",
        "Sessions started, by starting stage"
    );
    describe_counter!(
        "milestone_race_decisions_total",
        "Resolved events, by decision, severity and whether the countdown resolved them"
    );
    describe_counter!(
        "milestone_race_phase_transitions_total",
        "Phase transitions"
    );
    describe_counter!(
        "milestone_race_timer_expiries_total",
        "Events auto-resolved by countdown expiry"
    );
    describe_gauge!("milestone_race_current_score", "Score of the active session");
    describe_histogram!(
        "milestone_race_final_score",
        "Final score of finished sessions"
    );
    describe_counter!(
        "milestone_race_leads_total",
        "Lead submissions, by outcome"
    );
}

/// Sanitizes a stage id for use as a metrics label.
///
/// Truncates to [`MAX_STAGE_LABEL_LEN`] characters and replaces anything
/// outside `[A-Za-z0-9_-]` with underscores.
#[must_use]
pub fn sanitize_stage_label(stage: &str) -> String {
    stage
        .chars()
        .take(MAX_STAGE_LABEL_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Maps a stage id to a bounded label set drawn from `registry`.
#[must_use]
pub fn stage_label(stage: &StageId, registry: &StageRegistry) -> String {
    match registry.position(stage) {
        Some(i) if i < MAX_STAGE_LABELS => sanitize_stage_label(stage.as_str()),
        _ => OTHER_STAGE_LABEL.to_string(),
    }
}

/// Records a session start.
pub fn record_session_started(stage: &StageId, registry: &StageRegistry) {
    counter!(
        "milestone_race_sessions_started_total",
        "stage" => stage_label(stage, registry)
    )
    .increment(1);
}

/// Records a resolved event and the resulting score.
pub fn record_decision(decision: Decision, severity: Severity, automatic: bool, score: i32) {
    let automatic = if automatic { "true" } else { "false" };
    counter!(
        "milestone_race_decisions_total",
        "decision" => decision.as_str(),
        "severity" => severity.as_str(),
        "automatic" => automatic,
    )
    .increment(1);
    gauge!("milestone_race_current_score").set(f64::from(score));
}

/// Records a phase transition.
pub fn record_phase_transition(from: GamePhase, to: GamePhase) {
    counter!(
        "milestone_race_phase_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
}

/// Records a countdown expiry.
pub fn record_timer_expiry() {
    counter!("milestone_race_timer_expiries_total").increment(1);
}

/// Records the final score of a finished session.
pub fn record_final_score(score: i32) {
    histogram!("milestone_race_final_score").record(f64::from(score));
}

/// Records a lead submission outcome.
pub fn record_lead(success: bool) {
    let outcome = if success { "accepted" } else { "failed" };
    counter!("milestone_race_leads_total", "outcome" => outcome).increment(1);
}
