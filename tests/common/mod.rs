//! Shared integration-test harness: binary spawning, deterministic engines,
//! and an in-process lead endpoint.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::{Value, json};

use milestone_race::catalog::{Catalog, Decision, Event, Severity, Stage, StageId};
use milestone_race::engine::{GamePhase, KeepOrder, RaceEngine};

/// Path to a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Runs the binary to completion with `args`.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_command(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_milestone-race"))
        .args(args)
        .env_remove("MILESTONE_RACE_CONFIG")
        .env_remove("MILESTONE_RACE_LEAD_ENDPOINT")
        .output()
        .expect("failed to spawn milestone-race")
}

/// Runs the binary with `input` piped to stdin.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_with_input(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_milestone-race"))
        .args(args)
        .env_remove("MILESTONE_RACE_CONFIG")
        .env_remove("MILESTONE_RACE_LEAD_ENDPOINT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn milestone-race");

    child
        .stdin
        .take()
        .expect("stdin not captured")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");

    child.wait_with_output().expect("failed to wait for milestone-race")
}

// ============================================================================
// Engines
// ============================================================================

/// Built-in catalog engine with unshuffled queues.
pub fn builtin_engine() -> RaceEngine {
    RaceEngine::new(Arc::new(Catalog::builtin()), 5).with_shuffler(KeepOrder)
}

/// A one-stage catalog whose events all share `severity`.
pub fn uniform_catalog(severity: Severity, count: usize) -> Catalog {
    let stage = Stage {
        id: StageId::new("solo"),
        label: "Solo".to_string(),
        description: String::new(),
        order: 1,
    };
    let events = (1..=count)
        .map(|i| {
            Event::new(
                format!("solo-{i:02}"),
                "solo",
                format!("Risk {i}"),
                String::new(),
                severity,
            )
        })
        .collect();
    Catalog::new(vec![stage], events)
}

/// Starts a race from `stage` and moves it to `Racing`.
#[allow(clippy::missing_panics_doc)]
pub fn race_from(mut engine: RaceEngine, stage: &str) -> RaceEngine {
    engine.start();
    engine
        .select_stage(&StageId::new(stage))
        .expect("stage should exist");
    assert_eq!(engine.phase(), GamePhase::Racing);
    engine
}

/// Decides and advances once per entry in `decisions`.
pub fn play(engine: &mut RaceEngine, decisions: &[Decision]) {
    for &decision in decisions {
        engine.decide(decision);
        engine.advance();
    }
}

// ============================================================================
// Lead Endpoint
// ============================================================================

/// Requests received by a [`MockLeadServer`].
pub type Received = Arc<Mutex<Vec<Value>>>;

/// In-process HTTP server standing in for the CRM.
pub struct MockLeadServer {
    /// Base URL; leads arrive at `<base_url>/leads`.
    pub base_url: String,
    /// Every JSON body posted so far.
    pub received: Received,
    task: tokio::task::JoinHandle<()>,
}

impl MockLeadServer {
    /// Starts a server that answers `POST /leads` with `status`.
    #[allow(clippy::missing_panics_doc)]
    pub async fn start(status: StatusCode) -> Self {
        let received: Received = Arc::default();

        let app = axum::Router::new()
            .route(
                "/leads",
                post(
                    move |State(received): State<Received>, Json(body): Json<Value>| async move {
                        received.lock().unwrap().push(body);
                        (status, Json(json!({ "ok": status.is_success() })))
                    },
                ),
            )
            .with_state(Arc::clone(&received));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock lead server");
        let addr = listener.local_addr().expect("no local addr");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            received,
            task,
        }
    }

    /// Number of leads received.
    #[allow(clippy::missing_panics_doc)]
    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl Drop for MockLeadServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
