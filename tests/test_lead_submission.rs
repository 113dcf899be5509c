mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::NaiveDate;

use milestone_race::catalog::{Catalog, Decision, StageId};
use milestone_race::engine::{GamePhase, Input, KeepOrder, RaceEngine};
use milestone_race::error::LeadError;
use milestone_race::lead::{
    DEFAULT_TIMEOUT, HttpLeadSubmitter, LeadForm, LeadSubmission, LeadSubmitter,
    default_time_slots,
};
use milestone_race::observability::EventEmitter;
use milestone_race::runtime::{RaceHandle, RaceRuntime};

use common::MockLeadServer;

fn form() -> LeadForm {
    LeadForm {
        name: "Asha Rao".to_string(),
        mobile: "98765-43210".to_string(),
        preferred_date: "2031-03-10".to_string(),
        preferred_slot: "11:00 AM - 1:00 PM".to_string(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2031, 3, 1).unwrap()
}

/// Plays retirement (protected, exposed, protected) up to the lead form.
async fn race_to_lead_form() -> (RaceHandle, tokio::task::JoinHandle<()>) {
    let engine = RaceEngine::new(Arc::new(Catalog::builtin()), 5).with_shuffler(KeepOrder);
    let (handle, task) = RaceRuntime::spawn(engine, Arc::new(EventEmitter::noop()));

    handle.apply(Input::Start).await.unwrap();
    handle
        .apply(Input::SelectStage(StageId::new("retirement")))
        .await
        .unwrap();
    for decision in [Decision::Protected, Decision::Exposed, Decision::Protected] {
        handle.apply(Input::Decide(decision)).await.unwrap();
        handle.apply(Input::Advance).await.unwrap();
    }
    for input in [
        Input::RevealScore,
        Input::ViewTimeline,
        Input::ProceedToConversion,
        Input::OpenLeadForm,
    ] {
        handle.apply(input).await.unwrap();
    }
    assert_eq!(handle.snapshot().await.unwrap().phase, GamePhase::LeadForm);
    (handle, task)
}

#[tokio::test]
async fn accepted_lead_returns_to_intro() {
    let server = MockLeadServer::start(StatusCode::CREATED).await;
    let (handle, _task) = race_to_lead_form().await;

    let snapshot = handle.snapshot().await.unwrap();
    let lead =
        LeadSubmission::from_snapshot(&form(), &snapshot, &default_time_slots(), today()).unwrap();

    let submitter = HttpLeadSubmitter::new(&server.base_url, DEFAULT_TIMEOUT).unwrap();
    let response = submitter.submit(&lead).await.unwrap();
    assert_eq!(response, Some(serde_json::json!({ "ok": true })));

    let change = handle
        .apply(Input::SubmissionSucceeded)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(change.to, GamePhase::Intro);
    assert!(handle.snapshot().await.unwrap().session_id.is_none());

    assert_eq!(server.count(), 1);
    let body = server.received.lock().unwrap()[0].clone();
    assert_eq!(body["gameId"], snapshot.session_id.unwrap().to_string());
    assert_eq!(body["mobile"], "9876543210");
    assert_eq!(body["lifeProtectionScore"], 58);
    assert_eq!(body["protectionCategory"], "Medium Protection");
    assert_eq!(body["riskSummary"].as_array().unwrap().len(), 1);
    assert_eq!(body["source"], "life-milestone-race");
    handle.shutdown();
}

#[tokio::test]
async fn rejected_lead_keeps_session() {
    let server = MockLeadServer::start(StatusCode::SERVICE_UNAVAILABLE).await;
    let (handle, _task) = race_to_lead_form().await;

    let before = handle.snapshot().await.unwrap();
    let lead =
        LeadSubmission::from_snapshot(&form(), &before, &default_time_slots(), today()).unwrap();

    let submitter = HttpLeadSubmitter::new(&server.base_url, DEFAULT_TIMEOUT).unwrap();
    let err = submitter.submit(&lead).await.unwrap_err();
    assert!(matches!(err, LeadError::Rejected { status: 503 }));

    let after = handle.snapshot().await.unwrap();
    assert_eq!(after.phase, GamePhase::LeadForm);
    assert_eq!(after.session_id, before.session_id);
    assert_eq!(after.final_score, before.final_score);

    // Retry succeeds against a healthy endpoint
    let healthy = MockLeadServer::start(StatusCode::OK).await;
    let submitter = HttpLeadSubmitter::new(&healthy.base_url, DEFAULT_TIMEOUT).unwrap();
    assert!(submitter.submit(&lead).await.is_ok());
    assert_eq!(healthy.count(), 1);
    handle.shutdown();
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let (handle, _task) = race_to_lead_form().await;
    let snapshot = handle.snapshot().await.unwrap();
    let lead =
        LeadSubmission::from_snapshot(&form(), &snapshot, &default_time_slots(), today()).unwrap();

    // Port 9 (discard) is closed on test hosts
    let submitter = HttpLeadSubmitter::new("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
    let err = submitter.submit(&lead).await.unwrap_err();
    assert!(matches!(err, LeadError::Transport(_)));
    assert_eq!(handle.snapshot().await.unwrap().phase, GamePhase::LeadForm);
    handle.shutdown();
}

#[tokio::test]
async fn invalid_form_never_reaches_endpoint() {
    let server = MockLeadServer::start(StatusCode::CREATED).await;
    let (handle, _task) = race_to_lead_form().await;
    let snapshot = handle.snapshot().await.unwrap();

    let bad = LeadForm {
        name: "   ".to_string(),
        preferred_date: "2031-02-01".to_string(),
        ..form()
    };
    let Err(LeadError::Invalid { issues }) =
        LeadSubmission::from_snapshot(&bad, &snapshot, &default_time_slots(), today())
    else {
        panic!("expected invalid form");
    };
    let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, ["name", "preferredDate"]);
    assert_eq!(server.count(), 0);
    handle.shutdown();
}
