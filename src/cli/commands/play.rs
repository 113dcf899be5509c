//! `play` command: the race in a terminal.
//!
//! The engine runs inside a [`RaceRuntime`]; this module only renders
//! snapshots and turns typed lines into engine inputs. The countdown keeps
//! running while the prompt waits, so an unanswered event resolves itself.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, Decision, StageId};
use crate::cli::args::PlayArgs;
use crate::config::validation::EVENT_SECONDS_RANGE;
use crate::engine::{GamePhase, Input, RaceEngine, RaceSnapshot, RandomShuffler};
use crate::error::{EngineError, LeadError, RaceError};
use crate::lead::{DEFAULT_TIMEOUT, HttpLeadSubmitter, LeadForm, LeadSubmission, LeadSubmitter};
use crate::observability::{EventEmitter, GameEvent, metrics};
use crate::runtime::{RaceHandle, RaceRuntime};
use crate::score::share_text;

use super::load_config;

// ============================================================================
// Entry Point
// ============================================================================

/// Play interactively on stdin/stdout.
///
/// # Errors
///
/// Returns a config error if `--config` cannot be loaded, a usage error for
/// an out-of-range `--timer-seconds`, or an I/O error if the events file
/// cannot be created.
pub async fn run(args: &PlayArgs, cancel: CancellationToken) -> Result<(), RaceError> {
    let config = load_config(args.config.as_deref())?;

    let event_seconds = args.timer_seconds.unwrap_or(config.timer.event_seconds);
    if !EVENT_SECONDS_RANGE.contains(&event_seconds) {
        return Err(RaceError::Usage(format!(
            "--timer-seconds must be between {} and {}",
            EVENT_SECONDS_RANGE.start(),
            EVENT_SECONDS_RANGE.end()
        )));
    }

    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        info!(port, "Prometheus metrics endpoint started");
    }

    let emitter = Arc::new(match &args.events {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    });

    let endpoint = args
        .lead_endpoint
        .as_deref()
        .or_else(|| config.lead_endpoint());
    let timeout = config
        .lead
        .as_ref()
        .and_then(|l| l.timeout_secs)
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
    let submitter: Option<Box<dyn LeadSubmitter>> = match endpoint {
        Some(endpoint) => Some(Box::new(HttpLeadSubmitter::new(endpoint, timeout)?)),
        None => None,
    };

    let catalog = Arc::new(config.build_catalog());
    let shuffler = args
        .seed
        .map_or_else(RandomShuffler::from_os_rng, RandomShuffler::seeded);
    let engine = RaceEngine::new(Arc::clone(&catalog), event_seconds).with_shuffler(shuffler);

    let (handle, task) = RaceRuntime::spawn(engine, Arc::clone(&emitter));
    let mut session = PlaySession {
        handle,
        catalog,
        emitter,
        submitter,
        time_slots: config.time_slots(),
        draft: None,
    };

    let result = session.run(cancel).await;
    session.handle.shutdown();
    let _ = task.await;
    result
}

// ============================================================================
// Session Loop
// ============================================================================

/// Progress through the lead form, one field per line.
#[derive(Debug, Default)]
struct LeadDraft {
    form: LeadForm,
    step: usize,
}

const LEAD_PROMPTS: [&str; 4] = [
    "Name",
    "Mobile number",
    "Preferred date (YYYY-MM-DD)",
    "Time slot (number)",
];

/// What the loop should do after a line of input.
enum Flow {
    Continue,
    Quit,
}

struct PlaySession {
    handle: RaceHandle,
    catalog: Arc<Catalog>,
    emitter: Arc<EventEmitter>,
    submitter: Option<Box<dyn LeadSubmitter>>,
    time_slots: Vec<String>,
    draft: Option<LeadDraft>,
}

/// Identifies a screen; a new key means the screen is redrawn.
type ScreenKey = (GamePhase, Option<Uuid>, usize);

impl PlaySession {
    async fn run(&mut self, cancel: CancellationToken) -> Result<(), RaceError> {
        let mut updates = self.handle.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut screen: Option<ScreenKey> = None;
        let mut shown_seconds: Option<u32> = None;

        loop {
            let snapshot = updates.borrow_and_update().clone();
            let key = (
                snapshot.phase,
                snapshot.session_id,
                snapshot.current_event_index,
            );
            if screen != Some(key) {
                screen = Some(key);
                shown_seconds = None;
                self.render(&snapshot);
            }
            if snapshot.timer_active && shown_seconds != Some(snapshot.time_left) {
                shown_seconds = Some(snapshot.time_left);
                println!("  [{}s]", snapshot.time_left);
            }

            tokio::select! {
                () = cancel.cancelled() => {
                    info!("play interrupted");
                    return Ok(());
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        return Ok(());
                    };
                    let current = self.handle.snapshot().await?;
                    if let Flow::Quit = self.on_line(line.trim(), &current).await? {
                        return Ok(());
                    }
                    // Same screen may need a fresh prompt
                    screen = None;
                }
            }
        }
    }

    async fn on_line(&mut self, line: &str, snapshot: &RaceSnapshot) -> Result<Flow, RaceError> {
        match line {
            "q" | "quit" => return Ok(Flow::Quit),
            "r" | "restart" => {
                self.draft = None;
                self.handle.apply(Input::Restart).await?;
                return Ok(Flow::Continue);
            }
            _ => {}
        }

        let input = match snapshot.phase {
            GamePhase::Intro => Some(Input::Start),
            GamePhase::StageSelection => {
                match self.parse_stage(line) {
                    Some(stage) => self.select_stage(stage).await?,
                    None => println!("Pick a stage by number or id."),
                }
                None
            }
            GamePhase::Racing => match line {
                "p" | "1" => Some(Input::Decide(Decision::Protected)),
                "e" | "2" => Some(Input::Decide(Decision::Exposed)),
                _ => {
                    println!("Type p (protected) or e (exposed).");
                    None
                }
            },
            GamePhase::EventFeedback => Some(Input::Advance),
            GamePhase::Finish => Some(Input::RevealScore),
            GamePhase::ScoreReveal => Some(Input::ViewTimeline),
            GamePhase::Timeline => Some(Input::ProceedToConversion),
            GamePhase::Conversion => Some(Input::OpenLeadForm),
            GamePhase::LeadForm => {
                self.on_lead_line(line, snapshot).await?;
                None
            }
        };

        if let Some(input) = input {
            self.handle.apply(input).await?;
        }
        Ok(Flow::Continue)
    }

    /// A stage the catalog cannot race keeps the player on stage selection.
    async fn select_stage(&self, stage: StageId) -> Result<(), RaceError> {
        match self.handle.apply(Input::SelectStage(stage)).await {
            Ok(_) => Ok(()),
            Err(e @ (EngineError::UnknownStage(_) | EngineError::EmptyQueue(_))) => {
                warn!(error = %e, "stage not playable");
                println!("There is nothing to race from there. Pick another stage.");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn parse_stage(&self, line: &str) -> Option<StageId> {
        let stages = self.catalog.stages().stages();
        if let Ok(n) = line.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| stages.get(i))
                .map(|s| s.id.clone());
        }
        stages
            .iter()
            .find(|s| s.id.as_str() == line)
            .map(|s| s.id.clone())
    }

    // ========================================================================
    // Lead Form
    // ========================================================================

    async fn on_lead_line(&mut self, line: &str, snapshot: &RaceSnapshot) -> Result<(), RaceError> {
        let draft = self.draft.get_or_insert_with(LeadDraft::default);
        match draft.step {
            0 => draft.form.name = line.to_string(),
            1 => draft.form.mobile = line.to_string(),
            2 => draft.form.preferred_date = line.to_string(),
            _ => {
                draft.form.preferred_slot = line
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| self.time_slots.get(i))
                    .cloned()
                    .unwrap_or_else(|| line.to_string());
            }
        }
        draft.step += 1;
        if draft.step < LEAD_PROMPTS.len() {
            return Ok(());
        }

        let form = self.draft.take().map(|d| d.form).unwrap_or_default();
        let today = Local::now().date_naive();
        let lead = match LeadSubmission::from_snapshot(&form, snapshot, &self.time_slots, today) {
            Ok(lead) => lead,
            Err(LeadError::Invalid { issues }) => {
                for issue in issues {
                    println!("  {}", issue.message);
                }
                println!("Let's try that again.");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let Some(submitter) = &self.submitter else {
            warn!("no lead endpoint configured");
            println!("Booking is not available right now. Type r to race again.");
            return Ok(());
        };

        match submitter.submit(&lead).await {
            Ok(_) => {
                metrics::record_lead(true);
                self.emitter.emit(GameEvent::LeadSubmitted {
                    timestamp: Utc::now(),
                    game_id: lead.game_id,
                    preferred_slot: lead.preferred_slot.clone(),
                });
                println!(
                    "Thanks {}! We'll call you on {} ({}).",
                    lead.name, lead.preferred_date, lead.preferred_slot
                );
                self.handle.apply(Input::SubmissionSucceeded).await?;
            }
            Err(e) => {
                metrics::record_lead(false);
                warn!(error = %e, "lead submission failed");
                println!("Something went wrong ({e}). Please try again.");
            }
        }
        Ok(())
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn render(&self, snapshot: &RaceSnapshot) {
        println!();
        match snapshot.phase {
            GamePhase::Intro => {
                println!("LIFE MILESTONE RACE");
                println!("Race through life's milestones. Protect yourself before the clock runs out.");
                println!("Press Enter to start, q to quit.");
            }
            GamePhase::StageSelection => {
                println!("Where are you in life?");
                for (i, stage) in self.catalog.stages().stages().iter().enumerate() {
                    println!("  {}. {} - {}", i + 1, stage.label, stage.description);
                }
            }
            GamePhase::Racing => render_event(snapshot),
            GamePhase::EventFeedback => {
                if let Some(feedback) = &snapshot.last_feedback {
                    println!(
                        "{}: {} ({:+})  Score: {}",
                        feedback.title,
                        feedback.decision.as_str(),
                        feedback.delta,
                        snapshot.score
                    );
                }
                if snapshot.is_last_event {
                    println!("That was the last one. Press Enter to cross the finish line.");
                } else {
                    println!("Press Enter for the next event.");
                }
            }
            GamePhase::Finish => {
                println!("FINISH! Press Enter to see your score.");
            }
            GamePhase::ScoreReveal => {
                println!(
                    "Life Protection Score: {}/100 ({})",
                    snapshot.final_score, snapshot.tier_label
                );
                println!("{}", share_text(snapshot.final_score, snapshot.protection_tier));
                println!("Press Enter to review your journey.");
            }
            GamePhase::Timeline => {
                for (i, record) in snapshot.timeline.iter().enumerate() {
                    let how = if record.automatic { " (time ran out)" } else { "" };
                    println!(
                        "  {:>2}. {:<14} {:<34} {:<9} {:>+4} -> {:>3}{how}",
                        i + 1,
                        record.stage_label,
                        record.title,
                        record.decision.as_str(),
                        record.score_delta,
                        record.score_after
                    );
                }
                println!("Press Enter to continue.");
            }
            GamePhase::Conversion => {
                if snapshot.risk_gaps.is_empty() {
                    println!("You stayed protected all the way. Nice.");
                } else {
                    println!("Your risk gaps:");
                    for gap in &snapshot.risk_gaps {
                        println!("  - {gap}");
                    }
                }
                println!("Press Enter to book a free consultation, or r to race again.");
            }
            GamePhase::LeadForm => self.render_lead_prompt(),
        }
    }

    fn render_lead_prompt(&self) {
        let step = self.draft.as_ref().map_or(0, |d| d.step);
        if step == 0 {
            println!("Book a consultation (r to cancel).");
        }
        if step == LEAD_PROMPTS.len() - 1 {
            for (i, slot) in self.time_slots.iter().enumerate() {
                println!("  {}. {slot}", i + 1);
            }
        }
        if let Some(prompt) = LEAD_PROMPTS.get(step) {
            println!("{prompt}:");
        }
    }
}

fn render_event(snapshot: &RaceSnapshot) {
    let Some(event) = &snapshot.current_event else {
        return;
    };
    println!(
        "Event {}/{}  Score: {}  Progress: {}%",
        snapshot.current_event_index + 1,
        snapshot.queue_length,
        snapshot.score,
        snapshot.progress_percent
    );
    println!("[{}] {}", event.severity.display_label(), event.title);
    if !event.description.is_empty() {
        println!("{}", event.description);
    }
    println!(
        "  p) Protected ({:+})   e) Exposed ({:+})",
        event.impact_protected, event.impact_exposed
    );
}
