//! `simulate` command: plays a whole race with a fixed strategy.
//!
//! Drives the engine synchronously; the countdown never runs, so every
//! event is resolved manually.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::{Catalog, Decision, StageId};
use crate::cli::args::{OutputFormat, SimulateArgs, Strategy};
use crate::engine::{DecisionRecord, GamePhase, RaceEngine, RandomShuffler, Session};
use crate::error::{EngineError, RaceError};
use crate::score::{ProtectionTier, share_text};

use super::load_config;

/// Result of a simulated race.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    /// Session the race ran under
    pub session_id: Option<Uuid>,
    /// Starting stage id
    pub stage: StageId,
    /// Strategy name
    pub strategy: &'static str,
    /// Number of events resolved
    pub events_played: usize,
    /// Rounded, clamped final score
    pub final_score: i32,
    /// Tier for the final score
    pub protection_tier: ProtectionTier,
    /// Tier display label
    pub tier_label: &'static str,
    /// One line per exposed decision
    pub risk_gaps: Vec<String>,
    /// Every resolved decision
    pub timeline: Vec<DecisionRecord>,
    /// Shareable summary line
    pub share_text: String,
}

const fn strategy_name(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::Protected => "protected",
        Strategy::Exposed => "exposed",
        Strategy::Alternate => "alternate",
        Strategy::Random => "random",
    }
}

fn choose(strategy: Strategy, index: usize, rng: &mut StdRng) -> Decision {
    let protect = match strategy {
        Strategy::Protected => true,
        Strategy::Exposed => false,
        Strategy::Alternate => index % 2 == 0,
        Strategy::Random => rng.random_bool(0.5),
    };
    if protect {
        Decision::Protected
    } else {
        Decision::Exposed
    }
}

/// Plays one race from `stage` to the finish line.
///
/// # Errors
///
/// Returns an engine error if the stage is unknown or has no events.
pub fn simulate(
    catalog: Arc<Catalog>,
    stage: &StageId,
    strategy: Strategy,
    seed: Option<u64>,
) -> Result<SimulationReport, EngineError> {
    let (shuffler, mut rng) = match seed {
        Some(seed) => (RandomShuffler::seeded(seed), StdRng::seed_from_u64(seed)),
        None => (RandomShuffler::from_os_rng(), StdRng::from_os_rng()),
    };

    let mut engine = RaceEngine::new(catalog, crate::timer::DEFAULT_EVENT_SECONDS)
        .with_shuffler(shuffler);
    engine.start();
    engine.select_stage(stage)?;

    let mut index = 0;
    while engine.phase() == GamePhase::Racing {
        if engine.decide(choose(strategy, index, &mut rng)).is_none() {
            break;
        }
        engine.advance();
        index += 1;
    }
    tracing::debug!(phase = %engine.phase(), events = index, "simulation finished");

    let final_score = engine.final_score();
    let tier = engine.tier();
    Ok(SimulationReport {
        session_id: engine.session().map(Session::id),
        stage: stage.clone(),
        strategy: strategy_name(strategy),
        events_played: engine.timeline().len(),
        final_score,
        protection_tier: tier,
        tier_label: tier.label(),
        risk_gaps: engine.risk_gaps(),
        timeline: engine.timeline().to_vec(),
        share_text: share_text(final_score, tier),
    })
}

/// Run `simulate` and print the report.
///
/// # Errors
///
/// Returns a config error if `--config` cannot be loaded, or an engine
/// error for an unknown stage.
pub fn run(args: &SimulateArgs) -> Result<(), RaceError> {
    let config = load_config(args.config.as_deref())?;
    let catalog = Arc::new(config.build_catalog());
    let report = simulate(
        catalog,
        &StageId::new(args.stage.trim()),
        args.strategy,
        args.seed,
    )?;

    match args.format {
        OutputFormat::Human => print_human(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn print_human(report: &SimulationReport) {
    println!("Stage:     {}", report.stage);
    println!("Strategy:  {}", report.strategy);
    println!("Events:    {}", report.events_played);
    println!();
    println!(
        "{:>3}  {:<14} {:<34} {:<10} {:>5} {:>5}",
        "#", "Stage", "Event", "Decision", "Delta", "Score"
    );
    for (i, record) in report.timeline.iter().enumerate() {
        println!(
            "{:>3}  {:<14} {:<34} {:<10} {:>+5} {:>5}",
            i + 1,
            record.stage_label,
            record.title,
            record.decision.as_str(),
            record.score_delta,
            record.score_after
        );
    }
    println!();
    println!("Final score: {}/100 ({})", report.final_score, report.tier_label);
    if report.risk_gaps.is_empty() {
        println!("No risk gaps.");
    } else {
        println!("Risk gaps:");
        for gap in &report.risk_gaps {
            println!("  - {gap}");
        }
    }
    println!();
    println!("{}", report.share_text);
}
