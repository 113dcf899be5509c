//! `catalog` command: lists stages and their events.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{Catalog, Event, Stage};
use crate::cli::args::{CatalogArgs, OutputFormat};
use crate::error::RaceError;

use super::load_config;

/// One stage with its events, as printed by `catalog --format json`.
#[derive(Debug, Serialize)]
pub struct StageListing<'a> {
    /// The stage
    #[serde(flatten)]
    pub stage: &'a Stage,
    /// Events belonging to the stage, in catalog order
    pub events: Vec<&'a Event>,
}

/// Groups the catalog's events under their stages, in stage order.
#[must_use]
pub fn listing(catalog: &Catalog) -> Vec<StageListing<'_>> {
    catalog
        .stages()
        .stages()
        .iter()
        .map(|stage| StageListing {
            stage,
            events: catalog.events_for(&stage.id).map(Arc::as_ref).collect(),
        })
        .collect()
}

/// Print the catalog.
///
/// # Errors
///
/// Returns a config error if `--config` cannot be loaded.
pub fn run(args: &CatalogArgs) -> Result<(), RaceError> {
    let config = load_config(args.config.as_deref())?;
    let catalog = config.build_catalog();
    let stages = listing(&catalog);

    match args.format {
        OutputFormat::Human => print_human(&stages),
        OutputFormat::Json => {
            let body = serde_json::json!({ "stages": stages });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }
    Ok(())
}

fn print_human(stages: &[StageListing<'_>]) {
    for listing in stages {
        let stage = listing.stage;
        println!("{}. {} ({})", stage.order, stage.label, stage.id);
        if !stage.description.is_empty() {
            println!("   {}", stage.description);
        }
        for event in &listing.events {
            println!(
                "   {:<6} {:<12} {:<34} {:+4} / {:+4}",
                event.id,
                event.severity.display_label(),
                event.title,
                event.impact_protected,
                event.impact_exposed
            );
        }
        println!();
    }
}
