//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod catalog;
pub mod completions;
pub mod play;
pub mod simulate;
pub mod validate;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::config::{ConfigLoader, RaceConfig};
use crate::error::RaceError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), RaceError> {
    match cli.command {
        Commands::Play(args) => play::run(&args, cancel).await,
        Commands::Simulate(args) => simulate::run(&args),
        Commands::Catalog(args) => catalog::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads the configuration at `path`, or the defaults when no path is given.
///
/// Load warnings are logged, not returned.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Arc<RaceConfig>, RaceError> {
    let Some(path) = path else {
        return Ok(Arc::new(RaceConfig::default()));
    };

    tracing::info!(config = %path.display(), "loading configuration");
    let load_result = ConfigLoader::new().load(path)?;

    for warning in &load_result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }

    Ok(load_result.config)
}
