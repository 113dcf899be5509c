//! CLI argument definitions
//!
//! All Clap derive structs for `milestone-race` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Timed life-stage risk decision game.
#[derive(Parser, Debug)]
#[command(name = "milestone-race", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "MILESTONE_RACE_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "MILESTONE_RACE_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play the race interactively in the terminal.
    Play(PlayArgs),

    /// Run a race with a fixed decision strategy and print the report.
    Simulate(SimulateArgs),

    /// List stages and events.
    Catalog(CatalogArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version and build information.
    Version(VersionArgs),
}

// ============================================================================
// Play / Simulate
// ============================================================================

/// Arguments for `play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "MILESTONE_RACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for event shuffling.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Seconds per event (overrides the configuration file).
    #[arg(long)]
    pub timer_seconds: Option<u32>,

    /// Write game events as JSONL to this file.
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Expose Prometheus metrics on this port.
    #[arg(long)]
    pub metrics_port: Option<u16>,

    /// Base URL leads are posted to (overrides the configuration file).
    #[arg(long, env = "MILESTONE_RACE_LEAD_ENDPOINT")]
    pub lead_endpoint: Option<String>,
}

/// Arguments for `simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Stage to start from.
    #[arg(short, long)]
    pub stage: String,

    /// How each event is decided.
    #[arg(long, default_value = "alternate")]
    pub strategy: Strategy,

    /// Seed for event shuffling and the random strategy.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Path to YAML configuration file.
    #[arg(short, long, env = "MILESTONE_RACE_CONFIG")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Catalog / Validate
// ============================================================================

/// Arguments for `catalog`.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Path to YAML configuration file.
    #[arg(short, long, env = "MILESTONE_RACE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Decision strategy for `simulate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Protect against every event.
    Protected,
    /// Stay exposed to every event.
    Exposed,
    /// Protected, exposed, protected, ...
    #[default]
    Alternate,
    /// Coin flip per event.
    Random,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
