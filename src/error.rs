//! Error types for `milestone-race`
//!
//! One error enum per domain (configuration, engine, lead capture), all
//! aggregated into [`RaceError`] which maps onto process exit codes.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `milestone-race` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Engine error (unknown stage, empty event queue)
    pub const ENGINE_ERROR: i32 = 5;

    /// Lead submission error (invalid form, endpoint rejected the lead)
    pub const LEAD_ERROR: i32 = 6;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `milestone-race` operations.
#[derive(Debug, Error)]
pub enum RaceError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Race engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Lead capture or submission error
    #[error(transparent)]
    Lead(#[from] LeadError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RaceError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) => ExitCode::CONFIG_ERROR,
            Self::Engine(_) => ExitCode::ENGINE_ERROR,
            Self::Lead(_) => ExitCode::LEAD_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}{}: {message}", line.map_or_else(String::new, |l| format!(" (line {l})")))]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", format_issues(errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },

    /// One or more configuration files failed validation.
    #[error("{count} file(s) failed validation")]
    ValidationFailed {
        /// Number of files that failed validation.
        count: usize,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found while checking a configuration or form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "catalog.events[2].stage")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Level of the issue
    pub level: IssueLevel,
}

impl ValidationIssue {
    /// Creates an error-level issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            level: IssueLevel::Error,
        }
    }

    /// Creates a warning-level issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            level: IssueLevel::Warning,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            IssueLevel::Error => "error",
            IssueLevel::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Validation failure that prevents the value from being used
    Error,
    /// Potential issue that does not prevent loading
    Warning,
}

// ============================================================================
// Engine Errors
// ============================================================================

/// Race engine errors.
///
/// Mistimed triggers are never errors; these variants only cover
/// data-integrity problems such as asking for a stage the registry
/// does not know.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Stage id is not present in the stage registry
    #[error("unknown stage: {0}")]
    UnknownStage(String),

    /// The selected stage range contains no events
    #[error("no events found from stage '{0}' onward")]
    EmptyQueue(String),

    /// The runtime task owning the engine has stopped
    #[error("race runtime has stopped")]
    RuntimeStopped,
}

// ============================================================================
// Lead Errors
// ============================================================================

/// Lead capture and submission errors.
///
/// None of these affect session state; the caller may retry.
#[derive(Debug, Error)]
pub enum LeadError {
    /// The lead form failed validation
    #[error("invalid lead form: {}", format_issues(issues))]
    Invalid {
        /// Every field problem found
        issues: Vec<ValidationIssue>,
    },

    /// The endpoint answered with a non-success status
    #[error("lead submission failed: {status}")]
    Rejected {
        /// HTTP status code returned by the endpoint
        status: u16,
    },

    /// The request could not be delivered
    #[error("lead transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// No lead endpoint configured
    #[error("no lead endpoint configured")]
    MissingEndpoint,

    /// Submission attempted outside the lead form phase
    #[error("lead form is not open (current phase: {0})")]
    NotReady(String),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `milestone-race` operations.
pub type Result<T> = std::result::Result<T, RaceError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::ENGINE_ERROR, 5);
        assert_eq!(ExitCode::LEAD_ERROR, 6);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
        assert_eq!(ExitCode::INTERRUPTED, 130);
        assert_eq!(ExitCode::TERMINATED, 143);
    }

    #[test]
    fn test_engine_error_exit_code() {
        let err: RaceError = EngineError::UnknownStage("moon-landing".to_string()).into();
        assert_eq!(err.exit_code(), ExitCode::ENGINE_ERROR);
        assert!(err.to_string().contains("moon-landing"));
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: RaceError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_lead_error_exit_code() {
        let err: RaceError = LeadError::Rejected { status: 503 }.into();
        assert_eq!(err.exit_code(), ExitCode::LEAD_ERROR);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: RaceError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_usage_error_exit_code() {
        let err = RaceError::Usage("missing --stage".to_string());
        assert_eq!(err.exit_code(), ExitCode::USAGE_ERROR);
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue::error("catalog.stages[0].id", "stage id is empty");
        assert_eq!(
            issue.to_string(),
            "error: stage id is empty at catalog.stages[0].id"
        );
    }

    #[test]
    fn test_validation_issue_warning_display() {
        let issue = ValidationIssue::warning("catalog.stages[4]", "stage has no events");
        assert_eq!(
            issue.to_string(),
            "warning: stage has no events at catalog.stages[4]"
        );
    }

    #[test]
    fn test_config_error_display_with_line() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("race.yaml"),
            line: Some(12),
            message: "unexpected token".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("race.yaml"));
        assert!(text.contains("line 12"));
        assert!(text.contains("unexpected token"));
    }

    #[test]
    fn test_invalid_lead_lists_issues() {
        let err = LeadError::Invalid {
            issues: vec![
                ValidationIssue::error("name", "Name is required"),
                ValidationIssue::error("mobile", "Enter a valid 10-digit mobile number"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("Name is required"));
        assert!(text.contains("mobile"));
    }
}
