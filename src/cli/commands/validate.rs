//! `validate` command: checks configuration files without playing.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, RaceError};

/// Outcome for one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// File that was checked
    pub path: PathBuf,
    /// Whether the file passed
    pub valid: bool,
    /// Problems that fail the file
    pub errors: Vec<String>,
    /// Problems reported but tolerated (unless `--strict`)
    pub warnings: Vec<String>,
}

/// Checks one file. With `strict`, any warning fails the file.
#[must_use]
pub fn check_file(loader: &ConfigLoader, path: &Path, strict: bool) -> FileReport {
    tracing::info!(file = %path.display(), "validating configuration");

    let (errors, warnings) = match loader.load(path) {
        Ok(result) => (
            Vec::new(),
            result.warnings.iter().map(ToString::to_string).collect(),
        ),
        Err(ConfigError::ValidationError { errors, .. }) => (
            errors.iter().map(ToString::to_string).collect(),
            Vec::new(),
        ),
        Err(e) => (vec![e.to_string()], Vec::new()),
    };

    let valid = errors.is_empty() && !(strict && !warnings.is_empty());
    FileReport {
        path: path.to_path_buf(),
        valid,
        errors,
        warnings,
    }
}

/// Validate every file and report.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationFailed`] if any file fails.
pub fn run(args: &ValidateArgs) -> Result<(), RaceError> {
    let loader = ConfigLoader::new();
    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check_file(&loader, path, args.strict))
        .collect();
    let failed = reports.iter().filter(|r| !r.valid).count();

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                let mark = if report.valid { "ok" } else { "FAILED" };
                println!("{}: {mark}", report.path.display());
                for error in &report.errors {
                    println!("  {error}");
                }
                for warning in &report.warnings {
                    println!("  {warning}");
                }
            }
        }
        OutputFormat::Json => {
            let body = serde_json::json!({
                "files": reports,
                "summary": {
                    "total": reports.len(),
                    "passed": reports.len() - failed,
                    "failed": failed,
                },
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    if failed > 0 {
        return Err(ConfigError::ValidationFailed { count: failed }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const WARNING_ONLY: &str = "\
catalog:
  stages:
    - { id: a, label: A, order: 1 }
    - { id: b, label: B, order: 2 }
  events:
    - { id: a-1, stage: a, title: Flood, severity: high }
";

    #[test]
    fn valid_file_passes() {
        let file = write_yaml("timer:\n  event_seconds: 10\n");
        let report = check_file(&ConfigLoader::new(), file.path(), false);
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn invalid_file_lists_each_issue() {
        let file = write_yaml(
            "timer:\n  event_seconds: 0\nlead:\n  endpoint: ftp://crm\n",
        );
        let report = check_file(&ConfigLoader::new(), file.path(), false);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2, "{:?}", report.errors);
    }

    #[test]
    fn warnings_fail_only_in_strict_mode() {
        let file = write_yaml(WARNING_ONLY);
        let loader = ConfigLoader::new();

        let lenient = check_file(&loader, file.path(), false);
        assert!(lenient.valid);
        assert_eq!(lenient.warnings.len(), 1);

        let strict = check_file(&loader, file.path(), true);
        assert!(!strict.valid);
    }

    #[test]
    fn missing_file_is_reported() {
        let report = check_file(
            &ConfigLoader::new(),
            Path::new("/nonexistent/milestone-race.yaml"),
            false,
        );
        assert!(!report.valid);
        assert!(report.errors[0].contains("file not found"));
    }
}
