mod common;

use std::io::Write;

use milestone_race::catalog::Severity;
use milestone_race::config::ConfigLoader;
use milestone_race::error::ConfigError;

use common::fixture_path;

fn loader() -> ConfigLoader {
    ConfigLoader::with_env_lookup(|name| match name {
        "MILESTONE_RACE_TEST_CRM" => Some("https://crm.example.com/api".to_string()),
        _ => None,
    })
}

#[test]
fn valid_fixture_loads() {
    let result = loader().load(&fixture_path("valid_race.yaml")).unwrap();
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let config = &result.config;
    assert_eq!(config.timer.event_seconds, 8);
    assert_eq!(config.lead_endpoint(), Some("https://crm.example.com/api"));
    assert_eq!(config.time_slots(), ["Morning", "Evening"]);

    let catalog = config.build_catalog();
    assert_eq!(catalog.stages().len(), 2);
    let accident = catalog.event("gr-01").unwrap();
    assert_eq!(accident.severity, Severity::High);
    assert_eq!(accident.impact_exposed, -20);
}

#[test]
fn env_default_applies_when_unset() {
    let result = ConfigLoader::with_env_lookup(|_| None)
        .load(&fixture_path("valid_race.yaml"))
        .unwrap();
    assert_eq!(result.config.lead_endpoint(), Some("http://127.0.0.1:9/api"));
}

#[test]
fn invalid_fixture_reports_every_issue() {
    let err = loader()
        .load(&fixture_path("invalid_race.yaml"))
        .unwrap_err();
    let ConfigError::ValidationError { errors, .. } = err else {
        panic!("expected validation error, got {err:?}");
    };
    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["timer.event_seconds", "catalog.events[0].stage"]);
}

#[test]
fn warnings_are_returned_with_config() {
    let result = loader().load(&fixture_path("warnings_race.yaml")).unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.warnings[0].location.as_deref(),
        Some("catalog.stages[1]")
    );
    assert!(result.warnings[0].message.contains("graduate"));
}

#[test]
fn malformed_yaml_reports_line() {
    let err = loader().load(&fixture_path("malformed.yaml")).unwrap_err();
    let ConfigError::ParseError { line, .. } = err else {
        panic!("expected parse error, got {err:?}");
    };
    assert!(line.is_some());
}

#[test]
fn required_variable_must_be_set() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "lead:\n  endpoint: ${{CRM_BASE_URL:?CRM base URL}}").unwrap();

    let err = loader().load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::EnvVarNotSet { ref var, .. } if var == "CRM_BASE_URL"));
}

#[test]
fn oversized_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let padding = "#".repeat(1024);
    for _ in 0..1100 {
        writeln!(file, "{padding}").unwrap();
    }
    let err = loader().load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "file_size"));
}
