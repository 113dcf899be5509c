//! Configuration loader
//!
//! Loading pipeline:
//! 1. Environment variable expansion (pre-parse, on raw text)
//! 2. YAML parsing
//! 3. Deserialization to [`RaceConfig`]
//! 4. Validation
//! 5. Freeze with `Arc`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::schema::RaceConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

/// Environment variable naming the default configuration file.
pub const CONFIG_ENV: &str = "MILESTONE_RACE_CONFIG";

/// Largest configuration file accepted.
pub const MAX_CONFIG_SIZE: usize = 1024 * 1024;

// ============================================================================
// Public API
// ============================================================================

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<RaceConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} (at {location})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Configuration loader.
pub struct ConfigLoader {
    lookup: EnvLookup,
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader").finish_non_exhaustive()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader that reads the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_env_lookup(|name| std::env::var(name).ok())
    }

    /// Creates a loader with a custom environment lookup.
    #[must_use]
    pub fn with_env_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Loads, validates, and freezes a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is too large, fails
    /// to parse, references a required but unset variable, or fails
    /// validation.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > MAX_CONFIG_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {MAX_CONFIG_SIZE} bytes"),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        self.load_str(&raw, path)
    }

    /// Runs the pipeline on already-read text. `path` is used for messages.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_str(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();

        // Handle UTF-8 BOM
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new(&self.lookup);
        let substituted = env_sub.substitute(raw, path)?;
        warnings.extend(env_sub.warnings);

        // An empty file means "all defaults"
        let config: RaceConfig = if substituted.trim().is_empty() {
            RaceConfig::default()
        } else {
            serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }

        for issue in result.warnings {
            warnings.push(LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            });
        }

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw YAML text before parsing so substituted values keep YAML
/// type inference.
struct EnvSubstitution<'a> {
    lookup: &'a EnvLookup,
    warnings: Vec<LoadWarning>,
}

impl<'a> EnvSubstitution<'a> {
    const fn new(lookup: &'a EnvLookup) -> Self {
        Self {
            lookup,
            warnings: Vec::new(),
        }
    }

    /// Substitutes environment variables in raw YAML text.
    ///
    /// Supports:
    /// - `${VAR}` - expand to value (empty string if unset, with warning)
    /// - `${VAR:-default}` - expand to default if unset
    /// - `${VAR:?message}` - fail if unset
    /// - `$$` - literal `$`
    fn substitute(&mut self, raw_yaml: &str, source_path: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw_yaml.len());
        let mut chars = raw_yaml.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let spec = parse_var_spec(&mut chars, source_path)?;
                    match (self.lookup)(&spec.name) {
                        Some(value) => result.push_str(&value),
                        None => match spec.fallback {
                            Fallback::Default(default) => result.push_str(&default),
                            Fallback::Required(message) => {
                                return Err(ConfigError::EnvVarNotSet {
                                    var: spec.name,
                                    location: message,
                                });
                            }
                            Fallback::Empty => self.warnings.push(LoadWarning {
                                message: format!(
                                    "Environment variable '{}' is not set, using empty string",
                                    spec.name
                                ),
                                location: Some(source_path.display().to_string()),
                            }),
                        },
                    }
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }
}

enum Fallback {
    Empty,
    Default(String),
    Required(String),
}

struct VarSpec {
    name: String,
    fallback: Fallback,
}

/// Parses the inside of `${...}`; the opening brace is already consumed.
fn parse_var_spec(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    source_path: &Path,
) -> Result<VarSpec, ConfigError> {
    let mut name = String::new();

    while let Some(c) = chars.next() {
        match c {
            '}' => {
                return Ok(VarSpec {
                    name,
                    fallback: Fallback::Empty,
                });
            }
            ':' => match chars.peek() {
                Some('-') => {
                    chars.next();
                    let default = read_until_close(chars, source_path)?;
                    return Ok(VarSpec {
                        name,
                        fallback: Fallback::Default(default),
                    });
                }
                Some('?') => {
                    chars.next();
                    let message = read_until_close(chars, source_path)?;
                    return Ok(VarSpec {
                        name,
                        fallback: Fallback::Required(message),
                    });
                }
                _ => name.push(':'),
            },
            _ => name.push(c),
        }
    }

    Err(unclosed(source_path, &name))
}

/// Reads up to the matching `}`, allowing nested braces.
fn read_until_close(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    source_path: &Path,
) -> Result<String, ConfigError> {
    let mut value = String::new();
    let mut depth = 1;

    for c in chars.by_ref() {
        match c {
            '{' => {
                depth += 1;
                value.push(c);
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(value);
                }
                value.push(c);
            }
            _ => value.push(c),
        }
    }

    Err(unclosed(source_path, &value))
}

fn unclosed(source_path: &Path, fragment: &str) -> ConfigError {
    ConfigError::ParseError {
        path: PathBuf::from(source_path),
        line: None,
        message: format!("Unclosed environment variable reference: ${{{fragment}"),
    }
}

// ============================================================================
// Tests
// ============================================================================
