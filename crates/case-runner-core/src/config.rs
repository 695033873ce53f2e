//! Configuration loader for case-runner.

use crate::group::GroupingOptions;
use crate::language::{LanguageRuntime, Toolchains};
use crate::types::IncompletePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "case-runner.config.yaml";

/// Errors that can occur during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),
    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
    #[error("arity must be at least 1")]
    ZeroArity,
    #[error("language '{language}' has an empty {step} command")]
    EmptyCommand {
        language: String,
        step: &'static str,
    },
}

/// Configuration from `case-runner.config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct CaseRunnerConfig {
    /// Per-case run deadline in milliseconds (default: 2000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Compile step limit in milliseconds (default: 30000).
    #[serde(default = "default_compile_timeout_ms")]
    pub compile_timeout_ms: u64,

    /// Directory test cases are written to and read from (default: testcases).
    #[serde(default = "default_testcases_dir")]
    pub testcases_dir: PathBuf,

    /// Fixed arity; detected from the first example when unset.
    #[serde(default)]
    pub arity: Option<usize>,

    /// Policy for trailing fragments that do not fill a group (default: drop).
    #[serde(default)]
    pub on_incomplete: IncompletePolicy,

    /// Extra or replacement toolchain recipes keyed by language tag.
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageRuntime>,
}

const fn default_timeout_ms() -> u64 {
    2_000
}

const fn default_compile_timeout_ms() -> u64 {
    30_000
}

fn default_testcases_dir() -> PathBuf {
    PathBuf::from("testcases")
}

impl Default for CaseRunnerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            compile_timeout_ms: default_compile_timeout_ms(),
            testcases_dir: default_testcases_dir(),
            arity: None,
            on_incomplete: IncompletePolicy::default(),
            languages: BTreeMap::new(),
        }
    }
}

impl CaseRunnerConfig {
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub const fn compile_timeout(&self) -> Duration {
        Duration::from_millis(self.compile_timeout_ms)
    }

    #[must_use]
    pub const fn grouping_options(&self) -> GroupingOptions {
        GroupingOptions {
            arity: self.arity,
            on_incomplete: self.on_incomplete,
        }
    }

    /// Built-in recipes with configured ones layered on top.
    #[must_use]
    pub fn toolchains(&self) -> Toolchains {
        Toolchains::builtin().with_overrides(&self.languages)
    }
}

/// Load configuration from a YAML file.
///
/// If the file doesn't exist, returns default configuration.
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The YAML is invalid
/// - Validation fails
pub fn load_config(path: &Path) -> Result<CaseRunnerConfig, ConfigError> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        // An empty file parses as YAML null.
        if content.trim().is_empty() {
            CaseRunnerConfig::default()
        } else {
            serde_yml::from_str(&content)?
        }
    } else {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        CaseRunnerConfig::default()
    };

    validate_config(&config)?;
    Ok(config)
}

/// Validate the configuration.
///
/// # Errors
/// Returns an error for zero timeouts, a zero arity or an empty command.
pub fn validate_config(config: &CaseRunnerConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::ZeroTimeout {
            field: "timeout-ms",
        });
    }
    if config.compile_timeout_ms == 0 {
        return Err(ConfigError::ZeroTimeout {
            field: "compile-timeout-ms",
        });
    }
    if config.arity == Some(0) {
        return Err(ConfigError::ZeroArity);
    }
    for (language, runtime) in &config.languages {
        if runtime.run.is_empty() {
            return Err(ConfigError::EmptyCommand {
                language: language.clone(),
                step: "run",
            });
        }
        if runtime.compile.as_ref().is_some_and(|c| c.is_empty()) {
            return Err(ConfigError::EmptyCommand {
                language: language.clone(),
                step: "compile",
            });
        }
    }
    Ok(())
}

/// CLI override options for configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub timeout_ms: Option<u64>,
    pub compile_timeout_ms: Option<u64>,
    pub testcases_dir: Option<PathBuf>,
    pub arity: Option<usize>,
    pub on_incomplete: Option<IncompletePolicy>,
}

/// Apply CLI overrides to a configuration.
///
/// # Errors
/// Returns an error if the result fails validation.
pub fn apply_overrides(
    mut config: CaseRunnerConfig,
    overrides: &ConfigOverrides,
) -> Result<CaseRunnerConfig, ConfigError> {
    if let Some(timeout_ms) = overrides.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(compile_timeout_ms) = overrides.compile_timeout_ms {
        config.compile_timeout_ms = compile_timeout_ms;
    }
    if let Some(ref dir) = overrides.testcases_dir {
        config.testcases_dir.clone_from(dir);
    }
    if let Some(arity) = overrides.arity {
        config.arity = Some(arity);
    }
    if let Some(policy) = overrides.on_incomplete {
        config.on_incomplete = policy;
    }
    validate_config(&config)?;
    Ok(config)
}
