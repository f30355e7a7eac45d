//! CLI configuration file
//!
//! ```json
//! { "schema_dir": "./protocols", "log_level": "info" }
//! ```
//!
//! Both keys are optional. Without a config file the built-in protocols are
//! served and logging stays at INFO.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, set_min_severity, Event, Severity};

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory of extra protocol declarations (optional)
    #[serde(default)]
    pub schema_dir: Option<String>,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads `path` when given, the defaults otherwise, and applies the
    /// log level to the process.
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        set_min_severity(config.severity()?);

        let source = path.map_or_else(|| "<defaults>".to_string(), |p| p.display().to_string());
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("log_level", config.log_level.as_str()), ("source", source.as_str())],
        );
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        let severity = self.severity()?;
        if severity == Severity::Fatal {
            return Err(CliError::config_error(
                "Invalid log_level: 'fatal'. Must be 'trace', 'info', 'warn' or 'error'.",
            ));
        }

        if let Some(dir) = &self.schema_dir {
            if dir.trim().is_empty() {
                return Err(CliError::config_error("schema_dir must not be empty"));
            }
        }

        Ok(())
    }

    /// Parsed log level
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    /// Schema directory as Path
    pub fn schema_path(&self) -> Option<&Path> {
        self.schema_dir.as_deref().map(Path::new)
    }
}
