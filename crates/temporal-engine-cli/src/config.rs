use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use temporal_engine::{DefaultTimePolicy, DEFAULT_MAX_OCCURRENCES};
use tracing::debug;

/// CLI configuration loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// IANA timezone used when `--timezone` / `TEMPO_TIMEZONE` is not set
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Time-of-day policy for `instant` when `--policy` is not set
    #[serde(default)]
    pub default_time_policy: DefaultTimePolicy,

    /// Cap on materialized recurrence occurrences
    #[serde(default = "default_max_occurrences")]
    pub max_occurrences: u16,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_max_occurrences() -> u16 {
    DEFAULT_MAX_OCCURRENCES
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            default_time_policy: DefaultTimePolicy::default(),
            max_occurrences: default_max_occurrences(),
        }
    }
}

impl CliConfig {
    /// Load config from `path`, or the built-in defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No config file given, using defaults");
            return Ok(Self::default());
        };

        debug!(config_path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Timezone precedence: flag or environment, then this file.
    pub fn resolve_timezone(&self, cli_override: Option<&str>) -> String {
        cli_override
            .map(str::to_string)
            .unwrap_or_else(|| self.timezone.clone())
    }
}
