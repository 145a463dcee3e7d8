//! Configuration surface consumed by the rule registry.
//!
//! The engine consumes configuration; it does not own discovery or merging
//! policy beyond locating a single YAML file. Per-rule settings are
//! `enabled`, `severity`, and free-form `params` a matcher may read.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rules::{RuleParams, Severity};

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["styleguard.yaml", ".styleguard.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Per-rule overrides keyed by rule id. Unknown ids are rejected at
    /// resolve time, not silently ignored.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
    /// Per-unit deadline in milliseconds; unset means no deadline.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Look for a configuration file in the given directory.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
    }
}

/// Per-rule configuration overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleConfig {
    /// Defaults to enabled when omitted.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Overrides the rule's default severity.
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub params: RuleParams,
}

impl RuleConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}
