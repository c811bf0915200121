use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;

/// Default ceiling for nested function decomposition.
pub const DEFAULT_RECURSION_DEPTH_LIMIT: usize = 3;

/// What happens to a route's decomposition when one branch exceeds the depth ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchFailurePolicy {
    /// Discard the whole route decomposition and return the error.
    #[default]
    AbortRoute,
    /// Drop only the offending branch and keep sibling work.
    PruneBranch,
}

/// Layout settings applied by the normalizer and the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    /// Maximum line length before consolidated imports are wrapped.
    pub line_length: usize,
    /// Spaces per indentation level.
    pub indent_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            line_length: 88,
            indent_width: 4,
        }
    }
}

/// Settings for one synthesis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub recursion_depth_limit: usize,
    pub branch_failure_policy: BranchFailurePolicy,
    pub style: StyleOptions,
    /// Run the normalizer over assembled code.
    pub normalize: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            recursion_depth_limit: DEFAULT_RECURSION_DEPTH_LIMIT,
            branch_failure_policy: BranchFailurePolicy::default(),
            style: StyleOptions::default(),
            normalize: true,
        }
    }
}

impl SynthesisConfig {
    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies `RECURSION_DEPTH_LIMIT` and `KUMITATE_LINE_LENGTH` when they are set.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable source.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(limit) = parse_var(&lookup, "RECURSION_DEPTH_LIMIT")? {
            self.recursion_depth_limit = limit;
        }
        if let Some(width) = parse_var(&lookup, "KUMITATE_LINE_LENGTH")? {
            self.style.line_length = width;
        }
        Ok(self)
    }
}

fn parse_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<usize>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
    }
}
