//! Configuration data structures.

use serde::{Deserialize, Serialize};

use super::extractor_kind::ExtractorKind;
use crate::errors::{LitgraphError, Result};

/// Main configuration structure for litgraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Glob patterns for source documents, relative to the project root.
    #[serde(default = "default_source_patterns")]
    pub source_patterns: Vec<String>,

    /// Number of extraction results to keep; 0 disables the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// How documents are turned into blocks.
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Watch configuration.
    #[serde(default)]
    pub watch: WatchConfig,
}

fn default_source_patterns() -> Vec<String> {
    vec![
        "**/*.md".to_string(),
        "**/*.qmd".to_string(),
        "**/*.Rmd".to_string(),
    ]
}

fn default_cache_capacity() -> usize {
    32
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_patterns: default_source_patterns(),
            cache_capacity: default_cache_capacity(),
            extractor: ExtractorConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all source patterns.
    pub fn source_patterns(&self) -> &[String] {
        &self.source_patterns
    }

    /// Checks settings that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.source_patterns.is_empty() {
            return Err(LitgraphError::Config(
                "source_patterns must not be empty".to_string(),
            ));
        }
        if self.extractor.kind == ExtractorKind::Command && self.extractor.program.is_empty() {
            return Err(LitgraphError::Config(
                "extractor.program is required when extractor.kind = \"command\"".to_string(),
            ));
        }
        if self.extractor.timeout_ms == 0 {
            return Err(LitgraphError::Config(
                "extractor.timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Extractor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub kind: ExtractorKind,

    /// Converter executable, for `kind = "command"`.
    #[serde(default)]
    pub program: String,

    /// Arguments passed to the converter.
    #[serde(default)]
    pub args: Vec<String>,

    /// How long the converter may run, in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_timeout() -> u64 {
    10_000
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            kind: ExtractorKind::default(),
            program: String::new(),
            args: Vec::new(),
            timeout_ms: default_timeout(),
        }
    }
}

/// Watch mode configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds.
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Patterns to exclude from watching.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_debounce() -> u64 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            exclude: Vec::new(),
        }
    }
}
