//! Configuration update and merging.

use serde::{Deserialize, Serialize};

use super::config_data::{Config, ExtractorConfig, WatchConfig};
use super::extractor_kind::ExtractorKind;

/// Partial configuration update that can be merged into a Config.
///
/// All fields are optional. Only specified fields will override the base config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub source_patterns: Option<Vec<String>>,

    #[serde(default)]
    pub extractor: Option<ExtractorUpdate>,

    #[serde(default)]
    pub cache_capacity: Option<usize>,

    #[serde(default)]
    pub watch: Option<WatchUpdate>,
}

/// Partial `[extractor]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorUpdate {
    #[serde(default)]
    pub kind: Option<ExtractorKind>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Partial `[watch]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchUpdate {
    #[serde(default)]
    pub debounce_ms: Option<u64>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

impl ConfigUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges this update into a base configuration, returning a new Config.
    ///
    /// Consumes `self` so fields can be moved instead of cloned.
    pub fn merge_into(self, base: &Config) -> Config {
        Config {
            source_patterns: self
                .source_patterns
                .unwrap_or_else(|| base.source_patterns.clone()),
            extractor: merge_extractor(&base.extractor, self.extractor),
            cache_capacity: self.cache_capacity.unwrap_or(base.cache_capacity),
            watch: merge_watch(&base.watch, self.watch),
        }
    }
}

fn merge_extractor(base: &ExtractorConfig, update: Option<ExtractorUpdate>) -> ExtractorConfig {
    let Some(u) = update else {
        return base.clone();
    };
    ExtractorConfig {
        kind: u.kind.unwrap_or(base.kind),
        program: u.program.unwrap_or_else(|| base.program.clone()),
        args: u.args.unwrap_or_else(|| base.args.clone()),
        timeout_ms: u.timeout_ms.unwrap_or(base.timeout_ms),
    }
}

fn merge_watch(base: &WatchConfig, update: Option<WatchUpdate>) -> WatchConfig {
    let Some(u) = update else {
        return base.clone();
    };
    WatchConfig {
        debounce_ms: u.debounce_ms.unwrap_or(base.debounce_ms),
        exclude: u.exclude.unwrap_or_else(|| base.exclude.clone()),
    }
}

impl From<ConfigUpdate> for Config {
    fn from(update: ConfigUpdate) -> Self {
        update.merge_into(&Config::default())
    }
}
