//! Block extraction: turning document text into raw block records.
//!
//! Two extractors are provided. [`FenceExtractor`] scans fenced blocks in
//! process. [`CommandExtractor`] runs an external converter that prints the
//! blocks as JSON. Both produce [`RawBlock`] values, which the location
//! resolver then ties back to the source text.

mod cache;
mod command;
mod fence;

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::{Config, ExtractorKind};
use crate::errors::Result;
use crate::model::scan_references;

pub use cache::{content_hash, ExtractionCache};
pub use command::CommandExtractor;
pub use fence::FenceExtractor;

/// One block as reported by an extractor.
///
/// This is also the converter wire format: a JSON array of these objects,
/// with `referencedIdentifiers` and `occurrence` optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub identifier: String,
    #[serde(default)]
    pub language: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_identifiers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<u32>,
}

impl RawBlock {
    /// Returns the referenced identifiers, scanning `content` when the
    /// extractor did not report them.
    pub fn references(&self) -> Vec<String> {
        match &self.referenced_identifiers {
            Some(refs) => refs.clone(),
            None => scan_references(&self.content)
                .into_iter()
                .map(|id| id.as_str().to_string())
                .collect(),
        }
    }
}

/// Fills in missing occurrences and references, in document order.
pub fn normalize(blocks: Vec<RawBlock>) -> Vec<RawBlock> {
    let mut counters: HashMap<String, u32> = HashMap::new();
    blocks
        .into_iter()
        .map(|mut block| {
            let counter = counters.entry(block.identifier.clone()).or_insert(0);
            let occurrence = block.occurrence.unwrap_or(*counter);
            *counter = occurrence + 1;
            block.occurrence = Some(occurrence);
            if block.referenced_identifiers.is_none() {
                block.referenced_identifiers = Some(block.references());
            }
            block
        })
        .collect()
}

/// Converts document text into raw blocks.
pub trait BlockExtractor: Send + Sync {
    /// Extracts every named block from `text`, in document order.
    fn extract(&self, text: &str) -> impl Future<Output = Result<Vec<RawBlock>>> + Send;
}

/// The extractor selected by configuration.
#[derive(Debug, Clone)]
pub enum Extractor {
    Fence(FenceExtractor),
    Command(CommandExtractor),
}

impl Extractor {
    /// Builds the extractor described by `config`.
    pub fn from_config(config: &Config) -> Self {
        match config.extractor.kind {
            ExtractorKind::Builtin => Extractor::Fence(FenceExtractor::new()),
            ExtractorKind::Command => Extractor::Command(CommandExtractor::from_config(
                &config.extractor,
            )),
        }
    }
}

impl BlockExtractor for Extractor {
    async fn extract(&self, text: &str) -> Result<Vec<RawBlock>> {
        match self {
            Extractor::Fence(extractor) => extractor.extract(text).await,
            Extractor::Command(extractor) => extractor.extract(text).await,
        }
    }
}
