//! Error types for the litgraph engine.

use thiserror::Error;

use crate::model::Identifier;

/// Main error type for litgraph operations.
#[derive(Error, Debug)]
pub enum LitgraphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The block extractor failed or produced malformed output.
    #[error("Extraction failed: {message}")]
    Extraction {
        message: String,
        /// Diagnostic text from the converter (usually its stderr).
        diagnostics: String,
    },

    /// An extracted block could not be matched back to the source text.
    #[error("Location not found for {identifier}[{occurrence}]: {reason}")]
    LocationNotFound {
        identifier: Identifier,
        occurrence: u32,
        reason: String,
    },

    /// A top-level expansion was requested for an identifier with no blocks.
    #[error("Block not found: {0}")]
    BlockNotFound(Identifier),

    #[error("Circular reference: {}", format_path(.0))]
    CircularReference(Vec<Identifier>),

    #[error("Invalid property: {0}")]
    InvalidProperty(String),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("{0}")]
    Other(String),
}

impl LitgraphError {
    /// Creates an extraction error without diagnostics.
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
            diagnostics: String::new(),
        }
    }
}

fn format_path(path: &[Identifier]) -> String {
    path.iter()
        .map(Identifier::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type alias for litgraph operations.
pub type Result<T> = std::result::Result<T, LitgraphError>;
