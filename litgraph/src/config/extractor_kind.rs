//! Extractor selection.

use serde::{Deserialize, Serialize};

/// Which extractor turns documents into blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ExtractorKind {
    /// The in-process fenced block scanner.
    #[default]
    Builtin,
    /// An external converter printing blocks as JSON.
    Command,
}

impl ExtractorKind {
    /// Returns the kind name as a static string.
    pub fn name(&self) -> &'static str {
        match self {
            ExtractorKind::Builtin => "builtin",
            ExtractorKind::Command => "command",
        }
    }
}

impl std::fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
