//! litgraph - block and reference resolution for literate documents
//!
//! Literate documents hold named code blocks that include each other through
//! `<<identifier>>` markers. This library turns those documents into a symbol
//! graph: where each identifier is defined, where it is used, which
//! references are circular, and what each identifier expands to once every
//! marker is substituted.
//!
//! # Features
//!
//! - **Extract**: Read named fenced blocks in process, or through an external converter
//! - **Locate**: Map every block back to its fence and identifier token
//! - **Resolve**: Track dependencies and dependents across documents
//! - **Detect**: Report circular references
//! - **Expand**: Substitute markers recursively, with inline placeholders for
//!   missing and circular references
//!
//! # Example
//!
//! ```no_run
//! use litgraph::extract::FenceExtractor;
//! use litgraph::model::{DocumentId, Identifier};
//! use litgraph::Engine;
//!
//! let text = "``` {.python #main}\nprint(<<msg>>)\n```\n``` {.python #msg}\n'hi'\n```\n";
//! let mut engine = Engine::new();
//! let raw = FenceExtractor::new().extract_sync(text);
//! engine.parse_document(&DocumentId::new("doc.md"), text, raw);
//!
//! let source = engine.get_expanded_content(&Identifier::new("main")).unwrap();
//! ```

pub mod config;
pub mod errors;
pub mod extract;
pub mod interface;
pub mod location;
pub mod model;
pub mod readers;
pub mod text_location;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use errors::{LitgraphError, Result};
pub use interface::{Context, Engine, ParseOutcome, Session};
pub use model::{Block, BlockId, BlockRegistry, Cycle, DocumentId, Identifier};
