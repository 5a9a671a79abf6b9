//! Shared test utilities.

use crate::model::{Block, BlockId, DocumentId, Identifier};
use crate::text_location::SourceLocation;

/// Creates a document id.
pub fn doc(name: &str) -> DocumentId {
    DocumentId::new(name)
}

/// Creates a location in `document` with empty spans.
pub fn location(document: &str) -> SourceLocation {
    SourceLocation::new(doc(document), Default::default(), Default::default())
}

/// Creates the first occurrence of a python block.
pub fn make_block(document: &str, name: &str, content: &str) -> Block {
    make_block_at(document, name, 0, content)
}

/// Creates a python block with an explicit occurrence ordinal.
pub fn make_block_at(document: &str, name: &str, occurrence: u32, content: &str) -> Block {
    Block::new(
        BlockId::new(Identifier::new(name), occurrence),
        Some("python".to_string()),
        content.to_string(),
        location(document),
    )
}
