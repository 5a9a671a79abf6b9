//! Block representation.

use indexmap::IndexSet;

use super::block_id::BlockId;
use super::identifier::{DocumentId, Identifier};
use super::markers::scan_references;
use crate::text_location::SourceLocation;

/// One physical occurrence of a named code fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Identifier and occurrence ordinal of this block.
    pub id: BlockId,

    /// The language identifier (e.g., "python", "rust").
    pub language: Option<String>,

    /// The raw, unexpanded content.
    pub content: String,

    /// Identifiers mentioned via `<<id>>` in `content`, in first-mention order.
    pub references: IndexSet<Identifier>,

    /// Location in the source document.
    pub location: SourceLocation,

    /// Identifiers of blocks that reference this block's identifier.
    /// Recomputed by the registry on every mutation.
    pub(crate) dependents: IndexSet<Identifier>,
}

impl Block {
    /// Creates a new Block, scanning `content` for references.
    pub fn new(
        id: BlockId,
        language: Option<String>,
        content: String,
        location: SourceLocation,
    ) -> Self {
        let references = scan_references(&content);
        Self {
            id,
            language,
            content,
            references,
            location,
            dependents: IndexSet::new(),
        }
    }

    /// Replaces the reference set, e.g. with one reported by an external extractor.
    pub fn with_references(mut self, references: IndexSet<Identifier>) -> Self {
        self.references = references;
        self
    }

    /// Returns the identifier for this block.
    pub fn identifier(&self) -> &Identifier {
        &self.id.identifier
    }

    /// Returns the occurrence ordinal of this block.
    pub fn occurrence(&self) -> u32 {
        self.id.occurrence
    }

    /// Returns the document this block came from.
    pub fn document(&self) -> &DocumentId {
        &self.location.document
    }

    /// Identifiers this block depends on.
    pub fn dependencies(&self) -> &IndexSet<Identifier> {
        &self.references
    }

    /// Identifiers whose blocks reference this block's identifier.
    pub fn dependents(&self) -> &IndexSet<Identifier> {
        &self.dependents
    }

    /// Returns true if this block references the given identifier.
    pub fn references(&self, identifier: &Identifier) -> bool {
        self.references.contains(identifier)
    }

    /// Returns the line count of the content.
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{location, make_block};

    #[test]
    fn test_new_block_scans_references() {
        let block = Block::new(
            BlockId::first(Identifier::new("main")),
            Some("python".to_string()),
            "<<imports>>\ndef main():\n    <<body>>\n".to_string(),
            location("doc.md"),
        );

        assert_eq!(block.identifier().as_str(), "main");
        assert_eq!(block.occurrence(), 0);
        assert!(block.references(&Identifier::new("imports")));
        assert!(block.references(&Identifier::new("body")));
        assert_eq!(block.dependencies().len(), 2);
        assert!(block.dependents().is_empty());
        assert_eq!(block.line_count(), 3);
    }

    #[test]
    fn test_with_references_overrides_scan() {
        let mut refs = IndexSet::new();
        refs.insert(Identifier::new("other"));
        let block = make_block("doc.md", "main", "<<body>>").with_references(refs);

        assert!(block.references(&Identifier::new("other")));
        assert!(!block.references(&Identifier::new("body")));
    }

    #[test]
    fn test_document() {
        let block = make_block("notes/a.md", "main", "code");
        assert_eq!(block.document().as_str(), "notes/a.md");
    }
}
