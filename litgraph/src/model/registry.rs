//! Block registry: identifier to ordered block occurrences.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use super::block::Block;
use super::block_id::BlockId;
use super::graph::rebuild_dependents;
use super::identifier::{DocumentId, Identifier};

/// The authoritative mapping from identifier to block occurrences.
///
/// - Primary index: `IndexMap<Identifier, Vec<Block>>` (identifier insertion order preserved)
/// - Document index: `HashMap<DocumentId, IndexSet<Identifier>>` (which entries a document owns)
///
/// An identifier may be extended by several blocks, in one or several
/// documents. Occurrences are ordered by the document's first registration,
/// then by position within the document, so re-registering a document never
/// reorders anything. Dependents are recomputed after every mutation.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    /// Primary storage: identifier -> occurrences, in insertion order.
    blocks: IndexMap<Identifier, Vec<Block>>,

    /// Document index: document -> identifiers it contributed.
    documents: HashMap<DocumentId, IndexSet<Identifier>>,

    /// Every document ever registered, in first-registration order.
    document_order: IndexSet<DocumentId>,
}

impl BlockRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every block attributed to `document` with `blocks`.
    ///
    /// Blocks are inserted in the given order, which should be document order.
    /// Each block's location is attributed to `document`. Returns the number
    /// of blocks removed.
    pub fn replace_document(&mut self, document: &DocumentId, blocks: Vec<Block>) -> usize {
        let removed = self.detach_document(document);
        let (rank, _) = self.document_order.insert_full(document.clone());
        let order = &self.document_order;

        let mut owned = IndexSet::new();
        for mut block in blocks {
            if block.location.document != *document {
                block.location.document = document.clone();
            }
            owned.insert(block.identifier().clone());
            let occurrences = self.blocks.entry(block.identifier().clone()).or_default();
            let at = occurrences.partition_point(|existing| {
                order
                    .get_index_of(existing.document())
                    .is_some_and(|existing_rank| existing_rank <= rank)
            });
            occurrences.insert(at, block);
        }
        if !owned.is_empty() {
            self.documents.insert(document.clone(), owned);
        }

        self.prune_empty();
        rebuild_dependents(self);
        removed
    }

    /// Removes every block attributed to `document`. Returns the number removed.
    pub fn remove_document(&mut self, document: &DocumentId) -> usize {
        let removed = self.detach_document(document);
        self.prune_empty();
        rebuild_dependents(self);
        removed
    }

    /// Drops identifiers left without occurrences, keeping the order of the rest.
    fn prune_empty(&mut self) {
        self.blocks.retain(|_, occurrences| !occurrences.is_empty());
    }

    /// Removes a document's blocks without rebuilding dependents.
    ///
    /// Emptied identifiers keep their slot until [`Self::prune_empty`], so a
    /// re-registered document finds them where they were.
    fn detach_document(&mut self, document: &DocumentId) -> usize {
        let Some(identifiers) = self.documents.remove(document) else {
            return 0;
        };

        let mut removed = 0;
        for identifier in identifiers {
            let Some(occurrences) = self.blocks.get_mut(&identifier) else {
                continue;
            };
            // The same identifier may also be defined by other documents.
            let before = occurrences.len();
            occurrences.retain(|block| block.document() != document);
            removed += before - occurrences.len();
        }
        removed
    }

    /// Returns all occurrences of an identifier, in order.
    pub fn lookup(&self, identifier: &Identifier) -> &[Block] {
        self.blocks
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn lookup_mut(&mut self, identifier: &Identifier) -> Option<&mut [Block]> {
        self.blocks.get_mut(identifier).map(Vec::as_mut_slice)
    }

    /// Gets one occurrence from a specific document.
    pub fn get(&self, document: &DocumentId, id: &BlockId) -> Option<&Block> {
        self.lookup(&id.identifier)
            .iter()
            .find(|block| block.document() == document && block.occurrence() == id.occurrence)
    }

    /// Checks if an identifier has at least one occurrence.
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.blocks.contains_key(identifier)
    }

    /// Returns every registered identifier, in insertion order.
    pub fn all_identifiers(&self) -> IndexSet<Identifier> {
        self.blocks.keys().cloned().collect()
    }

    /// Iterates over registered identifiers, in insertion order.
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.blocks.keys()
    }

    /// Iterates over every block, grouped by identifier.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values().flatten()
    }

    pub(crate) fn blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.blocks.values_mut().flatten()
    }

    /// Iterates over documents that currently own blocks.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentId> {
        self.documents.keys()
    }

    /// Returns the identifiers a document contributed.
    pub fn document_identifiers(&self, document: &DocumentId) -> Option<&IndexSet<Identifier>> {
        self.documents.get(document)
    }

    /// Returns the blocks contributed by one document.
    pub fn document_blocks<'a>(
        &'a self,
        document: &'a DocumentId,
    ) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks().filter(move |block| block.document() == document)
    }

    /// Returns the number of occurrences of an identifier.
    pub fn count(&self, identifier: &Identifier) -> usize {
        self.lookup(identifier).len()
    }

    /// Returns the total number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.values().map(Vec::len).sum()
    }

    /// Returns true if there are no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Drops every block and document.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.documents.clear();
        self.document_order.clear();
    }
}
