//! The engine: one registry plus the queries editors ask of it.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexSet;

use crate::errors::{LitgraphError, Result};
use crate::extract::{normalize, RawBlock};
use crate::location::locate_blocks;
use crate::model::{
    expanded_content, find_cycles, find_markers, Block, BlockId, BlockRegistry, Cycle,
    DependencyGraph, DocumentId, Identifier,
};
use crate::text_location::{SourceLocation, TextSpan};

/// What a single `parse_document` call did.
#[derive(Debug)]
pub struct ParseReport {
    pub document: DocumentId,
    /// Blocks now registered for the document.
    pub inserted: usize,
    /// Blocks the document held before this parse.
    pub removed: usize,
    /// Blocks that could not be located in the text, as `LocationNotFound` errors.
    pub dropped: Vec<LitgraphError>,
    /// Cycles present in the whole registry after the parse.
    pub cycles: Vec<Cycle>,
}

/// How a reference site relates to the queried identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// One occurrence of the identifier itself.
    Definition,
    /// A `<<identifier>>` marker inside another block.
    Usage,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Definition => write!(f, "definition"),
            ReferenceKind::Usage => write!(f, "usage"),
        }
    }
}

/// One place where an identifier is defined or used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    pub kind: ReferenceKind,
    /// The block holding the site.
    pub block: BlockId,
    pub location: SourceLocation,
}

/// Owns the block registry and answers definition, reference, cycle and
/// expansion queries over it.
///
/// All mutation goes through `&mut self`; wrap the engine in a
/// [`Session`](super::Session) to share it across tasks.
#[derive(Debug, Default)]
pub struct Engine {
    registry: BlockRegistry,
    /// Cycles found by the last parse.
    cycles: Vec<Cycle>,
    /// Last parsed text of each document, for locating markers.
    texts: HashMap<DocumentId, String>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Builds the identifier graph for the current registry.
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::from_registry(&self.registry)
    }

    /// Replaces a document's blocks with those extracted from `text`.
    ///
    /// Blocks that cannot be located are dropped with a warning; the rest of
    /// the document still registers. Cycle detection runs afterwards and
    /// every cycle is logged.
    pub fn parse_document(
        &mut self,
        document: &DocumentId,
        text: &str,
        raw_blocks: Vec<RawBlock>,
    ) -> ParseReport {
        let resolved = locate_blocks(text, normalize(raw_blocks));

        let mut dropped = Vec::with_capacity(resolved.dropped.len());
        for (raw, error) in resolved.dropped {
            let identifier = Identifier::new(raw.identifier);
            let occurrence = raw.occurrence.unwrap_or(0);
            tracing::warn!(
                %document,
                %identifier,
                occurrence,
                "Dropping block: {}",
                error
            );
            dropped.push(error.into_error(&identifier, occurrence));
        }

        let blocks: Vec<Block> = resolved
            .located
            .into_iter()
            .map(|(raw, loc)| {
                let references: IndexSet<Identifier> =
                    raw.references().into_iter().map(Identifier::from).collect();
                Block::new(
                    BlockId::new(
                        Identifier::new(raw.identifier),
                        raw.occurrence.unwrap_or(0),
                    ),
                    raw.language,
                    raw.content,
                    SourceLocation::new(document.clone(), loc.span, loc.identifier_span),
                )
                .with_references(references)
            })
            .collect();

        let inserted = blocks.len();
        let removed = self.registry.replace_document(document, blocks);
        self.texts.insert(document.clone(), text.to_string());
        self.refresh_cycles();

        tracing::debug!(%document, inserted, removed, dropped = dropped.len(), "Parsed document");

        ParseReport {
            document: document.clone(),
            inserted,
            removed,
            dropped,
            cycles: self.cycles.clone(),
        }
    }

    /// Drops every block of a closed document. Returns the number removed.
    pub fn close_document(&mut self, document: &DocumentId) -> usize {
        let removed = self.registry.remove_document(document);
        self.texts.remove(document);
        self.refresh_cycles();
        tracing::debug!(%document, removed, "Closed document");
        removed
    }

    fn refresh_cycles(&mut self) {
        self.cycles = find_cycles(&self.graph());
        for cycle in &self.cycles {
            tracing::warn!("Circular reference: {}", cycle);
        }
    }

    /// Location of the first occurrence of `identifier`.
    pub fn find_definition(&self, identifier: &Identifier) -> Option<&SourceLocation> {
        self.registry.lookup(identifier).first().map(|block| &block.location)
    }

    /// Every occurrence of `identifier`, followed by every marker naming it.
    ///
    /// A usage points at the marker itself when the marker can be found on
    /// the corresponding document line, and at the referencing block
    /// otherwise.
    pub fn find_references(&self, identifier: &Identifier) -> Vec<ReferenceSite> {
        let mut sites: Vec<ReferenceSite> = self
            .registry
            .lookup(identifier)
            .iter()
            .map(|block| ReferenceSite {
                kind: ReferenceKind::Definition,
                block: block.id.clone(),
                location: block.location.clone(),
            })
            .collect();

        for block in self.registry.blocks().filter(|b| b.references(identifier)) {
            let markers: Vec<_> = find_markers(&block.content)
                .into_iter()
                .filter(|m| &m.identifier == identifier)
                .collect();

            if markers.is_empty() {
                sites.push(ReferenceSite {
                    kind: ReferenceKind::Usage,
                    block: block.id.clone(),
                    location: block.location.clone(),
                });
                continue;
            }

            for marker in markers {
                let location = self
                    .marker_span(block, marker.line, marker.column, identifier)
                    .map(|span| block.location.with_span(span))
                    .unwrap_or_else(|| block.location.clone());
                sites.push(ReferenceSite {
                    kind: ReferenceKind::Usage,
                    block: block.id.clone(),
                    location,
                });
            }
        }

        sites
    }

    /// Maps a marker at `(line, column)` of a block's content to the
    /// document, if the document line really holds it.
    fn marker_span(
        &self,
        block: &Block,
        line: usize,
        column: usize,
        identifier: &Identifier,
    ) -> Option<TextSpan> {
        let text = self.texts.get(block.document())?;
        let doc_line = block.location.span.start.line + 1 + line;
        if doc_line >= block.location.span.end.line {
            return None;
        }
        let line_text = text.lines().nth(doc_line)?;
        let marker = identifier.marker();

        // Fence indentation shifts the marker right, never left.
        line_text.match_indices(&marker).find_map(|(byte, _)| {
            let start = line_text[..byte].chars().count();
            (start >= column).then(|| {
                TextSpan::on_line(doc_line, start, start + marker.chars().count())
            })
        })
    }

    /// Recomputes the cycles of the current registry.
    pub fn find_circular_references(&self) -> Vec<Cycle> {
        find_cycles(&self.graph())
    }

    /// Cycles found by the most recent mutation.
    pub fn last_cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Fully expanded content of `identifier`.
    pub fn get_expanded_content(&self, identifier: &Identifier) -> Result<String> {
        expanded_content(&self.registry, identifier)
    }

    /// Drops every block, cycle and remembered text.
    pub fn clear_cache(&mut self) {
        self.registry.clear();
        self.cycles.clear();
        self.texts.clear();
        tracing::debug!("Cleared engine state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FenceExtractor;
    use crate::test_utils::doc;
    use crate::text_location::TextPosition;
    use pretty_assertions::assert_eq;

    fn parse(engine: &mut Engine, name: &str, text: &str) -> ParseReport {
        let raw = FenceExtractor::new().extract_sync(text);
        engine.parse_document(&doc(name), text, raw)
    }

    const GREET: &str = "\
``` {.python #greet}
Hello, <<name>>!
```

``` {.python #name}
World
```
";

    // Substitution is inline and every expanded occurrence ends in a newline,
    // so `name` contributes "World\n" before the trailing "!".
    #[test]
    fn test_greet_scenario() {
        let mut engine = Engine::new();
        let report = parse(&mut engine, "greet.md", GREET);

        assert_eq!(report.inserted, 2);
        assert!(report.dropped.is_empty());
        assert_eq!(
            engine.get_expanded_content(&Identifier::new("greet")).unwrap(),
            "Hello, World\n!\n"
        );

        let name = &engine.registry().lookup(&Identifier::new("name"))[0];
        assert!(name.dependents().contains(&Identifier::new("greet")));
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let mut engine = Engine::new();
        parse(&mut engine, "greet.md", GREET);
        let before: Vec<Block> = engine.registry().blocks().cloned().collect();

        let report = parse(&mut engine, "greet.md", GREET);
        let after: Vec<Block> = engine.registry().blocks().cloned().collect();

        assert_eq!(report.removed, 2);
        assert_eq!(before, after);
    }

    #[test]
    fn test_reparse_with_shared_identifier_is_stable() {
        let a = "``` {#x}\nfrom a\n```\n``` {#A}\n<<B>>\n```\n";
        let b = "``` {#x}\nfrom b\n```\n``` {#B}\n<<A>>\n```\n";
        let mut engine = Engine::new();
        parse(&mut engine, "a.md", a);
        parse(&mut engine, "b.md", b);

        let snapshot = |engine: &Engine| {
            let expanded = engine.get_expanded_content(&Identifier::new("x")).unwrap();
            let cycles: Vec<String> = engine
                .find_circular_references()
                .iter()
                .map(ToString::to_string)
                .collect();
            (expanded, cycles)
        };
        let before = snapshot(&engine);
        assert_eq!(before.0, "from a\nfrom b\n");
        assert_eq!(before.1, vec!["A -> B -> A".to_string()]);

        parse(&mut engine, "a.md", a);
        assert_eq!(snapshot(&engine), before);
    }

    #[test]
    fn test_find_definition() {
        let mut engine = Engine::new();
        parse(&mut engine, "greet.md", GREET);

        let location = engine.find_definition(&Identifier::new("name")).unwrap();
        assert_eq!(location.document, doc("greet.md"));
        assert_eq!(location.span.start, TextPosition::new(4, 0));
        assert_eq!(location.identifier_span, TextSpan::on_line(4, 14, 18));
        assert!(engine.find_definition(&Identifier::new("nope")).is_none());
    }

    #[test]
    fn test_find_references() {
        let mut engine = Engine::new();
        parse(&mut engine, "greet.md", GREET);

        let sites = engine.find_references(&Identifier::new("name"));
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].kind, ReferenceKind::Definition);
        assert_eq!(sites[1].kind, ReferenceKind::Usage);
        assert_eq!(sites[1].block.identifier.as_str(), "greet");
        // `Hello, <<name>>!` on line 1.
        assert_eq!(sites[1].location.span, TextSpan::on_line(1, 7, 15));
    }

    #[test]
    fn test_usage_in_indented_fence() {
        let mut engine = Engine::new();
        let text = "  ``` {.py #main}\n  x = <<v>>\n  ```\n``` {.py #v}\n1\n```\n";
        parse(&mut engine, "a.md", text);

        let sites = engine.find_references(&Identifier::new("v"));
        let usage = sites
            .iter()
            .find(|s| s.kind == ReferenceKind::Usage)
            .unwrap();
        assert_eq!(usage.location.span, TextSpan::on_line(1, 6, 11));
    }

    #[test]
    fn test_cross_document_resolution() {
        let mut engine = Engine::new();
        parse(&mut engine, "a.md", "``` {.py #main}\n<<lib>>\n```\n");
        parse(&mut engine, "b.md", "``` {.py #lib}\nimport os\n```\n");

        assert_eq!(
            engine.get_expanded_content(&Identifier::new("main")).unwrap(),
            "import os\n\n"
        );
        let sites = engine.find_references(&Identifier::new("lib"));
        assert_eq!(sites[0].location.document, doc("b.md"));
        assert_eq!(sites[1].location.document, doc("a.md"));
    }

    #[test]
    fn test_cycles_reported_after_parse() {
        let mut engine = Engine::new();
        let report = parse(
            &mut engine,
            "a.md",
            "``` {#A}\n<<B>>\n```\n``` {#B}\n<<C>>\n```\n``` {#C}\n<<A>>\n```\n",
        );

        assert_eq!(report.cycles.len(), 1);
        let ids: Vec<Identifier> = ["A", "B", "C"].into_iter().map(Identifier::new).collect();
        assert!(report.cycles[0].is_rotation_of(&ids));
        assert_eq!(engine.find_circular_references(), report.cycles);

        let expanded = engine.get_expanded_content(&Identifier::new("A")).unwrap();
        assert_eq!(expanded.matches("circular reference to A").count(), 1);
    }

    #[test]
    fn test_unlocatable_block_dropped() {
        let mut engine = Engine::new();
        let text = "``` {#a}\n1\n```\n";
        let raw = vec![
            RawBlock {
                identifier: "a".to_string(),
                language: None,
                content: "1\n".to_string(),
                referenced_identifiers: None,
                occurrence: None,
            },
            RawBlock {
                identifier: "ghost".to_string(),
                language: None,
                content: "2\n".to_string(),
                referenced_identifiers: None,
                occurrence: None,
            },
        ];
        let report = engine.parse_document(&doc("a.md"), text, raw);

        assert_eq!(report.inserted, 1);
        assert_eq!(report.dropped.len(), 1);
        assert!(matches!(
            &report.dropped[0],
            LitgraphError::LocationNotFound { identifier, .. } if identifier.as_str() == "ghost"
        ));
    }

    #[test]
    fn test_close_document_removes_dependents() {
        let mut engine = Engine::new();
        parse(&mut engine, "a.md", "``` {#A}\n<<B>>\n```\n");
        parse(&mut engine, "b.md", "``` {#B}\nleaf\n```\n");
        let b = &engine.registry().lookup(&Identifier::new("B"))[0];
        assert!(b.dependents().contains(&Identifier::new("A")));

        assert_eq!(engine.close_document(&doc("a.md")), 1);
        for block in engine.registry().blocks() {
            assert!(!block.dependents().contains(&Identifier::new("A")));
        }
    }

    #[test]
    fn test_expand_missing_is_error() {
        let engine = Engine::new();
        assert!(matches!(
            engine.get_expanded_content(&Identifier::new("zzz")),
            Err(LitgraphError::BlockNotFound(_))
        ));
    }

    #[test]
    fn test_clear_cache() {
        let mut engine = Engine::new();
        parse(&mut engine, "greet.md", GREET);
        engine.clear_cache();

        assert!(engine.registry().is_empty());
        assert!(engine.last_cycles().is_empty());
        assert!(engine.find_references(&Identifier::new("name")).is_empty());
    }
}
