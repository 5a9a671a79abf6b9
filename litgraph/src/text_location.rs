//! Text positions and spans within source documents.

use std::fmt;

use crate::model::DocumentId;

/// A position within a text document.
///
/// Both line and column are zero-based; the column counts characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextPosition {
    /// Line number (0-indexed).
    pub line: usize,
    /// Column number in characters (0-indexed).
    pub column: usize,
}

impl TextPosition {
    /// Creates a new TextPosition.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Displayed 1-indexed, the way editors and compilers report positions.
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A half-open range `[start, end)` within a text document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextSpan {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextSpan {
    /// Creates a new TextSpan.
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        Self { start, end }
    }

    /// Creates a span on a single line.
    pub fn on_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            start: TextPosition::new(line, start_column),
            end: TextPosition::new(line, end_column),
        }
    }

    /// Returns true if the position lies within this span.
    pub fn contains(&self, position: TextPosition) -> bool {
        self.start <= position && position < self.end
    }

    /// Number of lines touched by this span.
    pub fn line_count(&self) -> usize {
        self.end.line.saturating_sub(self.start.line) + 1
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Where a block lives in its source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// The document the block was parsed from.
    pub document: DocumentId,
    /// Opening fence to closing fence, inclusive of both fence lines.
    pub span: TextSpan,
    /// The identifier token inside the opening fence.
    pub identifier_span: TextSpan,
}

impl SourceLocation {
    /// Creates a new SourceLocation.
    pub fn new(document: DocumentId, span: TextSpan, identifier_span: TextSpan) -> Self {
        Self {
            document,
            span,
            identifier_span,
        }
    }

    /// Returns a location for the same document with a different span.
    pub fn with_span(&self, span: TextSpan) -> Self {
        Self {
            document: self.document.clone(),
            span,
            identifier_span: span,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.document, self.identifier_span.start)
    }
}
