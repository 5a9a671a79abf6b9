//! Block IDs for addressing one occurrence of an identifier.

use std::fmt;

use super::Identifier;

/// Addresses one occurrence of a possibly repeated identifier.
///
/// The occurrence is counted per document, in document order, so the same
/// `BlockId` may exist once in each document that extends the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockId {
    /// The block identifier.
    pub identifier: Identifier,
    /// The occurrence ordinal (0-indexed).
    pub occurrence: u32,
}

impl BlockId {
    /// Creates a new BlockId.
    pub fn new(identifier: Identifier, occurrence: u32) -> Self {
        Self {
            identifier,
            occurrence,
        }
    }

    /// Creates a BlockId for the first occurrence.
    pub fn first(identifier: Identifier) -> Self {
        Self {
            identifier,
            occurrence: 0,
        }
    }

    /// Parses a block ID from string format "name[occurrence]".
    pub fn parse(s: &str) -> Option<Self> {
        let bracket_pos = s.rfind('[')?;
        let inner = s[bracket_pos + 1..].strip_suffix(']')?;
        let occurrence = inner.parse::<u32>().ok()?;
        let name = &s[..bracket_pos];
        if name.is_empty() {
            return None;
        }
        Some(Self::new(Identifier::new(name), occurrence))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.identifier, self.occurrence)
    }
}
