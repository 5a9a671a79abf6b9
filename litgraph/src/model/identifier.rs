//! Block identifiers and document identifiers.

use std::fmt;

/// The name under which one or more blocks are registered.
///
/// Identifiers may repeat: every block sharing an identifier contributes to
/// the same logical macro, in occurrence order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Creates a new Identifier from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats this identifier as a reference marker, `<<name>>`.
    pub fn marker(&self) -> String {
        format!("<<{}>>", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Names a source document, typically a URI or a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new DocumentId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a DocumentId from a filesystem path.
    pub fn from_path(path: &std::path::Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    /// Returns the document id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_identifier() {
        let id = Identifier::new("main");
        assert_eq!(id.as_str(), "main");
        assert_eq!(format!("{}", id), "main");
        assert_eq!(id.marker(), "<<main>>");
    }

    #[test]
    fn test_identifier_from() {
        let a: Identifier = "module::func".into();
        let b = Identifier::from("module::func".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn test_document_id_from_path() {
        let doc = DocumentId::from_path(Path::new("docs/guide.md"));
        assert_eq!(doc.as_str(), "docs/guide.md");
    }
}
