//! Reference markers of the form `<<identifier>>`.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use super::Identifier;

/// Reference pattern for detecting noweb-style inline references like `<<refname>>`.
pub static REF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<<(?P<refname>[\w:/.#-]+)>>").unwrap());

/// A reference marker found inside block content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    /// The referenced identifier.
    pub identifier: Identifier,
    /// Line within the content (0-indexed).
    pub line: usize,
    /// Character column of the opening `<<` within that line.
    pub column: usize,
    /// Length of the whole marker in characters.
    pub len: usize,
}

/// Collects the identifiers referenced in `content`, in first-mention order.
pub fn scan_references(content: &str) -> IndexSet<Identifier> {
    REF_PATTERN
        .captures_iter(content)
        .map(|caps| Identifier::new(&caps["refname"]))
        .collect()
}

/// Finds every reference marker in `content` with its line and column.
pub fn find_markers(content: &str) -> Vec<MarkerMatch> {
    let mut found = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        for caps in REF_PATTERN.captures_iter(line) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            found.push(MarkerMatch {
                identifier: Identifier::new(&caps["refname"]),
                line: line_idx,
                column: line[..whole.start()].chars().count(),
                len: whole.as_str().chars().count(),
            });
        }
    }
    found
}

/// Placeholder emitted when expansion meets an identifier already on the path.
pub fn circular_marker(identifier: &Identifier) -> String {
    format!("<<circular reference to {}>>", identifier)
}

/// Placeholder emitted when expansion meets an identifier with no blocks.
pub fn not_found_marker(identifier: &Identifier) -> String {
    format!("<<{} not found>>", identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_pattern() {
        let caps = REF_PATTERN.captures("    <<some_ref>>").unwrap();
        assert_eq!(&caps["refname"], "some_ref");

        let caps = REF_PATTERN.captures("x = <<module::func>>;").unwrap();
        assert_eq!(&caps["refname"], "module::func");

        assert!(REF_PATTERN.captures("not a ref").is_none());
        assert!(REF_PATTERN.captures("<<>>").is_none());
        assert!(REF_PATTERN.captures("<<has space>>").is_none());
    }

    #[test]
    fn test_ref_pattern_with_path() {
        let caps = REF_PATTERN.captures("<<path/to/file.py>>").unwrap();
        assert_eq!(&caps["refname"], "path/to/file.py");
    }

    #[test]
    fn test_scan_references_dedupes_in_order() {
        let refs = scan_references("<<b>> and <<a>>\n<<b>> again");
        let names: Vec<_> = refs.iter().map(Identifier::as_str).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_find_markers_positions() {
        let markers = find_markers("fn main() {\n    let x = <<value>>;\n}");
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].identifier.as_str(), "value");
        assert_eq!(markers[0].line, 1);
        assert_eq!(markers[0].column, 12);
        assert_eq!(markers[0].len, 9);
    }

    #[test]
    fn test_find_markers_counts_characters() {
        let markers = find_markers("é <<x>>");
        assert_eq!(markers[0].column, 2);
    }

    #[test]
    fn test_placeholders() {
        let id = Identifier::new("zzz");
        assert_eq!(circular_marker(&id), "<<circular reference to zzz>>");
        assert_eq!(not_found_marker(&id), "<<zzz not found>>");
    }
}
