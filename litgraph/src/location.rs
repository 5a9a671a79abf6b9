//! Maps extracted blocks back to their fences in the source text.
//!
//! Extractors report what a block contains but not where it lives. The
//! resolver re-scans the document for fence openers whose first `#id` names
//! the block, and counts matches to find the requested occurrence.

use std::collections::HashMap;

use thiserror::Error;

use crate::errors::LitgraphError;
use crate::extract::RawBlock;
use crate::model::Identifier;
use crate::readers::{Fence, FenceScanner, Properties};
use crate::text_location::{TextPosition, TextSpan};

/// The source spans of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLocation {
    /// Opening fence through closing fence.
    pub span: TextSpan,
    /// The identifier token in the opening fence, without the `#`.
    pub identifier_span: TextSpan,
}

/// Why a block could not be located.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("fence opened on line {} is never closed", .line + 1)]
    Unclosed { line: usize },

    #[error("no matching fence")]
    NotFound,
}

impl LocationError {
    /// Converts into the crate error for reporting.
    pub fn into_error(self, identifier: &Identifier, occurrence: u32) -> LitgraphError {
        LitgraphError::LocationNotFound {
            identifier: identifier.clone(),
            occurrence,
            reason: self.to_string(),
        }
    }
}

/// Result of resolving a whole extraction.
#[derive(Debug, Default)]
pub struct LocatedBlocks {
    /// Blocks with their spans, in extraction order.
    pub located: Vec<(RawBlock, BlockLocation)>,
    /// Blocks that could not be matched to a fence.
    pub dropped: Vec<(RawBlock, LocationError)>,
}

/// An opener whose first `#id` was readable.
struct NamedFence {
    identifier: String,
    location: Result<BlockLocation, LocationError>,
}

fn named_fences(text: &str) -> Vec<NamedFence> {
    let lines: Vec<&str> = text.lines().collect();
    FenceScanner::new(text)
        .filter_map(|fence| {
            let props = match Properties::parse(&fence.info) {
                Ok(props) => props,
                Err(e) => {
                    tracing::trace!(line = fence.open_line, "Skipping fence: {}", e);
                    return None;
                }
            };
            let (id, id_range) = props.first_id_span()?;
            let location = match fence.close_line {
                Some(close_line) => Ok(fence_location(&lines, &fence, close_line, id_range)),
                None => Err(LocationError::Unclosed {
                    line: fence.open_line,
                }),
            };
            Some(NamedFence {
                identifier: id.to_string(),
                location,
            })
        })
        .collect()
}

fn fence_location(
    lines: &[&str],
    fence: &Fence,
    close_line: usize,
    id_range: std::ops::Range<usize>,
) -> BlockLocation {
    let opener = lines.get(fence.open_line).copied().unwrap_or_default();
    let byte_start = fence.info_offset + id_range.start;
    let byte_end = fence.info_offset + id_range.end;
    let start_col = opener.get(..byte_start).map_or(0, |s| s.chars().count());
    let end_col = start_col
        + opener
            .get(byte_start..byte_end)
            .map_or(0, |s| s.chars().count());

    BlockLocation {
        span: TextSpan::new(
            TextPosition::new(fence.open_line, 0),
            TextPosition::new(close_line, fence.close_len),
        ),
        identifier_span: TextSpan::on_line(fence.open_line, start_col, end_col),
    }
}

/// Finds the `occurrence`-th fence (0-based) whose first `#id` is `identifier`.
pub fn locate_block(
    text: &str,
    identifier: &str,
    occurrence: u32,
) -> Result<BlockLocation, LocationError> {
    named_fences(text)
        .into_iter()
        .filter(|fence| fence.identifier == identifier)
        .nth(occurrence as usize)
        .map_or(Err(LocationError::NotFound), |fence| fence.location)
}

/// Resolves every raw block against `text` in a single scan.
///
/// Blocks without an occurrence are matched in order, per identifier.
pub fn locate_blocks(text: &str, raw_blocks: Vec<RawBlock>) -> LocatedBlocks {
    let mut by_identifier: HashMap<String, Vec<Result<BlockLocation, LocationError>>> =
        HashMap::new();
    for fence in named_fences(text) {
        by_identifier
            .entry(fence.identifier)
            .or_default()
            .push(fence.location);
    }

    let mut next_occurrence: HashMap<String, u32> = HashMap::new();
    let mut result = LocatedBlocks::default();

    for raw in raw_blocks {
        let counter = next_occurrence.entry(raw.identifier.clone()).or_insert(0);
        let occurrence = raw.occurrence.unwrap_or(*counter);
        *counter = occurrence + 1;

        let found = by_identifier
            .get(&raw.identifier)
            .and_then(|fences| fences.get(occurrence as usize))
            .cloned()
            .unwrap_or(Err(LocationError::NotFound));

        match found {
            Ok(location) => result.located.push((raw, location)),
            Err(e) => result.dropped.push((raw, e)),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# Title

``` {.python #main}
<<body>>
```

Some text.

```python #body
pass
```

``` {.python #main}
more
```
";

    fn raw(identifier: &str, occurrence: Option<u32>) -> RawBlock {
        RawBlock {
            identifier: identifier.to_string(),
            language: Some("python".to_string()),
            content: String::new(),
            referenced_identifiers: None,
            occurrence,
        }
    }

    #[test]
    fn test_locate_first_occurrence() {
        let loc = locate_block(DOC, "main", 0).unwrap();
        assert_eq!(loc.span.start, TextPosition::new(2, 0));
        assert_eq!(loc.span.end, TextPosition::new(4, 3));
        assert_eq!(loc.identifier_span, TextSpan::on_line(2, 14, 18));

        let opener = DOC.lines().nth(2).unwrap();
        assert_eq!(&opener[14..18], "main");
    }

    #[test]
    fn test_locate_later_occurrence() {
        let loc = locate_block(DOC, "main", 1).unwrap();
        assert_eq!(loc.span.start.line, 12);
        assert_eq!(loc.span.end.line, 14);
    }

    #[test]
    fn test_locate_bare_attribute_form() {
        let loc = locate_block(DOC, "body", 0).unwrap();
        assert_eq!(loc.identifier_span, TextSpan::on_line(8, 11, 15));
    }

    #[test]
    fn test_occurrences_exhausted() {
        assert_eq!(locate_block(DOC, "main", 2), Err(LocationError::NotFound));
        assert_eq!(locate_block(DOC, "nope", 0), Err(LocationError::NotFound));
    }

    #[test]
    fn test_unclosed_fence() {
        let text = "``` {.rust #a}\nfn a() {}\n";
        assert_eq!(
            locate_block(text, "a", 0),
            Err(LocationError::Unclosed { line: 0 })
        );
    }

    #[test]
    fn test_identifier_column_counts_characters() {
        let text = "``` {.py title=\"héllo\" #x}\n1\n```\n";
        let loc = locate_block(text, "x", 0).unwrap();
        let opener: Vec<char> = text.lines().next().unwrap().chars().collect();
        let token: String = opener[loc.identifier_span.start.column..loc.identifier_span.end.column]
            .iter()
            .collect();
        assert_eq!(token, "x");
    }

    #[test]
    fn test_rescan_is_stable() {
        assert_eq!(locate_block(DOC, "main", 1), locate_block(DOC, "main", 1));
    }

    #[test]
    fn test_locate_blocks_assigns_missing_occurrences() {
        let result = locate_blocks(
            DOC,
            vec![raw("main", None), raw("body", None), raw("main", None)],
        );
        assert!(result.dropped.is_empty());
        let lines: Vec<usize> = result
            .located
            .iter()
            .map(|(_, loc)| loc.span.start.line)
            .collect();
        assert_eq!(lines, vec![2, 8, 12]);
    }

    #[test]
    fn test_locate_blocks_drops_unmatched() {
        let result = locate_blocks(DOC, vec![raw("main", Some(0)), raw("ghost", Some(0))]);
        assert_eq!(result.located.len(), 1);
        assert_eq!(result.dropped.len(), 1);
        assert_eq!(result.dropped[0].0.identifier, "ghost");
        assert_eq!(result.dropped[0].1, LocationError::NotFound);
    }

    #[test]
    fn test_into_error() {
        let err = LocationError::NotFound.into_error(&Identifier::new("x"), 2);
        assert!(matches!(
            err,
            LitgraphError::LocationNotFound { occurrence: 2, .. }
        ));
    }
}
