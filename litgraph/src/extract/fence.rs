//! In-process extractor for fenced blocks.

use std::collections::HashMap;

use crate::errors::Result;
use crate::readers::{FenceScanner, Properties};

use super::{BlockExtractor, RawBlock};

/// Extracts fenced blocks carrying a `#id` attribute.
///
/// Fences without an id, with an unreadable attribute string, or without a
/// closing fence are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FenceExtractor;

impl FenceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous form of [`BlockExtractor::extract`].
    pub fn extract_sync(&self, text: &str) -> Vec<RawBlock> {
        let mut occurrences: HashMap<String, u32> = HashMap::new();
        let mut blocks = Vec::new();

        for fence in FenceScanner::new(text) {
            let props = match Properties::parse(&fence.info) {
                Ok(props) => props,
                Err(e) => {
                    tracing::debug!(line = fence.open_line + 1, "Unreadable fence attributes: {}", e);
                    continue;
                }
            };
            let Some(identifier) = props.first_id() else {
                continue;
            };
            if !fence.is_closed() {
                tracing::debug!(%identifier, line = fence.open_line + 1, "Skipping unclosed fence");
                continue;
            }

            let counter = occurrences.entry(identifier.to_string()).or_insert(0);
            let occurrence = *counter;
            *counter += 1;

            let mut block = RawBlock {
                identifier: identifier.to_string(),
                language: props.first_class().map(str::to_string),
                content: fence.content,
                referenced_identifiers: None,
                occurrence: Some(occurrence),
            };
            block.referenced_identifiers = Some(block.references());
            blocks.push(block);
        }

        blocks
    }
}

impl BlockExtractor for FenceExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<RawBlock>> {
        Ok(self.extract_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_named_blocks() {
        let text = "\
Intro.

``` {.python #main}
<<imports>>
main()
```

```python
anonymous
```

```rust #imports
use std::io;
```
";
        let blocks = FenceExtractor::new().extract_sync(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].identifier, "main");
        assert_eq!(blocks[0].language.as_deref(), Some("python"));
        assert_eq!(blocks[0].content, "<<imports>>\nmain()\n");
        assert_eq!(
            blocks[0].referenced_identifiers,
            Some(vec!["imports".to_string()])
        );
        assert_eq!(blocks[1].identifier, "imports");
        assert_eq!(blocks[1].language.as_deref(), Some("rust"));
    }

    #[test]
    fn test_occurrences_counted_per_identifier() {
        let text = "``` {#a}\n1\n```\n``` {#b}\n2\n```\n``` {#a}\n3\n```\n";
        let blocks = FenceExtractor::new().extract_sync(text);
        let ids: Vec<_> = blocks
            .iter()
            .map(|b| (b.identifier.as_str(), b.occurrence))
            .collect();
        assert_eq!(ids, vec![("a", Some(0)), ("b", Some(0)), ("a", Some(1))]);
    }

    #[test]
    fn test_unclosed_fence_skipped() {
        let text = "``` {#a}\n1\n```\n``` {#b}\nnever closed\n";
        let blocks = FenceExtractor::new().extract_sync(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].identifier, "a");
    }

    #[tokio::test]
    async fn test_async_extract() {
        let blocks = FenceExtractor::new()
            .extract("~~~ {.sh #run}\necho hi\n~~~\n")
            .await
            .unwrap();
        assert_eq!(blocks[0].identifier, "run");
        assert_eq!(blocks[0].content, "echo hi\n");
    }
}
