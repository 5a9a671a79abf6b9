//! Fenced code block scanning.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern for matching code fence openings.
static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<indent>\s*)(?P<fence>`{3,}|~{3,})(?P<info>.*)$").unwrap());

/// A fenced block found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    /// The attribute string after the opening fence (untrimmed).
    pub info: String,
    /// Byte offset of `info` within the opening line.
    pub info_offset: usize,
    /// Content lines with the fence indentation stripped, each ending in `\n`.
    pub content: String,
    /// Line of the opening fence (0-indexed).
    pub open_line: usize,
    /// Line of the closing fence, or `None` if the document ended first.
    pub close_line: Option<usize>,
    /// Length in characters of the closing fence line.
    pub close_len: usize,
    /// Indentation of the opening fence.
    pub indent: String,
}

impl Fence {
    /// Returns true if a closing fence was found.
    pub fn is_closed(&self) -> bool {
        self.close_line.is_some()
    }
}

/// Iterates over the fenced blocks of a document, in order.
///
/// A fence closes on a line holding only the same fence character, repeated
/// at least as many times as in the opener. Everything after an unclosed
/// fence belongs to it.
pub struct FenceScanner<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> FenceScanner<'a> {
    /// Creates a scanner over `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }
}

impl Iterator for FenceScanner<'_> {
    type Item = Fence;

    fn next(&mut self) -> Option<Fence> {
        let (open_line, caps) = loop {
            let (idx, line) = self.lines.next()?;
            if let Some(caps) = FENCE_OPEN.captures(line) {
                break (idx, caps);
            }
        };

        let indent = caps["indent"].to_string();
        let fence = &caps["fence"];
        let info_match = caps.name("info")?;
        let fence_char = fence.chars().next()?;
        let fence_len = fence.len();

        let mut content = String::new();
        for (idx, content_line) in self.lines.by_ref() {
            if is_closing_fence(content_line, fence_char, fence_len) {
                return Some(Fence {
                    info: info_match.as_str().to_string(),
                    info_offset: info_match.start(),
                    content,
                    open_line,
                    close_line: Some(idx),
                    close_len: content_line.chars().count(),
                    indent,
                });
            }
            content.push_str(content_line.strip_prefix(indent.as_str()).unwrap_or(content_line));
            content.push('\n');
        }

        Some(Fence {
            info: info_match.as_str().to_string(),
            info_offset: info_match.start(),
            content,
            open_line,
            close_line: None,
            close_len: 0,
            indent,
        })
    }
}

fn is_closing_fence(line: &str, fence_char: char, min_len: usize) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= min_len && trimmed.chars().all(|c| c == fence_char)
}

/// Convenience function to collect all fences from a string.
pub fn scan_fences(text: &str) -> Vec<Fence> {
    FenceScanner::new(text).collect()
}
