//! Expansion ("tangling") of reference markers into block content.

use indexmap::IndexSet;

use crate::errors::{LitgraphError, Result};

use super::block::Block;
use super::identifier::Identifier;
use super::markers::{circular_marker, not_found_marker, REF_PATTERN};
use super::registry::BlockRegistry;

/// The identifiers being expanded on the way from the root to the current block.
///
/// An identifier leaves the path once its expansion is complete, so two
/// siblings referencing the same identifier both expand it in full. Only an
/// identifier that is its own ancestor is cut short.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionPath {
    ancestors: IndexSet<Identifier>,
}

impl ExpansionPath {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the identifier is already being expanded on this path.
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.ancestors.contains(identifier)
    }

    /// Returns a copy of this path extended with `identifier`.
    #[must_use]
    pub fn descend(&self, identifier: &Identifier) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.insert(identifier.clone());
        Self { ancestors }
    }

    /// Returns the current depth.
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Identifiers on the path, root first.
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.ancestors.iter()
    }

    fn push(&mut self, identifier: &Identifier) {
        self.ancestors.insert(identifier.clone());
    }

    fn pop(&mut self) {
        self.ancestors.pop();
    }
}

/// One identifier being expanded: which occurrence, and how far into it.
struct Frame<'a> {
    occurrences: &'a [Block],
    block: usize,
    offset: usize,
    block_start: usize,
    output: String,
}

impl<'a> Frame<'a> {
    fn new(occurrences: &'a [Block]) -> Self {
        Self {
            occurrences,
            block: 0,
            offset: 0,
            block_start: 0,
            output: String::new(),
        }
    }
}

/// What to splice in for a marker naming `identifier`, unless it must be
/// expanded.
fn placeholder(
    registry: &BlockRegistry,
    identifier: &Identifier,
    path: &ExpansionPath,
) -> Option<String> {
    if path.contains(identifier) {
        tracing::debug!(%identifier, depth = path.depth(), "Circular reference during expansion");
        return Some(circular_marker(identifier));
    }
    if !registry.contains(identifier) {
        return Some(not_found_marker(identifier));
    }
    None
}

/// Expands `identifier` against the registry.
///
/// Every occurrence of the identifier is emitted in order with each
/// `<<ref>>` marker replaced by the expansion of `ref`, and each occurrence is
/// terminated by a newline. An identifier already on `path` expands to
/// `<<circular reference to ID>>`; one with no blocks expands to
/// `<<ID not found>>`. Neither case is an error.
///
/// Nesting is tracked on an explicit stack, so reference chains of any depth
/// expand without growing the call stack.
pub fn expand(registry: &BlockRegistry, identifier: &Identifier, path: &ExpansionPath) -> String {
    if let Some(text) = placeholder(registry, identifier, path) {
        return text;
    }

    let mut path = path.clone();
    path.push(identifier);
    let mut stack = vec![Frame::new(registry.lookup(identifier))];

    loop {
        let Some(frame) = stack.last_mut() else {
            return String::new();
        };

        let occurrences = frame.occurrences;
        let Some(block) = occurrences.get(frame.block) else {
            let Some(done) = stack.pop() else {
                return String::new();
            };
            path.pop();
            match stack.last_mut() {
                Some(parent) => parent.output.push_str(&done.output),
                None => return done.output,
            }
            continue;
        };

        let content = block.content.as_str();
        let marker = REF_PATTERN.captures_at(content, frame.offset).and_then(|caps| {
            let name = caps.name("refname")?;
            Some((caps.get(0)?.range(), Identifier::new(name.as_str())))
        });
        let Some((range, reference)) = marker else {
            frame.output.push_str(&content[frame.offset..]);
            if !frame.output[frame.block_start..].ends_with('\n') {
                frame.output.push('\n');
            }
            frame.block += 1;
            frame.offset = 0;
            frame.block_start = frame.output.len();
            continue;
        };

        frame.output.push_str(&content[frame.offset..range.start]);
        frame.offset = range.end;

        match placeholder(registry, &reference, &path) {
            Some(text) => frame.output.push_str(&text),
            None => {
                path.push(&reference);
                stack.push(Frame::new(registry.lookup(&reference)));
            }
        }
    }
}

/// Expands a top-level identifier.
///
/// Fails with [`LitgraphError::BlockNotFound`] when the identifier itself has
/// no blocks. Missing or circular references further down degrade to inline
/// placeholder text instead.
pub fn expanded_content(registry: &BlockRegistry, identifier: &Identifier) -> Result<String> {
    if !registry.contains(identifier) {
        return Err(LitgraphError::BlockNotFound(identifier.clone()));
    }
    Ok(expand(registry, identifier, &ExpansionPath::new()))
}
