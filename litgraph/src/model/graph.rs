//! Dependency graph derived from block references.
//!
//! Forward edges come straight from each block's `references`. Reverse edges
//! (`dependents`) are never patched in place: every registry mutation clears
//! them and rebuilds them from the current references.

use indexmap::{IndexMap, IndexSet};

use super::identifier::Identifier;
use super::registry::BlockRegistry;

/// Clears and recomputes `dependents` on every block in the registry.
///
/// For every block B and every identifier D that B references, B's identifier
/// is added to the dependents of each occurrence of D. References to
/// identifiers with no blocks contribute nothing.
pub fn rebuild_dependents(registry: &mut BlockRegistry) {
    let mut edges: Vec<(Identifier, Identifier)> = Vec::new();
    for block in registry.blocks() {
        for target in &block.references {
            if registry.contains(target) {
                edges.push((target.clone(), block.identifier().clone()));
            }
        }
    }

    for block in registry.blocks_mut() {
        block.dependents.clear();
    }

    for (target, dependent) in edges {
        if let Some(occurrences) = registry.lookup_mut(&target) {
            for block in occurrences {
                block.dependents.insert(dependent.clone());
            }
        }
    }

    tracing::trace!(blocks = registry.len(), "Rebuilt dependents");
}

/// Identifier-level view of the registry's reference edges.
///
/// Multiple occurrences of an identifier are merged: its dependencies are the
/// union of every occurrence's references, in first-mention order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Forward edges, keyed in registry order.
    dependencies: IndexMap<Identifier, IndexSet<Identifier>>,
    /// Reverse edges, restricted to defined targets.
    dependents: IndexMap<Identifier, IndexSet<Identifier>>,
}

impl DependencyGraph {
    /// Builds the identifier graph from the current registry state.
    pub fn from_registry(registry: &BlockRegistry) -> Self {
        let mut dependencies: IndexMap<Identifier, IndexSet<Identifier>> = IndexMap::new();
        let mut dependents: IndexMap<Identifier, IndexSet<Identifier>> = IndexMap::new();

        for identifier in registry.identifiers() {
            dependencies.entry(identifier.clone()).or_default();
            dependents.entry(identifier.clone()).or_default();
        }

        for block in registry.blocks() {
            let forward = dependencies.entry(block.identifier().clone()).or_default();
            for target in &block.references {
                forward.insert(target.clone());
            }
            for target in &block.references {
                if let Some(reverse) = dependents.get_mut(target) {
                    reverse.insert(block.identifier().clone());
                }
            }
        }

        Self {
            dependencies,
            dependents,
        }
    }

    /// Identifiers that `identifier` references, defined or not.
    pub fn dependencies(&self, identifier: &Identifier) -> Option<&IndexSet<Identifier>> {
        self.dependencies.get(identifier)
    }

    /// Identifiers whose blocks reference `identifier`.
    pub fn dependents(&self, identifier: &Identifier) -> Option<&IndexSet<Identifier>> {
        self.dependents.get(identifier)
    }

    /// Returns true if the identifier has blocks in the registry.
    pub fn is_defined(&self, identifier: &Identifier) -> bool {
        self.dependencies.contains_key(identifier)
    }

    /// Position of a defined identifier in registry order.
    pub fn index_of(&self, identifier: &Identifier) -> Option<usize> {
        self.dependencies.get_index_of(identifier)
    }

    /// Iterates over defined identifiers in registry order.
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.dependencies.keys()
    }

    /// References to identifiers that have no blocks, as (referrer, missing) pairs.
    pub fn undefined_references(&self) -> Vec<(&Identifier, &Identifier)> {
        self.dependencies
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
            .filter(|(_, to)| !self.is_defined(to))
            .collect()
    }

    /// Number of defined identifiers.
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Returns true if the graph has no identifiers.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}
