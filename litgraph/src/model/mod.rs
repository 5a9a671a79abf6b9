//! Core model types: blocks, the registry, the dependency graph, cycle
//! detection and expansion.

mod block;
mod block_id;
mod cycles;
mod expand;
mod graph;
mod identifier;
mod markers;
mod registry;

pub use block::Block;
pub use block_id::BlockId;
pub use cycles::{find_cycles, Cycle};
pub use expand::{expand, expanded_content, ExpansionPath};
pub use graph::{rebuild_dependents, DependencyGraph};
pub use identifier::{DocumentId, Identifier};
pub use markers::{
    circular_marker, find_markers, not_found_marker, scan_references, MarkerMatch, REF_PATTERN,
};
pub use registry::BlockRegistry;
