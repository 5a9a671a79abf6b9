//! High-level interface: the engine, shared sessions and project context.

mod context;
mod engine;
mod session;

pub use context::Context;
pub use engine::{Engine, ParseReport, ReferenceKind, ReferenceSite};
pub use session::{ParseOutcome, Session};
