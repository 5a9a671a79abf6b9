//! Readers for fenced blocks and their attribute strings.

mod delimiters;
mod properties;

pub use delimiters::{scan_fences, Fence, FenceScanner};
pub use properties::{Properties, Property};
