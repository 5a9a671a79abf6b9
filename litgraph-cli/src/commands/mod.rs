//! CLI command implementations.

mod blocks;
mod check;
mod cycles;
mod expand;
mod helpers;
mod navigate;
mod watch;

pub use blocks::blocks;
pub use check::{check, CheckOptions};
pub use cycles::cycles;
pub use expand::expand;
pub use navigate::{definition, references};
pub use watch::{watch, WatchOptions};
