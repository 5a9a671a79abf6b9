//! Check command implementation.

use std::io::Write;

use litgraph::errors::{LitgraphError, Result};
use litgraph::interface::Context;

use super::helpers::load_session;

/// Options for the check command.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Fail when the registry contains circular references.
    pub deny_cycles: bool,
}

/// Parses every document, then reports undefined references and cycles.
pub async fn check(ctx: &Context, options: CheckOptions, out: &mut impl Write) -> Result<()> {
    let session = load_session(ctx).await?;

    let (summary, undefined, cycles) = session
        .with_engine(|engine| {
            let registry = engine.registry();
            let graph = engine.graph();
            let summary = format!(
                "{} documents, {} identifiers, {} blocks",
                registry.documents().count(),
                graph.len(),
                registry.len()
            );
            let undefined: Vec<String> = graph
                .undefined_references()
                .into_iter()
                .map(|(from, to)| format!("{} references undefined <<{}>>", from, to))
                .collect();
            (summary, undefined, engine.find_circular_references())
        })
        .await;

    writeln!(out, "{}", summary)?;
    for line in &undefined {
        writeln!(out, "warning: {}", line)?;
    }
    for cycle in &cycles {
        writeln!(out, "warning: circular reference {}", cycle)?;
    }
    if undefined.is_empty() && cycles.is_empty() {
        writeln!(out, "No problems found.")?;
    }

    if options.deny_cycles {
        if let Some(cycle) = cycles.into_iter().next() {
            let mut path = cycle.path;
            path.push(cycle.start);
            return Err(LitgraphError::CircularReference(path));
        }
    }

    Ok(())
}
