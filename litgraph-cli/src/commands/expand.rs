//! Expand command implementation.

use std::io::Write;

use litgraph::errors::Result;
use litgraph::interface::Context;
use litgraph::Identifier;

use super::helpers::load_session;

/// Prints the expanded content of `identifier`.
pub async fn expand(ctx: &Context, identifier: &Identifier, out: &mut impl Write) -> Result<()> {
    let session = load_session(ctx).await?;
    let content = session
        .with_engine(|engine| engine.get_expanded_content(identifier))
        .await?;
    write!(out, "{}", content)?;
    Ok(())
}
