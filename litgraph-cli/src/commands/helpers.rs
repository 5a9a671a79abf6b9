//! Shared command helpers.

use litgraph::errors::Result;
use litgraph::extract::Extractor;
use litgraph::interface::{Context, Session};

/// Creates a session and parses every source document into it.
pub async fn load_session(ctx: &Context) -> Result<Session<Extractor>> {
    let session = ctx.session();
    let loaded = ctx.load_all(&session).await?;
    tracing::debug!(loaded, "Documents parsed");
    Ok(session)
}
