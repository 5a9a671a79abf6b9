//! Cycles command implementation.

use std::io::Write;

use litgraph::errors::Result;
use litgraph::interface::Context;

use super::helpers::load_session;

/// Prints every circular reference, one per line.
pub async fn cycles(ctx: &Context, out: &mut impl Write) -> Result<()> {
    let session = load_session(ctx).await?;
    let cycles = session
        .with_engine(|engine| engine.find_circular_references())
        .await;

    if cycles.is_empty() {
        writeln!(out, "No circular references.")?;
    }
    for cycle in cycles {
        writeln!(out, "{}", cycle)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::testing::{output, project};

    #[tokio::test]
    async fn test_lists_cycles() {
        let (_dir, ctx) = project(&[(
            "a.md",
            "``` {#a}\n<<b>>\n```\n``` {#b}\n<<c>>\n```\n``` {#c}\n<<a>>\n```\n``` {#self}\n<<self>>\n```\n",
        )]);
        let mut buf = Vec::new();
        cycles(&ctx, &mut buf).await.unwrap();

        assert_eq!(output(buf), "a -> b -> c -> a\nself -> self\n");
    }

    #[tokio::test]
    async fn test_no_cycles() {
        let (_dir, ctx) = project(&[("a.md", "``` {#a}\n1\n```\n")]);
        let mut buf = Vec::new();
        cycles(&ctx, &mut buf).await.unwrap();
        assert_eq!(output(buf), "No circular references.\n");
    }
}
