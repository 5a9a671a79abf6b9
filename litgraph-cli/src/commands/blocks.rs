//! Blocks command implementation.

use std::io::Write;

use litgraph::errors::Result;
use litgraph::interface::Context;

use super::helpers::load_session;

/// Prints every block with its language, location and dependencies.
pub async fn blocks(ctx: &Context, out: &mut impl Write) -> Result<()> {
    let session = load_session(ctx).await?;
    let lines: Vec<String> = session
        .with_engine(|engine| {
            engine
                .registry()
                .blocks()
                .map(|block| {
                    let deps: Vec<&str> =
                        block.dependencies().iter().map(|id| id.as_str()).collect();
                    format!(
                        "{}\t{}\t{}\t{}",
                        block.id,
                        block.language.as_deref().unwrap_or("-"),
                        block.location,
                        deps.join(", ")
                    )
                })
                .collect()
        })
        .await;

    for line in lines {
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::testing::{output, project};

    #[tokio::test]
    async fn test_lists_blocks_in_registry_order() {
        let (_dir, ctx) = project(&[(
            "a.md",
            "``` {.py #main}\n<<x>>\n<<y>>\n```\n``` {#x}\n1\n```\n``` {.py #main}\nmore\n```\n",
        )]);
        let mut buf = Vec::new();
        blocks(&ctx, &mut buf).await.unwrap();

        assert_eq!(
            output(buf),
            "main[0]\tpy\ta.md:1:11\tx, y\nmain[1]\tpy\ta.md:8:11\nx[0]\t-\ta.md:5:7\n"
        );
    }
}
