//! Definition and references commands.

use std::io::Write;

use litgraph::errors::{LitgraphError, Result};
use litgraph::interface::Context;
use litgraph::Identifier;

use super::helpers::load_session;

/// Prints the location of the first occurrence of `identifier`.
pub async fn definition(ctx: &Context, identifier: &Identifier, out: &mut impl Write) -> Result<()> {
    let session = load_session(ctx).await?;
    let location = session
        .with_engine(|engine| engine.find_definition(identifier).cloned())
        .await
        .ok_or_else(|| LitgraphError::BlockNotFound(identifier.clone()))?;

    writeln!(out, "{}", location)?;
    Ok(())
}

/// Prints every definition and usage of `identifier`, one per line.
pub async fn references(ctx: &Context, identifier: &Identifier, out: &mut impl Write) -> Result<()> {
    let session = load_session(ctx).await?;
    let sites = session
        .with_engine(|engine| engine.find_references(identifier))
        .await;

    if sites.is_empty() {
        writeln!(out, "No references to {}.", identifier)?;
        return Ok(());
    }
    for site in sites {
        writeln!(out, "{}\t{}\t{}", site.location, site.kind, site.block)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::testing::{output, project};

    const DOC: &str = "\
# Greeting

``` {.python #greet}
Hello, <<name>>!
```

``` {.python #name}
World
```
";

    #[tokio::test]
    async fn test_definition() {
        let (_dir, ctx) = project(&[("greet.md", DOC)]);
        let mut buf = Vec::new();
        definition(&ctx, &Identifier::new("name"), &mut buf).await.unwrap();

        assert_eq!(output(buf), "greet.md:7:15\n");
    }

    #[tokio::test]
    async fn test_definition_missing() {
        let (_dir, ctx) = project(&[("greet.md", DOC)]);
        let mut buf = Vec::new();
        assert!(definition(&ctx, &Identifier::new("zzz"), &mut buf)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_references() {
        let (_dir, ctx) = project(&[("greet.md", DOC)]);
        let mut buf = Vec::new();
        references(&ctx, &Identifier::new("name"), &mut buf).await.unwrap();

        let text = output(buf);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "greet.md:7:15\tdefinition\tname[0]");
        assert_eq!(lines[1], "greet.md:4:8\tusage\tgreet[0]");
    }

    #[tokio::test]
    async fn test_no_references() {
        let (_dir, ctx) = project(&[("greet.md", DOC)]);
        let mut buf = Vec::new();
        references(&ctx, &Identifier::new("zzz"), &mut buf).await.unwrap();
        assert_eq!(output(buf), "No references to zzz.\n");
    }
}
