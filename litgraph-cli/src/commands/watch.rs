//! Watch command implementation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use litgraph::errors::{LitgraphError, Result};
use litgraph::extract::Extractor;
use litgraph::interface::{Context, Session};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::helpers::load_session;

/// Options for the watch command.
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    /// Debounce delay in milliseconds.
    pub debounce_ms: u64,
}

/// Source documents touched by a batch of events, relative to the base directory.
fn changed_sources(ctx: &Context, events: &[Event]) -> BTreeSet<PathBuf> {
    events
        .iter()
        .flat_map(|event| event.paths.iter())
        .filter(|path| ctx.is_source(path))
        .map(|path| {
            path.strip_prefix(&ctx.base_dir)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.clone())
        })
        .collect()
}

/// Re-parses changed documents and forgets deleted ones.
async fn apply_changes(
    ctx: &Context,
    session: &Session<Extractor>,
    paths: &BTreeSet<PathBuf>,
) -> Result<()> {
    for path in paths {
        if ctx.resolve_path(path).is_file() {
            tracing::info!("Re-parsing {}", path.display());
            if let Err(e) = ctx.load_file(session, path).await {
                tracing::warn!("Failed to parse {}: {}", path.display(), e);
            }
        } else {
            tracing::info!("Removed {}", path.display());
            session.close_document(&ctx.document_id(path)).await;
        }
    }

    let cycles = session
        .with_engine(|engine| engine.last_cycles().len())
        .await;
    if cycles > 0 {
        tracing::warn!("{} circular reference(s) present", cycles);
    }
    Ok(())
}

/// Executes the watch command.
pub async fn watch(ctx: &Context, options: WatchOptions) -> Result<()> {
    let debounce = Duration::from_millis(options.debounce_ms);
    if !ctx.config.watch.exclude.is_empty() {
        tracing::debug!("Exclude patterns: {:?}", ctx.config.watch.exclude);
    }

    let session = load_session(ctx).await?;
    let blocks = session.with_engine(|engine| engine.registry().len()).await;
    println!(
        "Watching for changes (debounce: {}ms, {} blocks loaded)...",
        options.debounce_ms, blocks
    );
    println!("Press Ctrl+C to stop.");

    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        Config::default().with_poll_interval(debounce),
    )
    .map_err(|e| LitgraphError::Watch(e.to_string()))?;

    watcher
        .watch(&ctx.base_dir, RecursiveMode::Recursive)
        .map_err(|e| LitgraphError::Watch(e.to_string()))?;

    // Event loop
    while let Some(first) = rx.recv().await {
        let mut batch = vec![first];
        // Collect everything that arrives within the debounce window.
        while let Ok(Some(event)) = tokio::time::timeout(debounce, rx.recv()).await {
            batch.push(event);
        }

        let paths = changed_sources(ctx, &batch);
        if !paths.is_empty() {
            tracing::debug!("Files changed: {:?}", paths);
            apply_changes(ctx, &session, &paths).await?;
        }
    }

    Err(LitgraphError::Watch("watcher stopped".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::testing::project;
    use litgraph::Identifier;
    use notify::EventKind;
    use std::fs;

    fn event(paths: Vec<PathBuf>) -> Event {
        let mut event = Event::new(EventKind::Any);
        event.paths = paths;
        event
    }

    #[test]
    fn test_changed_sources_filters_and_dedups() {
        let (dir, mut ctx) = project(&[]);
        ctx.config.watch.exclude = vec!["build/**".to_string()];
        let events = vec![
            event(vec![dir.path().join("a.md"), dir.path().join("notes.txt")]),
            event(vec![dir.path().join("a.md"), dir.path().join("build/x.md")]),
        ];

        let changed = changed_sources(&ctx, &events);
        assert_eq!(changed.into_iter().collect::<Vec<_>>(), vec![PathBuf::from("a.md")]);
    }

    #[tokio::test]
    async fn test_apply_changes_reparses_and_removes() {
        let (dir, ctx) = project(&[
            ("a.md", "``` {#main}\n<<lib>>\n```\n"),
            ("b.md", "``` {#lib}\nv1\n```\n"),
        ]);
        let session = load_session(&ctx).await.unwrap();

        fs::write(dir.path().join("b.md"), "``` {#lib}\nv2\n```\n").unwrap();
        let changed: BTreeSet<PathBuf> = [PathBuf::from("b.md")].into_iter().collect();
        apply_changes(&ctx, &session, &changed).await.unwrap();

        let expanded = session
            .with_engine(|engine| engine.get_expanded_content(&Identifier::new("main")))
            .await
            .unwrap();
        assert_eq!(expanded, "v2\n\n");

        fs::remove_file(dir.path().join("b.md")).unwrap();
        apply_changes(&ctx, &session, &changed).await.unwrap();

        let expanded = session
            .with_engine(|engine| engine.get_expanded_content(&Identifier::new("main")))
            .await
            .unwrap();
        assert_eq!(expanded, "<<lib not found>>\n");
    }
}
