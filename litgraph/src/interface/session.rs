//! Shared, async access to an engine.
//!
//! Parsing is split so the engine lock is never held while an extractor
//! runs: the session records a generation for the document, extracts with no
//! lock held, then applies the result only if no newer parse of the same
//! document started in the meantime.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::errors::Result;
use crate::extract::{BlockExtractor, ExtractionCache, Extractor};
use crate::model::DocumentId;

use super::engine::{Engine, ParseReport};

/// Outcome of [`Session::parse_document`].
#[derive(Debug)]
pub enum ParseOutcome {
    /// The extraction was applied to the registry.
    Applied(ParseReport),
    /// A newer parse of the same document started first; nothing changed.
    Superseded,
}

impl ParseOutcome {
    pub fn is_superseded(&self) -> bool {
        matches!(self, ParseOutcome::Superseded)
    }

    pub fn report(&self) -> Option<&ParseReport> {
        match self {
            ParseOutcome::Applied(report) => Some(report),
            ParseOutcome::Superseded => None,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    engine: Engine,
    cache: ExtractionCache,
    generations: HashMap<DocumentId, u64>,
}

impl SessionState {
    fn next_generation(&mut self, document: &DocumentId) -> u64 {
        let generation = self.generations.entry(document.clone()).or_insert(0);
        *generation += 1;
        *generation
    }

    fn is_current(&self, document: &DocumentId, generation: u64) -> bool {
        self.generations.get(document) == Some(&generation)
    }
}

/// An engine shared between tasks, paired with an extractor and a cache.
#[derive(Debug)]
pub struct Session<E = Extractor> {
    state: Arc<Mutex<SessionState>>,
    extractor: Arc<E>,
}

impl<E> Clone for Session<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            extractor: Arc::clone(&self.extractor),
        }
    }
}

impl<E: BlockExtractor> Session<E> {
    /// Creates a session with an empty engine and a cache of
    /// `cache_capacity` extraction results.
    pub fn new(extractor: E, cache_capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                engine: Engine::new(),
                cache: ExtractionCache::new(cache_capacity),
                generations: HashMap::new(),
            })),
            extractor: Arc::new(extractor),
        }
    }

    /// Extracts and registers `text` as the new content of `document`.
    ///
    /// On extraction failure the document keeps its previous blocks.
    pub async fn parse_document(&self, document: &DocumentId, text: &str) -> Result<ParseOutcome> {
        let (generation, cached) = {
            let mut state = self.state.lock().await;
            let generation = state.next_generation(document);
            (generation, state.cache.get(text))
        };

        let fresh = cached.is_none();
        let extracted = match cached {
            Some(raw) => {
                tracing::trace!(%document, "Extraction cache hit");
                Ok(raw)
            }
            None => self.extractor.extract(text).await,
        };

        let mut state = self.state.lock().await;
        if !state.is_current(document, generation) {
            tracing::debug!(%document, generation, "Discarding superseded parse");
            return Ok(ParseOutcome::Superseded);
        }

        let raw = match extracted {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(%document, "Extraction failed: {}", e);
                return Err(e);
            }
        };
        if fresh {
            state.cache.insert(text, raw.clone());
        }

        Ok(ParseOutcome::Applied(
            state.engine.parse_document(document, text, raw),
        ))
    }

    /// Forgets a document; in-flight parses of it are discarded.
    pub async fn close_document(&self, document: &DocumentId) -> usize {
        let mut state = self.state.lock().await;
        state.next_generation(document);
        state.engine.close_document(document)
    }

    /// Runs `f` with read access to the engine.
    pub async fn with_engine<R>(&self, f: impl FnOnce(&Engine) -> R) -> R {
        let state = self.state.lock().await;
        f(&state.engine)
    }

    /// Drops the registry, the cycle log and the extraction cache.
    pub async fn clear_cache(&self) {
        let mut state = self.state.lock().await;
        state.engine.clear_cache();
        state.cache.clear();
    }

    /// The latest parse generation started for `document`.
    pub async fn generation(&self, document: &DocumentId) -> u64 {
        let state = self.state.lock().await;
        state.generations.get(document).copied().unwrap_or(0)
    }
}
