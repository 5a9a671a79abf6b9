//! Project context: configuration and source discovery for a directory.

use std::path::{Path, PathBuf};

use crate::config::{read_config, read_config_file, Config};
use crate::errors::Result;
use crate::extract::Extractor;
use crate::model::DocumentId;

use super::session::Session;

/// A directory of literate documents and its configuration.
#[derive(Debug, Clone)]
pub struct Context {
    /// Configuration.
    pub config: Config,
    /// Base directory for source patterns.
    pub base_dir: PathBuf,
}

impl Context {
    /// Creates a new context with the given configuration.
    pub fn new(config: Config, base_dir: PathBuf) -> Self {
        Self { config, base_dir }
    }

    /// Creates a context with default configuration.
    pub fn default_for_dir(base_dir: PathBuf) -> Self {
        Self::new(Config::default(), base_dir)
    }

    /// Loads the configuration for `base_dir`, from `config_path` when
    /// given, otherwise by searching upwards.
    pub fn load(base_dir: PathBuf, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => read_config_file(path)?,
            None => read_config(&base_dir)?,
        };
        Ok(Self::new(config, base_dir))
    }

    /// Returns source file paths matching the configured patterns, relative
    /// to the base directory, sorted and deduplicated.
    pub fn source_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for pattern in &self.config.source_patterns {
            let full_pattern = self.base_dir.join(pattern);
            for entry in glob::glob(&full_pattern.to_string_lossy())? {
                match entry {
                    Ok(path) if path.is_file() => files.push(
                        path.strip_prefix(&self.base_dir)
                            .map(Path::to_path_buf)
                            .unwrap_or(path),
                    ),
                    Ok(_) => {}
                    Err(e) => tracing::debug!("Skipping unreadable path: {}", e),
                }
            }
        }
        files.retain(|path| !self.is_excluded(path));
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Returns true if a path matches one of the watch exclusions.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.base_dir).unwrap_or(path);
        self.config.watch.exclude.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches_path(relative))
                .unwrap_or(false)
        })
    }

    /// Returns true if a path is a source document of this project.
    pub fn is_source(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.base_dir).unwrap_or(path);
        !self.is_excluded(relative)
            && self.config.source_patterns.iter().any(|pattern| {
                glob::Pattern::new(pattern)
                    .map(|p| p.matches_path(relative))
                    .unwrap_or(false)
            })
    }

    /// Resolves a path relative to the base directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// The document id for a source path: the path relative to the base
    /// directory.
    pub fn document_id(&self, path: &Path) -> DocumentId {
        DocumentId::from_path(path.strip_prefix(&self.base_dir).unwrap_or(path))
    }

    /// Creates a session using the configured extractor and cache size.
    pub fn session(&self) -> Session<Extractor> {
        Session::new(
            Extractor::from_config(&self.config),
            self.config.cache_capacity,
        )
    }

    /// Reads and parses one source file into the session.
    pub async fn load_file(&self, session: &Session<Extractor>, path: &Path) -> Result<()> {
        let text = tokio::fs::read_to_string(self.resolve_path(path)).await?;
        session
            .parse_document(&self.document_id(path), &text)
            .await?;
        Ok(())
    }

    /// Parses every source file. Extraction failures are logged and the
    /// file is skipped.
    pub async fn load_all(&self, session: &Session<Extractor>) -> Result<usize> {
        let files = self.source_files()?;
        let mut loaded = 0;
        for path in &files {
            match self.load_file(session, path).await {
                Ok(()) => loaded += 1,
                Err(e) => tracing::warn!(path = %path.display(), "Skipping document: {}", e),
            }
        }
        tracing::debug!(loaded, total = files.len(), "Loaded documents");
        Ok(loaded)
    }
}
