use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

/// Server configuration, loaded from the environment with defaults.
///
/// - `PORT` - listening port (default 60001)
/// - `DOCUMENT_ROOT` - directory served files must live under (default `./www`)
/// - `INDEX_FILE` - file served for `/` (default `index.html`)
/// - `WORKERS` - worker thread count, 0 handles connections on the acceptor
///   thread (default 4)
/// - `DEBUG` - `1` or `true` enables debug-level logging
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub root: PathBuf,
    pub index: String,
    pub workers: usize,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 60001,
            root: PathBuf::from("./www"),
            index: "index.html".to_string(),
            workers: 4,
            debug: false,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .context("PORT must be a number between 1 and 65535")?,
            Err(_) => defaults.port,
        };

        let root = std::env::var("DOCUMENT_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.root);

        let index = std::env::var("INDEX_FILE").unwrap_or(defaults.index);

        let workers = match std::env::var("WORKERS") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .context("WORKERS must be a non-negative number")?,
            Err(_) => defaults.workers,
        };

        let debug = std::env::var("DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.debug);

        Ok(Self {
            port,
            root,
            index,
            workers,
            debug,
        })
    }

    /// Checks the configured values against the filesystem.
    ///
    /// The document root must exist and be a directory; the index file must
    /// exist under it, be a regular file, and carry an extension.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            bail!("Port must be between 1 and 65535");
        }

        let root_meta = fs::metadata(&self.root)
            .with_context(|| format!("Document root does not exist: {}", self.root.display()))?;
        if !root_meta.is_dir() {
            bail!("Document root is not a directory: {}", self.root.display());
        }

        if self.index.is_empty() {
            bail!("Index file name cannot be empty");
        }
        let has_extension = Path::new(&self.index)
            .extension()
            .map(|ext| !ext.is_empty())
            .unwrap_or(false);
        if !has_extension {
            bail!("Index file must have an extension: {}", self.index);
        }

        let index_path = self.root.join(&self.index);
        let index_meta = fs::metadata(&index_path)
            .with_context(|| format!("Index file does not exist: {}", index_path.display()))?;
        if !index_meta.is_file() {
            bail!("Index file is not a regular file: {}", index_path.display());
        }

        Ok(())
    }

    pub fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
