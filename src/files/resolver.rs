use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::http::response::StatusCode;

/// Resolves request URIs against the document root.
///
/// Resolution works on raw URI bytes; no percent-decoding is applied.
/// Traversal attempts are rejected by canonicalizing the target and
/// requiring the canonical root as a component-wise prefix, rather than by
/// rewriting the URI text.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    index: String,
}

impl Resolver {
    pub fn new(root: PathBuf, index: String) -> Self {
        Self { root, index }
    }

    /// Maps a raw URI to a canonical path inside the document root.
    ///
    /// # Errors
    ///
    /// - `500` if the document root itself cannot be canonicalized
    /// - `404` if the target does not exist
    /// - `403` if the canonical target escapes the root or is not a
    ///   regular file
    pub fn resolve(&self, uri: &str) -> Result<PathBuf, StatusCode> {
        tracing::debug!(uri = %uri, "Resolving request target");

        let root = fs::canonicalize(&self.root).map_err(|e| {
            tracing::error!(root = %self.root.display(), error = %e, "Invalid document root");
            StatusCode::InternalServerError
        })?;

        let target = if uri.is_empty() || uri == "/" {
            root.join(&self.index)
        } else {
            root.join(uri.trim_start_matches('/'))
        };

        let resolved = fs::canonicalize(&target).map_err(|_| {
            tracing::debug!(path = %target.display(), "Failed to resolve path");
            StatusCode::NotFound
        })?;

        if !resolved.starts_with(&root) {
            tracing::warn!(path = %resolved.display(), "Directory traversal detected");
            return Err(StatusCode::Forbidden);
        }

        let meta = fs::metadata(&resolved).map_err(|_| StatusCode::NotFound)?;
        if !meta.is_file() {
            tracing::debug!(path = %resolved.display(), "Not a regular file");
            return Err(StatusCode::Forbidden);
        }

        Ok(resolved)
    }

    /// Reads a resolved file fully into memory, mapping filesystem errors
    /// to the status the client should see.
    pub fn read(&self, path: &Path) -> Result<Vec<u8>, StatusCode> {
        fs::read(path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to read file");
            match e.kind() {
                io::ErrorKind::NotFound => StatusCode::NotFound,
                io::ErrorKind::PermissionDenied => StatusCode::Forbidden,
                _ => StatusCode::InternalServerError,
            }
        })
    }
}
