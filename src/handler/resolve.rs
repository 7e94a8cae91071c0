//! Request path resolution
//!
//! Turns a raw request path into a file under the document root, applying
//! the directory-index and SPA fallback rules.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::ServeError;

/// Outcome of path resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The request path named this file (directly or via its directory index)
    File(PathBuf),
    /// Nothing matched; the root index document is served instead
    Fallback(PathBuf),
}

impl Resolved {
    pub fn path(&self) -> &Path {
        match self {
            Self::File(p) | Self::Fallback(p) => p,
        }
    }

    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Validate and normalize a request path into a path relative to the root.
///
/// The path is percent-decoded once. Null bytes, `..` segments (with either
/// separator) and anything that is not a plain name are rejected before the
/// filesystem is touched. An empty result means the root itself.
pub fn normalize_request_path(raw: &str) -> Result<PathBuf, ServeError> {
    if raw.contains('\0') {
        return Err(ServeError::invalid_path(raw, "null byte"));
    }

    let decoded = percent_encoding::percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| ServeError::invalid_path(raw, "not valid UTF-8"))?;

    if decoded.contains('\0') {
        return Err(ServeError::invalid_path(raw, "null byte"));
    }

    let mut relative = PathBuf::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return Err(ServeError::invalid_path(raw, "parent directory segment")),
            name => relative.push(name),
        }
    }

    // Catches drive prefixes and other platform-specific roots
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(ServeError::invalid_path(raw, "not a plain relative path"));
    }

    Ok(relative)
}

/// Resolve a normalized relative path against `root`.
///
/// `root` must already be canonical. The chosen file is canonicalized and
/// must stay inside `root`, so symlinks cannot escape it.
pub async fn resolve(root: &Path, index: &str, relative: &Path) -> Result<Resolved, ServeError> {
    let candidate = root.join(relative);

    let resolved = match regular_file(&candidate).await? {
        Some(FileKind::File) => Some(Resolved::File(candidate)),
        Some(FileKind::Dir) => {
            let index_path = candidate.join(index);
            match regular_file(&index_path).await? {
                Some(FileKind::File) => Some(Resolved::File(index_path)),
                _ => None,
            }
        }
        None => None,
    };

    let resolved = match resolved {
        Some(r) => r,
        None => {
            let index_path = root.join(index);
            match regular_file(&index_path).await? {
                Some(FileKind::File) => Resolved::Fallback(index_path),
                _ => return Err(ServeError::NotFound(index_path)),
            }
        }
    };

    ensure_contained(root, resolved).await
}

enum FileKind {
    File,
    Dir,
}

/// Stat a path, treating "does not exist" as `None`
async fn regular_file(path: &Path) -> Result<Option<FileKind>, ServeError> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(Some(FileKind::File)),
        Ok(meta) if meta.is_dir() => Ok(Some(FileKind::Dir)),
        // Sockets, fifos and devices are never served
        Ok(_) => Ok(None),
        Err(e) if is_missing(&e) => Ok(None),
        Err(e) => Err(ServeError::storage(path, e)),
    }
}

/// Errors that mean the request named no file, not that the disk failed.
///
/// `/app.js/extra` fails with `NotADirectory`; a segment over the
/// filesystem's name limit fails with `InvalidFilename`.
fn is_missing(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::NotFound | ErrorKind::NotADirectory | ErrorKind::InvalidFilename
    )
}

async fn ensure_contained(root: &Path, resolved: Resolved) -> Result<Resolved, ServeError> {
    let canonical = fs::canonicalize(resolved.path())
        .await
        .map_err(|e| ServeError::storage(resolved.path(), e))?;

    if !canonical.starts_with(root) {
        return Err(ServeError::invalid_path(
            &resolved.path().display().to_string(),
            "resolves outside the document root",
        ));
    }

    Ok(match resolved {
        Resolved::File(_) => Resolved::File(canonical),
        Resolved::Fallback(_) => Resolved::Fallback(canonical),
    })
}
