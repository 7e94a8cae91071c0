//! Error types
//!
//! `ServeError` covers a single request and maps onto an HTTP status.
//! `StartupError` covers everything that stops the server from booting.

use hyper::{Method, StatusCode};
use std::path::PathBuf;
use thiserror::Error;

/// Terminal failure for one request
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("invalid request path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("index document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),

    #[error("failed to read '{}': {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ServeError {
    pub fn invalid_path(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPath { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Server-side failures, as opposed to bad client input
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

/// Failure while loading configuration or preparing the server
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("document root '{path}' is unusable: {reason}")]
    DocumentRoot { path: String, reason: String },

    #[error("invalid index document '{0}': must be a relative file name without '..'")]
    InvalidIndexDocument(String),

    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
