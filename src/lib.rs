//! Static file server for single-page applications.
//!
//! Serves files from a document root, falls back to the index document for
//! paths that do not name a file so client-side routers can take over,
//! marks fingerprinted assets as cacheable, and attaches baseline security
//! headers to every response.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
