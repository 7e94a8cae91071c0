//! Request handler module
//!
//! Request dispatch plus the static file responder with SPA fallback.

pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
pub use static_files::{StaticRequest, StaticResponder};
