//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! static file responder.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;
pub mod security;

// Re-export commonly used types
pub use cache::{CachePolicy, CacheRule, CacheRules};
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_405_response, build_416_response, build_error_response,
    build_health_response,
};
pub use security::SecurityHeaders;
