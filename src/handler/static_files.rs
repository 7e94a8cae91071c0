//! Static file serving module
//!
//! The responder: given a method and path, produce a complete response with
//! cache and security headers attached.

use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CACHE_CONTROL, EXPIRES};
use hyper::{Method, Response};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use super::resolve::{self, Resolved};
use crate::config::SiteConfig;
use crate::error::{ServeError, StartupError};
use crate::http::range::RangeParseResult;
use crate::http::{self, cache, mime, CachePolicy, CacheRules, SecurityHeaders};
use crate::logger;

/// Inbound request as seen by the responder
#[derive(Debug, Clone, Copy)]
pub struct StaticRequest<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub if_none_match: Option<&'a str>,
    pub range: Option<&'a str>,
}

impl<'a> StaticRequest<'a> {
    pub const fn new(method: &'a Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            if_none_match: None,
            range: None,
        }
    }
}

/// Serves files from one document root with SPA fallback
#[derive(Debug)]
pub struct StaticResponder {
    root: PathBuf,
    index_document: String,
    cache_rules: CacheRules,
    security: SecurityHeaders,
}

impl StaticResponder {
    /// Build a responder from the site configuration.
    ///
    /// The document root must exist, be a directory and be listable.
    pub fn new(site: &SiteConfig) -> Result<Self, StartupError> {
        let root = open_document_root(&site.document_root)?;
        let index_document = validate_index_document(&site.index_document)?;

        if !root.join(&index_document).is_file() {
            logger::log_warning(&format!(
                "Index document '{}' not found in {}; unmatched paths will return 404",
                index_document,
                root.display()
            ));
        }

        Ok(Self {
            root,
            index_document,
            cache_rules: CacheRules::from_site(site),
            security: SecurityHeaders::default(),
        })
    }

    /// Canonical document root
    pub fn document_root(&self) -> &Path {
        &self.root
    }

    pub fn index_document(&self) -> &str {
        &self.index_document
    }

    pub const fn cache_rules(&self) -> &CacheRules {
        &self.cache_rules
    }

    pub const fn security_headers(&self) -> &SecurityHeaders {
        &self.security
    }

    pub async fn respond(&self, req: &StaticRequest<'_>) -> Response<Full<Bytes>> {
        self.respond_at(req, Utc::now()).await
    }

    /// Same as [`respond`](Self::respond) with an explicit clock for `Expires`
    pub async fn respond_at(
        &self,
        req: &StaticRequest<'_>,
        now: DateTime<Utc>,
    ) -> Response<Full<Bytes>> {
        let mut response = match self.serve(req, now).await {
            Ok(response) => response,
            Err(err) => {
                if err.is_server_error() {
                    logger::log_error(&err.to_string());
                } else {
                    logger::log_warning(&err.to_string());
                }
                error_response(&err)
            }
        };
        self.security.apply(response.headers_mut());
        response
    }

    async fn serve(
        &self,
        req: &StaticRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<Response<Full<Bytes>>, ServeError> {
        // Method check comes first so 405 wins over any path error
        if !matches!(*req.method, Method::GET | Method::HEAD) {
            return Err(ServeError::MethodNotAllowed(req.method.clone()));
        }
        let is_head = *req.method == Method::HEAD;

        let relative = resolve::normalize_request_path(req.path)?;
        let resolved = resolve::resolve(&self.root, &self.index_document, &relative).await?;
        if let Resolved::Fallback(_) = resolved {
            logger::log_debug(&format!("SPA fallback for {}", req.path));
        }

        let path = resolved.path();
        let data = Bytes::from(
            fs::read(path)
                .await
                .map_err(|e| ServeError::storage(path, e))?,
        );

        let extension = path.extension().and_then(|e| e.to_str());
        let content_type = mime::get_content_type(extension);
        let etag = cache::generate_etag(&data);

        let mut response = if cache::check_etag_match(req.if_none_match, &etag) {
            http::build_304_response(&etag)
        } else {
            match http::parse_range_header(req.range, data.len()) {
                RangeParseResult::Valid(range) => http::response::build_partial_response(
                    &data,
                    range,
                    content_type,
                    &etag,
                    is_head,
                ),
                RangeParseResult::NotSatisfiable => return Ok(http::build_416_response(data.len())),
                RangeParseResult::None => {
                    http::response::build_file_response(data, content_type, &etag, is_head)
                }
            }
        };

        if let Some(policy) = self.cache_rules.lookup(extension) {
            apply_cache_headers(&mut response, policy, now);
        }

        Ok(response)
    }
}

fn apply_cache_headers(response: &mut Response<Full<Bytes>>, policy: CachePolicy, now: DateTime<Utc>) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&policy.to_header_value()) {
        headers.insert(CACHE_CONTROL, value);
    }
    if let Ok(value) = HeaderValue::from_str(&policy.expires_at(now)) {
        headers.insert(EXPIRES, value);
    }
}

fn error_response(err: &ServeError) -> Response<Full<Bytes>> {
    match err {
        ServeError::MethodNotAllowed(_) => http::build_405_response(),
        _ => http::build_error_response(err.status()),
    }
}

fn open_document_root(configured: &str) -> Result<PathBuf, StartupError> {
    let unusable = |reason: String| StartupError::DocumentRoot {
        path: configured.to_string(),
        reason,
    };

    let root = Path::new(configured)
        .canonicalize()
        .map_err(|e| unusable(e.to_string()))?;
    if !root.is_dir() {
        return Err(unusable("not a directory".to_string()));
    }
    std::fs::read_dir(&root).map_err(|e| unusable(format!("not readable: {e}")))?;

    Ok(root)
}

fn validate_index_document(index: &str) -> Result<String, StartupError> {
    let path = Path::new(index);
    let plain = !index.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if plain {
        Ok(index.to_string())
    } else {
        Err(StartupError::InvalidIndexDocument(index.to_string()))
    }
}
