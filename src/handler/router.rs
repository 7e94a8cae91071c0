//! Request dispatch module
//!
//! Entry point for HTTP request processing: health check, static responder,
//! and access logging.

use crate::config::AppState;
use crate::handler::static_files::StaticRequest;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{IF_NONE_MATCH, RANGE, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let method = &parts.method;
    let path = parts.uri.path();
    let headers = &parts.headers;

    let response = if is_health_check(&state, method, path) {
        let mut resp = health_response(*method == Method::HEAD);
        state.responder.security_headers().apply(resp.headers_mut());
        resp
    } else {
        let static_req = StaticRequest {
            method,
            path,
            if_none_match: header_str(headers, &IF_NONE_MATCH),
            range: header_str(headers, &RANGE),
        };
        state.responder.respond(&static_req).await
    };

    if state.access_log() {
        log_access(&parts, &response, &state, peer_addr, started);
    }

    Ok(response)
}

fn is_health_check(state: &AppState, method: &Method, path: &str) -> bool {
    let health = &state.config.health;
    health.enabled && path == health.path && matches!(*method, Method::GET | Method::HEAD)
}

fn health_response(is_head: bool) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "status": "alive",
        "ts": chrono::Utc::now().to_rfc3339(),
    });
    http::build_health_response(body.to_string(), is_head)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &hyper::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn log_access(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    state: &AppState,
    peer_addr: SocketAddr,
    started: Instant,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_str(&req.headers, &REFERER).map(ToString::to_string);
    entry.user_agent = header_str(&req.headers, &USER_AGENT).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
