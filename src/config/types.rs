// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    /// Listen port (8000 or 80 depending on deployment)
    pub port: u16,
    pub workers: Option<usize>,
}

/// Static site configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Directory tree that is the sole source of servable content
    pub document_root: String,
    /// Fallback document for SPA routing and directory requests
    pub index_document: String,
    pub cache_max_age_seconds: u64,
    pub cache_immutable: bool,
    #[serde(default = "default_cached_extensions")]
    pub cached_extensions: Vec<String>,
    /// Ordered cache rules, evaluated first-match.
    /// When empty, a single rule is built from the three fields above.
    #[serde(default)]
    pub cache_rules: Vec<CacheRuleConfig>,
}

/// A single cache rule as written in the config file
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CacheRuleConfig {
    pub extensions: Vec<String>,
    pub max_age_seconds: u64,
    #[serde(default)]
    pub immutable: bool,
}

pub fn default_cached_extensions() -> Vec<String> {
    [
        "css", "js", "png", "jpg", "jpeg", "gif", "ico", "svg", "woff", "woff2",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    pub backlog: i32,
    /// Seconds to wait for in-flight connections on shutdown
    pub shutdown_timeout: u64,
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Disabled by default so the SPA fallback owns every path
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_health_path")]
    pub path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_path() -> String {
    "/healthz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_health_path(),
        }
    }
}
