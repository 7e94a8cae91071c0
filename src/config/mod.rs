// Configuration module entry point
// Loads the immutable startup configuration and the shared application state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{
    default_cached_extensions, CacheRuleConfig, Config, HealthConfig, LoggingConfig,
    PerformanceConfig, ServerConfig, SiteConfig,
};

/// Environment variable prefix, e.g. `SPA_SERVER__PORT=80`
const ENV_PREFIX: &str = "SPA";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, StartupError> {
        Self::load_with_env(config_path, environment())
    }

    fn load_with_env(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, StartupError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env);
        Ok(with_defaults(settings)?.build()?.try_deserialize()?)
    }

    /// Load configuration with defaults only, plus explicit overrides
    ///
    /// Used by tests and embedders that do not want file or environment sources.
    pub fn from_overrides(overrides: &[(&str, &str)]) -> Result<Self, StartupError> {
        let mut settings = with_defaults(config::Config::builder())?;
        for (key, value) in overrides {
            settings = settings.set_override(*key, *value)?;
        }
        Ok(settings.build()?.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| StartupError::InvalidAddress { addr, source })
    }
}

/// `SPA_` variables; list keys take comma-separated values
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("site.cached_extensions")
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("site.document_root", "public")?
        .set_default("site.index_document", "index.html")?
        .set_default("site.cache_max_age_seconds", 31_536_000)? // 1 year
        .set_default("site.cache_immutable", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.write_timeout", 30)?
        .set_default("performance.backlog", 1024)?
        .set_default("performance.shutdown_timeout", 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::from_overrides(&[]).unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.site.index_document, "index.html");
        assert_eq!(cfg.site.cache_max_age_seconds, 31_536_000);
        assert!(cfg.site.cache_immutable);
        assert_eq!(cfg.site.cached_extensions, default_cached_extensions());
        assert!(cfg.site.cache_rules.is_empty());
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(!cfg.health.enabled);
        assert_eq!(cfg.health.path, "/healthz");
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::from_overrides(&[
            ("server.port", "80"),
            ("site.document_root", "/srv/www"),
            ("site.cache_immutable", "false"),
        ])
        .unwrap();
        assert_eq!(cfg.server.port, 80);
        assert_eq!(cfg.site.document_root, "/srv/www");
        assert!(!cfg.site.cache_immutable);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::from_overrides(&[("server.host", "127.0.0.1")]).unwrap();
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "127.0.0.1:8000");

        let bad = Config::from_overrides(&[("server.host", "not a host")]).unwrap();
        assert!(matches!(
            bad.get_socket_addr(),
            Err(StartupError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let vars: config::Map<String, String> = [
            ("SPA_SITE__CACHED_EXTENSIONS", "css,js"),
            ("SPA_SERVER__PORT", "9090"),
            ("SPA_SITE__INDEX_DOCUMENT", "app,shell.html"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let base = dir.path().join("config");
        let cfg = Config::load_with_env(base.to_str().unwrap(), environment().source(Some(vars)))
            .unwrap();
        assert_eq!(cfg.site.cached_extensions, ["css", "js"]);
        assert_eq!(cfg.server.port, 9090);
        // Only list keys are split
        assert_eq!(cfg.site.index_document, "app,shell.html");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9000

[site]
document_root = "/var/www"

[[site.cache_rules]]
extensions = ["js", "css"]
max_age_seconds = 600
immutable = true

[[site.cache_rules]]
extensions = ["png"]
max_age_seconds = 60
"#,
        )
        .unwrap();

        let base = dir.path().join("config");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.site.document_root, "/var/www");
        assert_eq!(cfg.site.cache_rules.len(), 2);
        assert!(cfg.site.cache_rules[0].immutable);
        assert!(!cfg.site.cache_rules[1].immutable);
        assert_eq!(cfg.site.cache_rules[1].max_age_seconds, 60);
    }
}
