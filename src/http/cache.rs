//! HTTP cache control module
//!
//! Provides `ETag` generation, conditional request handling, and the
//! per-extension cache rules that decide `Cache-Control` / `Expires`.

use chrono::{DateTime, Duration, Utc};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::config::{CacheRuleConfig, SiteConfig};

/// IMF-fixdate, the preferred HTTP date format (RFC 9110 section 5.6.7)
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Generate `ETag` using fast hashing
///
/// # Arguments
/// * `content` - File content
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Weak validators: `W/"abc123"`
/// - Wildcard: `*`
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Cache policy attached to a matching file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_age: u64,
    pub immutable: bool,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        if self.immutable {
            "public, immutable".to_string()
        } else {
            format!("public, max-age={}", self.max_age)
        }
    }

    /// `Expires` header value relative to `now`
    ///
    /// Saturates at chrono's maximum date for absurd max-age values.
    pub fn expires_at(self, now: DateTime<Utc>) -> String {
        let expires = i64::try_from(self.max_age)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|age| now.checked_add_signed(age))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        expires.format(HTTP_DATE_FORMAT).to_string()
    }
}

/// One (extension set -> policy) pair
#[derive(Debug, Clone)]
pub struct CacheRule {
    extensions: HashSet<String>,
    pub policy: CachePolicy,
}

impl CacheRule {
    pub fn new<I, S>(extensions: I, policy: CachePolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self { extensions, policy }
    }

    pub fn matches(&self, extension: &str) -> bool {
        self.extensions.contains(&extension.to_ascii_lowercase())
    }
}

impl From<&CacheRuleConfig> for CacheRule {
    fn from(cfg: &CacheRuleConfig) -> Self {
        Self::new(
            &cfg.extensions,
            CachePolicy {
                max_age: cfg.max_age_seconds,
                immutable: cfg.immutable,
            },
        )
    }
}

/// Ordered cache rules, evaluated first-match
#[derive(Debug, Clone, Default)]
pub struct CacheRules {
    rules: Vec<CacheRule>,
}

impl CacheRules {
    pub const fn new(rules: Vec<CacheRule>) -> Self {
        Self { rules }
    }

    /// Build rules from the site configuration.
    ///
    /// Explicit `cache_rules` win; otherwise one rule covers
    /// `cached_extensions` with the global max-age and immutability flag.
    pub fn from_site(site: &SiteConfig) -> Self {
        if !site.cache_rules.is_empty() {
            return Self::new(site.cache_rules.iter().map(CacheRule::from).collect());
        }
        Self::new(vec![CacheRule::new(
            &site.cached_extensions,
            CachePolicy {
                max_age: site.cache_max_age_seconds,
                immutable: site.cache_immutable,
            },
        )])
    }

    /// Policy for a file extension, if any rule covers it
    pub fn lookup(&self, extension: Option<&str>) -> Option<CachePolicy> {
        let extension = extension?;
        self.rules
            .iter()
            .find(|rule| rule.matches(extension))
            .map(|rule| rule.policy)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const YEAR: u64 = 31_536_000;

    #[test]
    fn test_generate_etag() {
        let etag = generate_etag(b"hello world");
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert!(etag.len() > 2);
    }

    #[test]
    fn test_etag_consistency() {
        assert_eq!(generate_etag(b"same content"), generate_etag(b"same content"));
        assert_ne!(generate_etag(b"content a"), generate_etag(b"content b"));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_cache_control_value() {
        let immutable = CachePolicy {
            max_age: YEAR,
            immutable: true,
        };
        assert_eq!(immutable.to_header_value(), "public, immutable");

        let plain = CachePolicy {
            max_age: 600,
            immutable: false,
        };
        assert_eq!(plain.to_header_value(), "public, max-age=600");
    }

    #[test]
    fn test_expires() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let policy = CachePolicy {
            max_age: 3600,
            immutable: false,
        };
        assert_eq!(policy.expires_at(now), "Mon, 01 Jan 2024 01:00:00 GMT");

        let huge = CachePolicy {
            max_age: u64::MAX,
            immutable: true,
        };
        assert!(huge.expires_at(now).ends_with("GMT"));
    }

    #[test]
    fn test_rule_case_insensitive() {
        let rules = CacheRules::new(vec![CacheRule::new(
            ["JS", ".css"],
            CachePolicy {
                max_age: 60,
                immutable: false,
            },
        )]);
        assert!(rules.lookup(Some("js")).is_some());
        assert!(rules.lookup(Some("Js")).is_some());
        assert!(rules.lookup(Some("CSS")).is_some());
        assert!(rules.lookup(Some("html")).is_none());
        assert!(rules.lookup(None).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let short = CachePolicy {
            max_age: 60,
            immutable: false,
        };
        let long = CachePolicy {
            max_age: YEAR,
            immutable: true,
        };
        let rules = CacheRules::new(vec![
            CacheRule::new(["js"], short),
            CacheRule::new(["js", "css"], long),
        ]);
        assert_eq!(rules.lookup(Some("js")), Some(short));
        assert_eq!(rules.lookup(Some("css")), Some(long));
    }

    #[test]
    fn test_from_site_defaults() {
        let site = crate::config::Config::from_overrides(&[]).unwrap().site;
        let rules = CacheRules::from_site(&site);
        assert_eq!(rules.len(), 1);
        for ext in ["css", "js", "png", "jpg", "jpeg", "gif", "ico", "svg", "woff", "woff2"] {
            assert_eq!(
                rules.lookup(Some(ext)),
                Some(CachePolicy {
                    max_age: YEAR,
                    immutable: true
                }),
                "extension {ext}"
            );
        }
        assert!(rules.lookup(Some("html")).is_none());
    }

    #[test]
    fn test_from_site_explicit_rules() {
        let mut site = crate::config::Config::from_overrides(&[]).unwrap().site;
        site.cache_rules = vec![CacheRuleConfig {
            extensions: vec!["map".to_string()],
            max_age_seconds: 120,
            immutable: false,
        }];
        let rules = CacheRules::from_site(&site);
        assert_eq!(rules.len(), 1);
        assert!(rules.lookup(Some("js")).is_none());
        assert_eq!(
            rules.lookup(Some("map")).map(CachePolicy::to_header_value),
            Some("public, max-age=120".to_string())
        );
    }
}
