//! Baseline security headers
//!
//! A fixed header set attached to every response, errors included.

use hyper::header::{HeaderMap, HeaderName, HeaderValue, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};

#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self {
            headers: vec![
                (X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
                (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            ],
        }
    }
}

impl SecurityHeaders {
    /// Insert every header, replacing any existing value with the same name
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(n, v)| (n, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        SecurityHeaders::default().apply(&mut headers);

        assert_eq!(headers.get("x-frame-options").unwrap(), "SAMEORIGIN");
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_iter() {
        let names: Vec<_> = SecurityHeaders::default()
            .iter()
            .map(|(n, _)| n.as_str().to_string())
            .collect();
        assert_eq!(names, ["x-frame-options", "x-content-type-options"]);
    }
}
