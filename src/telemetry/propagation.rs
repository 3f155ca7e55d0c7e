//! W3C trace-context extraction from HTTP request headers.

use axum::http::HeaderMap;
use opentelemetry::propagation::Extractor;

/// Read-only view of request headers for a [`TextMapPropagator`].
///
/// [`TextMapPropagator`]: opentelemetry::propagation::TextMapPropagator
pub struct HeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}
