//! Common test utilities and fixtures.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;
use order_service::server::{router, AppState};
use order_service::simulator::{RandomSource, Simulator};
use order_service::telemetry::Telemetry;

/// App state wired to an in-memory exporter.
///
/// The fixture owns a clone of the state, so the tracer provider outlives
/// every router built from it and finished spans stay readable.
pub struct TracedApp {
    pub state: AppState,
    pub exporter: InMemorySpanExporter,
}

impl TracedApp {
    pub fn new<R: RandomSource + Send + 'static>(source: R) -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = TracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let state = AppState::new(Telemetry::from_provider(provider), Simulator::with_source(source));
        Self { state, exporter }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub fn single_span(&self) -> SpanData {
        single_span(&self.exporter)
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The only finished span, panicking if there is not exactly one.
pub fn single_span(exporter: &InMemorySpanExporter) -> SpanData {
    let mut spans = exporter.get_finished_spans().unwrap();
    assert_eq!(spans.len(), 1, "expected exactly one finished span");
    spans.remove(0)
}

pub fn attribute<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    span.attributes
        .iter()
        .find(|kv: &&KeyValue| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

pub fn string_attribute(span: &SpanData, key: &str) -> Option<String> {
    match attribute(span, key) {
        Some(Value::String(s)) => Some(s.as_str().to_string()),
        _ => None,
    }
}
