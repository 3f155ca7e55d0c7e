//! Trace pipeline owned by the service.
//!
//! The tracer provider is built once at startup and handed to the HTTP layer
//! inside [`Telemetry`]; nothing is registered globally, so tests can swap in
//! a provider backed by an in-memory exporter.

pub mod propagation;
pub mod span;

pub use propagation::HeaderExtractor;
pub use span::{ActiveSpan, SpanRecorder, SpanStatusCode};

use crate::core::{Result, TelemetryConfig};
use axum::http::HeaderMap;
use opentelemetry::{
    propagation::TextMapPropagator,
    trace::{SpanKind, TraceContextExt, Tracer as _, TracerProvider as _},
    Context, KeyValue,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    runtime,
    trace::{self, RandomIdGenerator, Sampler, Tracer, TracerProvider},
    Resource,
};
use opentelemetry_semantic_conventions::{resource, trace as semconv};

/// Instrumentation scope name for spans produced by this service.
const TRACER_NAME: &str = "order-service";

/// Owned handle to the tracer provider, tracer and propagator.
#[derive(Clone, Debug)]
pub struct Telemetry {
    provider: TracerProvider,
    tracer: Tracer,
    propagator: TraceContextPropagator,
}

impl Telemetry {
    /// Build the OTLP/gRPC batch pipeline described by `config`.
    ///
    /// Must be called from inside a Tokio runtime; the batch processor runs
    /// on it. With export disabled spans are still created and recorded so
    /// handlers behave identically, they are just never shipped.
    pub fn init(config: &TelemetryConfig) -> Result<Self> {
        let resource = Resource::new(vec![
            KeyValue::new(resource::SERVICE_NAME, config.service_name()),
            KeyValue::new(resource::SERVICE_VERSION, config.service_version.clone()),
            KeyValue::new("deployment.environment", config.environment.clone()),
        ]);

        let trace_config = trace::Config::default()
            .with_sampler(Sampler::AlwaysOn)
            .with_id_generator(RandomIdGenerator::default())
            .with_resource(resource);

        let provider = if config.export_enabled {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(config.otlp_endpoint.clone())
                .with_timeout(config.export_timeout);

            opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(trace_config)
                .install_batch(runtime::Tokio)?
        } else {
            TracerProvider::builder().with_config(trace_config).build()
        };

        tracing::info!(
            service = %config.service_name(),
            environment = %config.environment,
            endpoint = %config.otlp_endpoint,
            export = config.export_enabled,
            "Trace pipeline initialized"
        );

        Ok(Self::from_provider(provider))
    }

    /// Wrap an already constructed provider.
    pub fn from_provider(provider: TracerProvider) -> Self {
        let tracer = provider.tracer(TRACER_NAME);
        Self {
            provider,
            tracer,
            propagator: TraceContextPropagator::new(),
        }
    }

    /// Start the server span for one inbound request.
    ///
    /// A remote parent is picked up from `traceparent`/`tracestate` headers
    /// when present. The returned context carries the new span as its active
    /// span; finish it with [`Telemetry::finish_server_span`].
    pub fn start_server_span(
        &self,
        method: &str,
        route: &str,
        path: &str,
        headers: &HeaderMap,
    ) -> Context {
        let parent = self.propagator.extract(&HeaderExtractor(headers));

        let span = self
            .tracer
            .span_builder(format!("{} {}", method, route))
            .with_kind(SpanKind::Server)
            .with_attributes(vec![
                KeyValue::new(semconv::HTTP_REQUEST_METHOD, method.to_string()),
                KeyValue::new(semconv::HTTP_ROUTE, route.to_string()),
                KeyValue::new(semconv::URL_PATH, path.to_string()),
            ])
            .start_with_context(&self.tracer, &parent);

        parent.with_span(span)
    }

    /// Record the response code on the server span in `cx` and end it.
    pub fn finish_server_span(&self, cx: &Context, status_code: u16) {
        let span = cx.span();
        span.set_attribute(KeyValue::new(
            semconv::HTTP_RESPONSE_STATUS_CODE,
            i64::from(status_code),
        ));
        span.end();
    }

    /// Flush pending spans and stop the exporter.
    pub fn shutdown(&self) -> Result<()> {
        self.provider.shutdown()?;
        Ok(())
    }
}
