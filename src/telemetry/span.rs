//! Handle to the span of the request currently being served.

use crate::core::{Result, ServiceError};
use opentelemetry::{
    trace::{SpanRef, Status, TraceContextExt},
    Context, KeyValue,
};

/// Span status codes the simulator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStatusCode {
    Ok,
    Error,
}

/// Write-only view of the active request span.
///
/// Failures are reported to the caller, which decides whether they matter.
/// The checkout path logs and ignores them.
pub trait SpanRecorder {
    /// Set a string attribute on the span.
    fn set_attribute(&mut self, key: &'static str, value: String) -> Result<()>;

    /// Set the span status with a description.
    fn set_status(&mut self, code: SpanStatusCode, message: &str) -> Result<()>;
}

/// [`SpanRecorder`] over the active span of an OpenTelemetry [`Context`].
pub struct ActiveSpan<'a> {
    span: SpanRef<'a>,
}

impl<'a> ActiveSpan<'a> {
    pub fn from_context(cx: &'a Context) -> Self {
        Self { span: cx.span() }
    }

    fn ensure_recording(&self, what: &str) -> Result<()> {
        if self.span.is_recording() {
            Ok(())
        } else {
            Err(ServiceError::telemetry(format!(
                "no recording span in context, dropped {}",
                what
            )))
        }
    }
}

impl SpanRecorder for ActiveSpan<'_> {
    fn set_attribute(&mut self, key: &'static str, value: String) -> Result<()> {
        self.ensure_recording(key)?;
        self.span.set_attribute(KeyValue::new(key, value));
        Ok(())
    }

    fn set_status(&mut self, code: SpanStatusCode, message: &str) -> Result<()> {
        self.ensure_recording("status")?;
        let status = match code {
            SpanStatusCode::Ok => Status::Ok,
            SpanStatusCode::Error => Status::error(message.to_string()),
        };
        self.span.set_status(status);
        Ok(())
    }
}
