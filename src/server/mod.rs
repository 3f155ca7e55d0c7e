//! HTTP surface of the order service.
//!
//! Two routes: `/` describes the demo and `/checkout` runs one simulated
//! checkout. Every request is wrapped in a server span by
//! [`middleware::server_span`]; the checkout handler annotates that span.

pub mod middleware;

use crate::core::{Config, Result, ServiceError};
use crate::simulator::Simulator;
use crate::telemetry::{ActiveSpan, Telemetry};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use opentelemetry::Context;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use middleware::RequestSpan;

/// Body served on `/`.
pub const INDEX_TEXT: &str =
    "Order Service Demo for Tail Sampling. Use /checkout to simulate orders.";

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub telemetry: Telemetry,
    pub simulator: Simulator,
}

impl AppState {
    pub fn new(telemetry: Telemetry, simulator: Simulator) -> Self {
        Self {
            telemetry,
            simulator,
        }
    }
}

/// Create the router with span middleware and request logging.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/checkout", get(checkout_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::server_span,
                )),
        )
        .with_state(state)
}

/// GET / - Plain-text description of the demo
async fn index_handler() -> &'static str {
    INDEX_TEXT
}

/// GET /checkout - Run one simulated checkout
async fn checkout_handler(
    State(state): State<AppState>,
    request_span: Option<Extension<RequestSpan>>,
) -> impl IntoResponse {
    let cx = match request_span {
        Some(Extension(RequestSpan(cx))) => cx,
        None => {
            tracing::warn!("No request span found, checkout will not be traced");
            Context::new()
        },
    };

    let mut span = ActiveSpan::from_context(&cx);
    let response = state.simulator.handle_checkout(&mut span).await;

    let status =
        StatusCode::from_u16(response.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.result))
}

/// Bind to the configured address and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServiceError::server(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Order service listening on http://{}", addr);

    serve_until(listener, state, config.server.shutdown_grace, shutdown_signal()).await
}

/// Serve on `listener` until `shutdown` resolves.
///
/// In-flight requests get `grace` to finish; whatever is still running after
/// that is dropped.
pub async fn serve_until<F>(
    listener: TcpListener,
    state: AppState,
    grace: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let stop = Arc::new(Notify::new());
    let stop_server = Arc::clone(&stop);

    let server = axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { stop_server.notified().await })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(|e| ServiceError::server(format!("HTTP server error: {}", e)));
        }
        () = shutdown => {
            tracing::info!("Shutdown requested, draining in-flight requests");
            stop.notify_one();
        }
    }

    match tokio::time::timeout(grace, server).await {
        Ok(result) => {
            result.map_err(|e| ServiceError::server(format!("HTTP server error: {}", e)))
        },
        Err(_) => {
            tracing::warn!("Shutdown grace period of {:?} elapsed, dropping open connections", grace);
            Ok(())
        },
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
