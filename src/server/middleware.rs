//! Per-request server span.

use super::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use opentelemetry::Context;

/// Context holding the server span of the current request.
///
/// Inserted into request extensions by [`server_span`].
#[derive(Clone, Debug)]
pub struct RequestSpan(pub Context);

/// Open a server span before the handler runs and close it with the final
/// status code afterwards.
pub async fn server_span(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| path.clone(), |matched| matched.as_str().to_owned());

    let cx = state.telemetry.start_server_span(
        request.method().as_str(),
        &route,
        &path,
        request.headers(),
    );
    request.extensions_mut().insert(RequestSpan(cx.clone()));

    let response = next.run(request).await;

    tracing::debug!(route = %route, status = response.status().as_u16(), "Request finished");
    state.telemetry.finish_server_span(&cx, response.status().as_u16());

    response
}
