//! Logging setup and middleware for logging requests and responses.

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Bodies longer than this many characters are truncated in `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Install the global tracing subscriber.
///
/// Logs go to stdout at the `info` level unless overridden by `RUST_LOG`.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty().with_filter(filter))
        .init();
}

/// Wrap `router` with a span per request and the [logging_middleware].
pub fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are mapped to responses.
        .on_failure(());

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(tracing_layer)
}

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let Some(body_bytes) = read_body(body).await else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    log_body(
        &format!("Received request: {} {}", parts.method, parts.uri),
        &body_bytes,
    );

    let response = next
        .run(Request::from_parts(parts, Body::from(body_bytes)))
        .await;

    let (parts, body) = response.into_parts();
    let Some(body_bytes) = read_body(body).await else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    log_body(&format!("Sending response: {}", parts.status), &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Option<Bytes> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .inspect_err(|error| tracing::error!("Could not read body: {error}"))
        .ok()
}

fn log_body(message: &str, body: &[u8]) {
    let body = String::from_utf8_lossy(body);

    match truncate(&body, LOG_BODY_LENGTH_LIMIT) {
        Some(truncated) => {
            tracing::info!("{message}\nbody: {truncated}...");
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{message}\nbody: {body:?}"),
    }
}

/// The first `limit` characters of `text`, or `None` if `text` is not longer than `limit`.
fn truncate(text: &str, limit: usize) -> Option<&str> {
    text.char_indices()
        .nth(limit)
        .map(|(byte_index, _)| &text[..byte_index])
}
