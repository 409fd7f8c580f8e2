//! Hooks plugged into `tower_http::trace::TraceLayer`.
//!
//! Every request gets an `http_request` span carrying method, path and the
//! upload-relevant headers; responses are logged at a level matching their
//! status class.

use axum::http::{Request, Response};
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tracing::{info_span, Span};

pub fn make_request_span<B>(request: &Request<B>) -> Span {
    info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri().path(),
        query = ?request.uri().query(),
        content_type = ?request.headers().get("content-type"),
        content_length = ?request.headers().get("content-length"),
    )
}

pub fn on_request<B>(request: &Request<B>, _span: &Span) {
    ::tracing::debug!(
        method = %request.method(),
        uri = %request.uri(),
        "Incoming HTTP request"
    );
}

pub fn on_response<B>(response: &Response<B>, latency: Duration, _span: &Span) {
    let status = response.status();
    let latency_ms = latency.as_millis() as u64;

    match status.as_u16() {
        400..=499 => {
            ::tracing::warn!(%status, latency_ms, "HTTP request completed with client error")
        }
        500..=599 => {
            ::tracing::error!(%status, latency_ms, "HTTP request completed with server error")
        }
        _ => ::tracing::info!(%status, latency_ms, "HTTP request completed"),
    }
}

pub fn on_failure(error: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    let error_type = match &error {
        ServerErrorsFailureClass::StatusCode(code) => format!("HTTP {}", code.as_u16()),
        ServerErrorsFailureClass::Error(_) => "Internal Error".to_string(),
    };

    ::tracing::error!(
        error = %error,
        latency_ms = latency.as_millis() as u64,
        error_type = %error_type,
        "HTTP request failed"
    );
}
