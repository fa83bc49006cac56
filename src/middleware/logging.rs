//! Logging middleware
//!
//! HTTP request tracing built on `tower-http`'s `TraceLayer`, plus security
//! event logging used by the authentication extractors.

use std::time::Duration;
use axum::http::{Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::{info, warn, Span};
use uuid::Uuid;

/// Requests slower than this are reported
const SLOW_REQUEST_MS: u128 = 1000;

/// One span per request carrying method, path and a request id
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %Uuid::new_v4(),
        )
    }
}

/// Logs status and latency once the response is ready
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseLogger;

impl<B> OnResponse<B> for ResponseLogger {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        let status = response.status();
        let duration_ms = latency.as_millis();

        if status.is_server_error() {
            warn!(status = status.as_u16(), duration_ms = duration_ms, "Request failed");
        } else {
            info!(status = status.as_u16(), duration_ms = duration_ms, "Request completed");
        }

        if duration_ms > SLOW_REQUEST_MS {
            warn!(status = status.as_u16(), duration_ms = duration_ms, "Slow request detected");
        }
    }
}

pub type HttpTraceLayer = TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan, DefaultOnRequest, ResponseLogger>;

/// Trace layer applied to the whole router
pub fn http_trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(ResponseLogger)
}

/// Log security event
pub fn log_security_event(event_type: &str, user_id: Option<i64>, details: &str) {
    warn!(
        event_type = event_type,
        user_id = user_id,
        details = details,
        "Security event detected"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_request_span_is_created() {
        let request = Request::builder().uri("/events/").body(()).unwrap();
        let span = RequestSpan.make_span(&request);
        // No subscriber is installed, so the span is disabled but valid
        let _entered = span.enter();
    }

    #[test]
    fn test_response_logger_accepts_any_status() {
        for status in [StatusCode::OK, StatusCode::FORBIDDEN, StatusCode::INTERNAL_SERVER_ERROR] {
            let response = Response::builder().status(status).body(()).unwrap();
            ResponseLogger.on_response(&response, Duration::from_millis(5), &Span::none());
        }
    }
}
