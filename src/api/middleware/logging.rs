//! Request logging middleware
//!
//! Emits one event when a request arrives and one when it completes. Spans
//! come from `TraceLayer`, so none are opened here.

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

const REDACTED: &str = "[REDACTED]";

/// Headers worth recording; credentials among them are redacted
const LOGGED_HEADERS: &[&str] = &[
    "authorization",
    "content-type",
    "content-length",
    "user-agent",
    "x-forwarded-for",
];

const CREDENTIAL_HEADERS: &[&str] = &["authorization", "cookie", "proxy-authorization"];

pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = route_of(&request);
    let request_id = request_id_of(request.headers());

    info!(
        method = %method,
        route = %route,
        request_id = %request_id,
        headers = %loggable_headers(request.headers()),
        "Request received"
    );

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(method = %method, route = %route, status = status.as_u16(), elapsed_ms, request_id = %request_id, "Request failed");
    } else {
        info!(method = %method, route = %route, status = status.as_u16(), elapsed_ms, request_id = %request_id, "Request completed");
    }

    response
}

/// Route template when matched (`/api/v1/teams/{team_id}/members`), raw path otherwise
fn route_of(request: &Request<Body>) -> String {
    match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => request.uri().path().to_string(),
    }
}

fn request_id_of(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

fn loggable_headers(headers: &HeaderMap) -> String {
    LOGGED_HEADERS
        .iter()
        .filter_map(|name| {
            let value = headers.get(*name)?;
            let shown = if CREDENTIAL_HEADERS.contains(name) {
                REDACTED
            } else {
                value.to_str().unwrap_or("[non-ascii]")
            };
            Some(format!("{}={}", name, shown))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_is_redacted() {
        let request = Request::builder()
            .uri("/api/v1/auth/me")
            .header("authorization", "Bearer secret-token")
            .header("content-type", "application/json")
            .header("etag", "abc")
            .body(Body::empty())
            .unwrap();

        let logged = loggable_headers(request.headers());
        assert_eq!(
            logged,
            "authorization=[REDACTED], content-type=application/json"
        );
        assert!(!logged.contains("secret-token"));
    }

    #[test]
    fn test_request_id_and_route() {
        let request = Request::builder()
            .uri("/live?check=1")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap();

        assert_eq!(request_id_of(request.headers()), "req-42");
        assert_eq!(route_of(&request), "/live");
        assert_eq!(request_id_of(&HeaderMap::new()), "-");
    }
}
