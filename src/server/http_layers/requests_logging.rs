//! Request logging middleware

use super::super::state::ServerState;
use axum::extract::State;
use axum::{
    body::{Body, Bytes},
    http::{header::HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{error, info};

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
    Body,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

const MAX_LOGGABLE_BODY_LENGTH: usize = 1024;

enum ContentLength {
    Loggable(usize),
    TooBig(usize),
    Unknown(&'static str),
}

fn content_length(headers: &HeaderMap) -> ContentLength {
    let Some(value) = headers.get("content-length") else {
        return ContentLength::Unknown("Content-length not set.");
    };
    let Ok(str_value) = value.to_str() else {
        return ContentLength::Unknown("Could not get Content-length string value.");
    };
    match str_value.parse::<usize>() {
        Ok(size) if size < MAX_LOGGABLE_BODY_LENGTH => ContentLength::Loggable(size),
        Ok(size) => ContentLength::TooBig(size),
        Err(_) => ContentLength::Unknown("Could not parse Content-length numeric value."),
    }
}

fn log_headers(label: &str, headers: &HeaderMap) {
    info!("  {} Headers:", label);
    for (name, value) in headers.iter() {
        info!("    {:?}: {:?}", name, value);
    }
}

/// Logs a small body and hands back an equivalent one, the original stream is
/// consumed in the process.
async fn log_body(label: &str, headers: &HeaderMap, body: Body) -> Result<Body, axum::Error> {
    match content_length(headers) {
        ContentLength::Unknown(reason) => {
            info!("  {} Body: {}", label, reason);
            Ok(body)
        }
        ContentLength::TooBig(size) => {
            info!(
                "  {} Body: Too big to log ({:#})",
                label,
                byte_unit::Byte::from(size)
            );
            Ok(body)
        }
        ContentLength::Loggable(size) => {
            let bytes: Bytes = axum::body::to_bytes(body, size).await?;
            info!("  {} Body:\n{}", label, String::from_utf8_lossy(&bytes));
            Ok(Body::from(bytes))
        }
    }
}

pub async fn log_requests(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let level = state.config.requests_logging_level.clone();
    if level == RequestsLoggingLevel::None {
        return next.run(request).await;
    }

    let start = Instant::now();
    info!(">>> {} {}", request.method(), request.uri());

    let mut request = request;
    if level >= RequestsLoggingLevel::Headers {
        log_headers("Req", request.headers());
    }
    if level >= RequestsLoggingLevel::Body {
        let (parts, body) = request.into_parts();
        match log_body("Req", &parts.headers, body).await {
            Ok(body) => request = Request::from_parts(parts, body),
            Err(err) => {
                error!("Failed to read request body: {:?}", err);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    let mut response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        log_headers("Resp", response.headers());
    }
    if level >= RequestsLoggingLevel::Body {
        let (parts, body) = response.into_parts();
        match log_body("Resp", &parts.headers, body).await {
            Ok(body) => response = Response::from_parts(parts, body),
            Err(err) => {
                error!("Failed to read response body: {:?}", err);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    info!(
        "<<< {} ({}ms)",
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn level_ordering() {
        let none = RequestsLoggingLevel::None;

        assert!(none < RequestsLoggingLevel::Headers);
        assert!(RequestsLoggingLevel::Body > RequestsLoggingLevel::Path);
        assert_eq!(RequestsLoggingLevel::default(), RequestsLoggingLevel::Path);
    }

    #[test]
    fn content_length_classification() {
        let mut headers = HeaderMap::new();
        assert!(matches!(content_length(&headers), ContentLength::Unknown(_)));

        headers.insert("content-length", HeaderValue::from_static("12"));
        assert!(matches!(content_length(&headers), ContentLength::Loggable(12)));

        headers.insert("content-length", HeaderValue::from_static("4096"));
        assert!(matches!(content_length(&headers), ContentLength::TooBig(4096)));

        headers.insert("content-length", HeaderValue::from_static("abc"));
        assert!(matches!(content_length(&headers), ContentLength::Unknown(_)));
    }
}
