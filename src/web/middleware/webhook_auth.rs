//! # Webhook Secret Middleware
//!
//! When `web.webhook_secret` is configured, inbound webhook calls must carry it
//! in the configured header. Without a configured secret the check is off.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::web::errors::ApiError;
use crate::web::state::AppState;

pub async fn require_webhook_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.web_config.webhook_secret.as_deref() else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(state.web_config.webhook_secret_header.as_str())
        .map(|value| value.as_bytes());
    let header_present = presented.is_some();
    let authorized = presented.is_some_and(|p| constant_time_eq(p, expected.as_bytes()));

    if authorized {
        return next.run(request).await;
    }

    warn!(
        path = %request.uri().path(),
        header_present,
        "Rejected webhook call with missing or invalid secret"
    );
    ApiError::Unauthorized.into_response()
}

/// Compare without short-circuiting on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"s3cret", b"s3cret"));
        assert!(!constant_time_eq(b"s3cret", b"s3creT"));
        assert!(!constant_time_eq(b"s3cret", b"s3cret!"));
        assert!(constant_time_eq(b"", b""));
    }
}
