// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook route for RevenueCat events.
//!
//! RevenueCat delivers a POST whenever a subscriber may have changed. The
//! handler authenticates the shared-secret bearer token, pulls the subject
//! user out of the payload, and runs the sync inline before responding. The
//! sender therefore observes the full sync latency; slow syncs can overlap
//! with RevenueCat's redelivery of the same event, which the per-user lock in
//! the engine absorbs.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", post(handle_event))
}

/// RevenueCat webhook payload. Only the subject user matters here; the full
/// event is re-fetched from the API rather than trusted from the payload.
#[derive(Debug, Deserialize)]
struct WebhookPayload {
    event: WebhookEvent,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    app_user_id: String,
    #[serde(rename = "type", default)]
    event_type: Option<String>,
}

/// Check the `Authorization` header against the configured webhook token.
///
/// The header must equal `Bearer <token>` exactly: case-sensitive, single
/// space, no trailing content. Comparison is constant-time.
fn authorized(headers: &HeaderMap, token: &str) -> bool {
    let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return false;
    };
    let expected = format!("Bearer {}", token);
    value.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Handle an incoming webhook event (POST).
///
/// The body is taken as raw bytes so that authentication is decided before
/// any of it is inspected: a bad token is always a clean 401, never a 400,
/// even when the body is not valid UTF-8.
async fn handle_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    if !authorized(&headers, &state.config.webhook_token) {
        tracing::warn!("Webhook rejected: bad or missing Authorization header");
        return Err(AppError::Unauthorized);
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed webhook payload: {}", e)))?;

    tracing::info!(
        user_id = %payload.event.app_user_id,
        event_type = ?payload.event.event_type,
        "Webhook event received"
    );

    // Synchronous by contract: RevenueCat gets the 200 only once the sync
    // has actually been applied, so a redelivery means it really failed.
    let report = state
        .engine
        .sync_user_entitlements(&payload.event.app_user_id)
        .await?;

    tracing::info!(
        user_id = %payload.event.app_user_id,
        inserted = report.inserted,
        updated = report.updated,
        "Webhook event processed"
    );
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_exact_bearer_match() {
        assert!(authorized(&headers_with("Bearer secret"), "secret"));
    }

    #[test]
    fn test_rejects_wrong_token() {
        assert!(!authorized(&headers_with("Bearer wrong"), "secret"));
    }

    #[test]
    fn test_rejects_missing_header() {
        assert!(!authorized(&HeaderMap::new(), "secret"));
    }

    #[test]
    fn test_rejects_wrong_scheme() {
        assert!(!authorized(&headers_with("Basic secret"), "secret"));
        assert!(!authorized(&headers_with("bearer secret"), "secret"));
    }

    #[test]
    fn test_rejects_extra_segments() {
        assert!(!authorized(&headers_with("Bearer secret extra"), "secret"));
        assert!(!authorized(&headers_with("Bearer  secret"), "secret"));
        assert!(!authorized(&headers_with("Bearer secret "), "secret"));
    }
}
