// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! RevenueCat API client for fetching subscriber entitlements.
//!
//! A thin, typed façade over the V1 `GET /subscribers/{id}` endpoint.
//! No retries, no pagination, no caching; one authenticated request per call
//! with a hard timeout.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::models::{EntitlementInfo, SubscriberSnapshot};

/// Hard deadline on each remote call. Expiry maps to [`RemoteError::Unavailable`].
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures from the remote subscriber fetch.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Transport failure, timeout, or an unexpected upstream status.
    #[error("RevenueCat unavailable: {0}")]
    Unavailable(String),

    /// The API credential was rejected (401/403).
    #[error("RevenueCat rejected the API credential")]
    Auth,

    /// The subscriber is unknown to RevenueCat (404). Callers treat this as
    /// "zero entitlements", not a failure.
    #[error("subscriber not known to RevenueCat")]
    NotFound,
}

/// RevenueCat API client.
#[derive(Clone)]
pub struct RevenueCatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RevenueCatClient {
    /// Create a new client with a V1 secret API key.
    ///
    /// `base_url` is the V1 API root, e.g. `https://api.revenuecat.com/v1`.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Fetch the authoritative entitlement set for one app user.
    pub async fn fetch_subscriber(
        &self,
        app_user_id: &str,
    ) -> Result<SubscriberSnapshot, RemoteError> {
        let url = format!(
            "{}/subscribers/{}",
            self.base_url,
            urlencoding::encode(app_user_id)
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Unavailable(format!("request timed out: {}", e))
                } else {
                    RemoteError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(RemoteError::NotFound);
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(RemoteError::Auth);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Unavailable(format!("HTTP {}: {}", status, body)));
        }

        let parsed: SubscriberResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Unavailable(format!("JSON parse error: {}", e)))?;

        Ok(SubscriberSnapshot {
            app_user_id: app_user_id.to_string(),
            entitlements: parsed.subscriber.entitlements,
        })
    }
}

/// V1 subscriber response envelope.
#[derive(Debug, Deserialize)]
struct SubscriberResponse {
    subscriber: SubscriberBody,
}

#[derive(Debug, Deserialize)]
struct SubscriberBody {
    /// Entitlement name -> state. Absent for subscribers with no grants.
    #[serde(default)]
    entitlements: HashMap<String, EntitlementInfo>,
}
