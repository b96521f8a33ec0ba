//! Entitlement models for storage and the RevenueCat API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One persisted entitlement row, keyed by (user_id, entitlement_name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementRow {
    /// App-assigned user ID (non-empty)
    pub user_id: String,
    /// Name of the access grant, e.g. "premium" (unique per user)
    pub entitlement_name: String,
    /// When the grant lapses; None means non-expiring or unknown from source
    pub expiration: Option<DateTime<Utc>>,
    /// Wall-clock time this row was last confirmed against the remote source.
    /// Advisory only; clock skew may make it appear to move backward.
    pub last_sync: DateTime<Utc>,
    /// Provenance tag for the upstream system that supplied the grant
    pub source: String,
}

/// One entitlement as reported by the RevenueCat subscriber endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementInfo {
    /// RFC3339 expiry, or null for lifetime entitlements
    pub expires_date: Option<DateTime<Utc>>,
}

/// Authoritative entitlement set for one user, as fetched from RevenueCat.
///
/// Transient: built per sync invocation and discarded after reconciliation.
#[derive(Debug, Clone)]
pub struct SubscriberSnapshot {
    pub app_user_id: String,
    /// Entitlement name -> remote state
    pub entitlements: HashMap<String, EntitlementInfo>,
}

impl SubscriberSnapshot {
    /// An empty snapshot, used when the remote reports the user as unknown.
    pub fn empty(app_user_id: impl Into<String>) -> Self {
        Self {
            app_user_id: app_user_id.into(),
            entitlements: HashMap::new(),
        }
    }
}
