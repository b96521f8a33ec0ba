// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reconciliation engine keeping local entitlement rows in line with
//! RevenueCat.
//!
//! One invocation handles one user: fetch the authoritative snapshot, load the
//! existing rows, then insert or overwrite per entitlement. A per-user mutex
//! serializes concurrent syncs for the same user, which would otherwise race
//! on the fetch-then-insert step.

use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::{EntitlementStore, SqliteStore, StoreError};
use crate::models::{EntitlementRow, SubscriberSnapshot};
use crate::services::revenuecat::{RemoteError, RevenueCatClient};

/// Provenance tag recorded on every row this integration writes.
pub const SOURCE_REVENUECAT: &str = "revenuecat";

/// Per-user sync locks, shared across all webhook handlers.
///
/// Entries are never evicted, so the map grows with the number of distinct
/// users seen over the process lifetime (one small Arc/Mutex pair each).
type UserLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Sync failures surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote fetch failed before the store was touched.
    #[error("remote fetch failed: {0}")]
    Remote(#[from] RemoteError),

    /// Loading existing rows failed; no mutations were applied.
    #[error("failed to load existing entitlement rows: {0}")]
    Store(#[from] StoreError),

    /// A row write failed after `processed` rows had already been applied.
    /// Re-invoking the whole sync is safe; each row write is idempotent.
    #[error("sync aborted after {processed} row(s): {source}")]
    Partial {
        processed: usize,
        source: StoreError,
    },
}

/// Outcome of a successful sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub updated: usize,
}

impl SyncReport {
    /// Total rows written.
    pub fn processed(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Reconciliation engine for one RevenueCat project.
///
/// Owns the reconciliation decision; nothing else mutates entitlement rows.
pub struct SyncEngine<S: EntitlementStore = SqliteStore> {
    client: RevenueCatClient,
    store: S,
    source_tag: String,
    user_locks: UserLocks,
}

impl<S: EntitlementStore> SyncEngine<S> {
    /// Create a new engine over a remote client and a row store.
    pub fn new(client: RevenueCatClient, store: S) -> Self {
        Self {
            client,
            store,
            source_tag: SOURCE_REVENUECAT.to_string(),
            user_locks: Arc::new(DashMap::new()),
        }
    }

    /// Sync one user's entitlements from RevenueCat into the local store.
    ///
    /// A 404 from RevenueCat is normalized to an empty entitlement set.
    /// Rows present locally but absent from the remote snapshot are left
    /// untouched; nothing prunes them or marks them lapsed.
    ///
    /// Atomic per row, not per user: a failure partway through leaves the
    /// already-written rows in place and reports how many were applied.
    pub async fn sync_user_entitlements(
        &self,
        app_user_id: &str,
    ) -> Result<SyncReport, SyncError> {
        // Serialize syncs for the same user. Two concurrent syncs would both
        // observe "row not present" and both attempt the insert.
        let lock = self
            .user_locks
            .entry(app_user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let snapshot = match self.client.fetch_subscriber(app_user_id).await {
            Ok(snapshot) => snapshot,
            Err(RemoteError::NotFound) => {
                tracing::debug!(user_id = app_user_id, "Subscriber unknown to RevenueCat");
                SubscriberSnapshot::empty(app_user_id)
            }
            Err(e) => return Err(e.into()),
        };

        let existing = self.store.fetch_by_user(app_user_id)?;
        let existing_names: HashMap<&str, &EntitlementRow> = existing
            .iter()
            .map(|row| (row.entitlement_name.as_str(), row))
            .collect();

        let mut report = SyncReport {
            inserted: 0,
            updated: 0,
        };

        for (name, info) in &snapshot.entitlements {
            let candidate = EntitlementRow {
                user_id: app_user_id.to_string(),
                entitlement_name: name.clone(),
                expiration: info.expires_date,
                last_sync: Utc::now(),
                source: self.source_tag.clone(),
            };

            let write = if existing_names.contains_key(name.as_str()) {
                self.store.update_by_key(&candidate).map(|()| {
                    report.updated += 1;
                })
            } else {
                self.store.insert(&candidate).map(|()| {
                    report.inserted += 1;
                })
            };

            if let Err(source) = write {
                tracing::error!(
                    user_id = app_user_id,
                    entitlement = %name,
                    processed = report.processed(),
                    error = %source,
                    "Row write failed, aborting sync"
                );
                return Err(SyncError::Partial {
                    processed: report.processed(),
                    source,
                });
            }
        }

        tracing::info!(
            user_id = app_user_id,
            inserted = report.inserted,
            updated = report.updated,
            "Entitlements synced"
        );
        Ok(report)
    }
}
