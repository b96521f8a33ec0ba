//! Database layer (SQLite).

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::models::EntitlementRow;

/// Store-level failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An insert collided with an existing (user_id, entitlement_name) key.
    #[error("entitlement row already exists for this user")]
    DuplicateKey,

    /// An update targeted a (user_id, entitlement_name) key with no row.
    #[error("no entitlement row exists for this user")]
    NotFound,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

/// Persistence contract for entitlement rows.
///
/// The engine relies on at most one row existing per
/// (user_id, entitlement_name) pair. Every mutating call commits durably
/// before returning; callers must not assume any cross-call buffering.
pub trait EntitlementStore: Send + Sync {
    /// Create the entitlement table if absent. Idempotent.
    fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Fetch all rows for a user. Order is not meaningful.
    fn fetch_by_user(&self, user_id: &str) -> Result<Vec<EntitlementRow>, StoreError>;

    /// Insert a new row. Fails with [`StoreError::DuplicateKey`] if the key
    /// already exists; callers are expected to have checked first.
    fn insert(&self, row: &EntitlementRow) -> Result<(), StoreError>;

    /// Overwrite the full row matching (user_id, entitlement_name).
    /// Partial field updates are not supported. Fails with
    /// [`StoreError::NotFound`] if no such row exists.
    fn update_by_key(&self, row: &EntitlementRow) -> Result<(), StoreError>;
}
