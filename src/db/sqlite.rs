// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite-backed entitlement store.
//!
//! A single `entitlement` table holds one row per (user_id, entitlement_name)
//! pair; the composite primary key physically enforces the uniqueness the
//! sync engine relies on. Connections come from an r2d2 pool so concurrent
//! webhook handlers never share a connection.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, ErrorCode};

use crate::db::{EntitlementStore, StoreError};
use crate::models::EntitlementRow;

/// Connection pool type for the entitlement database.
pub type DbPool = Pool<SqliteConnectionManager>;

/// SQLite implementation of the entitlement store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open (or create) the database file and build the connection pool.
    pub fn open(database_path: &str) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(database_path);
        let pool = Pool::builder().max_size(10).build(manager)?;
        tracing::info!(path = database_path, "Opened entitlement database");
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }
}

impl EntitlementStore for SqliteStore {
    fn ensure_schema(&self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entitlement (
                user_id TEXT NOT NULL,
                entitlement_name TEXT NOT NULL,
                expiration TEXT,
                last_sync TEXT NOT NULL,
                source TEXT NOT NULL,
                PRIMARY KEY (user_id, entitlement_name)
            );
            "#,
        )?;
        Ok(())
    }

    fn fetch_by_user(&self, user_id: &str) -> Result<Vec<EntitlementRow>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, entitlement_name, expiration, last_sync, source
             FROM entitlement WHERE user_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(EntitlementRow {
                    user_id: row.get(0)?,
                    entitlement_name: row.get(1)?,
                    expiration: row.get(2)?,
                    last_sync: row.get(3)?,
                    source: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert(&self, row: &EntitlementRow) -> Result<(), StoreError> {
        let result = self.conn()?.execute(
            "INSERT INTO entitlement (user_id, entitlement_name, expiration, last_sync, source)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                row.user_id,
                row.entitlement_name,
                row.expiration,
                row.last_sync,
                row.source
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateKey)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update_by_key(&self, row: &EntitlementRow) -> Result<(), StoreError> {
        // Full-row overwrite; partial updates are not part of the contract.
        let changed = self.conn()?.execute(
            "UPDATE entitlement
             SET expiration = ?3, last_sync = ?4, source = ?5
             WHERE user_id = ?1 AND entitlement_name = ?2",
            params![
                row.user_id,
                row.entitlement_name,
                row.expiration,
                row.last_sync,
                row.source
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
