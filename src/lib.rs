// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entitlement-Sync: keep local subscription entitlements in step with
//! RevenueCat.
//!
//! This crate provides the webhook server and reconciliation engine that
//! re-fetch a subscriber's authoritative entitlement set whenever RevenueCat
//! reports a change, and apply it to a local SQLite table.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::SyncEngine;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub engine: SyncEngine,
}
