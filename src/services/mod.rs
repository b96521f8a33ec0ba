// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod revenuecat;
pub mod sync;

pub use revenuecat::{RemoteError, RevenueCatClient};
pub use sync::{SyncEngine, SyncError, SyncReport};
