// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod entitlement;

pub use entitlement::{EntitlementInfo, EntitlementRow, SubscriberSnapshot};
