// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entitlement-Sync API Server
//!
//! Receives RevenueCat webhooks and reconciles each subscriber's local
//! entitlement rows against the RevenueCat API.

use anyhow::Context;
use entitlement_sync::{
    config::Config,
    db::{EntitlementStore, SqliteStore},
    services::{RevenueCatClient, SyncEngine},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment; missing credentials are fatal
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        project = %config.rc_project_id,
        "Starting Entitlement-Sync API"
    );

    // Open the entitlement database and make sure the table exists
    let store = SqliteStore::open(&config.database_path)
        .context("Failed to open entitlement database")?;
    store
        .ensure_schema()
        .context("Failed to create entitlement table")?;

    // Build the RevenueCat client and the sync engine
    let client = RevenueCatClient::new(config.rc_api_url.clone(), config.rc_api_key.clone());
    let engine = SyncEngine::new(client, store);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        engine,
    });

    // Build router
    let app = entitlement_sync::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("entitlement_sync=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
