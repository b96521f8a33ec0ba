// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for integration tests: an in-process mock of the
//! RevenueCat subscriber endpoint and a fully wired test app.

use axum::{
    extract::Path,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use entitlement_sync::config::Config;
use entitlement_sync::db::{EntitlementStore, SqliteStore};
use entitlement_sync::routes::create_router;
use entitlement_sync::services::{RevenueCatClient, SyncEngine};
use entitlement_sync::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// In-process stand-in for the RevenueCat V1 API.
///
/// Serves `GET /v1/subscribers/{id}` on an ephemeral port with a swappable
/// canned response and counts how many times it was hit.
pub struct MockRevenueCat {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    response: Arc<Mutex<(StatusCode, serde_json::Value)>>,
}

impl MockRevenueCat {
    pub async fn start(status: StatusCode, body: serde_json::Value) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = Arc::new(Mutex::new((status, body)));

        let handler_hits = hits.clone();
        let handler_response = response.clone();
        let app = Router::new().route(
            "/v1/subscribers/{id}",
            get(move |Path(_id): Path<String>| {
                let hits = handler_hits.clone();
                let response = handler_response.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let (status, body) = response.lock().unwrap().clone();
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            hits,
            response,
        }
    }

    /// Swap the canned response (e.g. to change the snapshot between syncs).
    #[allow(dead_code)]
    pub fn set_response(&self, status: StatusCode, body: serde_json::Value) {
        *self.response.lock().unwrap() = (status, body);
    }

    #[allow(dead_code)]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// A fully wired app over a temp database and a mock upstream.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    /// Separate handle onto the same database file, for assertions.
    pub store: SqliteStore,
    _dir: TempDir,
}

/// Build the real router with a temp SQLite file and the mock upstream.
#[allow(dead_code)]
pub async fn create_test_app(remote: &MockRevenueCat) -> TestApp {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("entitlements.sqlite");

    let config = Config {
        rc_api_url: remote.base_url.clone(),
        ..Config::test_default()
    };

    let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
    store.ensure_schema().unwrap();

    let client = RevenueCatClient::new(config.rc_api_url.clone(), config.rc_api_key.clone());
    let engine = SyncEngine::new(client, store.clone());

    let state = Arc::new(AppState {
        config,
        engine,
    });

    TestApp {
        router: create_router(state),
        store,
        _dir: dir,
    }
}

/// Build a bare sync engine over a temp SQLite file (no HTTP layer).
#[allow(dead_code)]
pub fn create_test_engine(remote: &MockRevenueCat) -> (SyncEngine, SqliteStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("entitlements.sqlite");

    let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
    store.ensure_schema().unwrap();

    let client = RevenueCatClient::new(remote.base_url.clone(), "sk_test_key".to_string());
    let engine = SyncEngine::new(client, store.clone());
    (engine, store, dir)
}
