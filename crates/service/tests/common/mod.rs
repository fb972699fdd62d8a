//! Shared test utilities for service integration tests
#![allow(dead_code)]

use annex_service::{http_server, ServiceState};
use annex_store::Store;
use axum::Router;

/// Set up service state backed by ephemeral in-memory stores
pub async fn setup_state() -> ServiceState {
    let store = Store::new_ephemeral().await.unwrap();
    ServiceState::new(store)
}

/// Set up the full router over ephemeral state
pub async fn setup_router() -> (Router, ServiceState) {
    let state = setup_state().await;
    let router = http_server::router(state.clone());
    (router, state)
}
