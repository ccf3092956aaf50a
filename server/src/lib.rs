use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod handlers;
pub mod snapshot;
pub mod store;

use snapshot::SnapshotFile;
use store::LinkStore;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub store: LinkStore,
    /// Rewritten in full after every add, modify and remove.
    pub snapshot: SnapshotFile,
}

impl AppState {
    pub fn new(store: LinkStore, snapshot: SnapshotFile) -> Arc<Self> {
        Arc::new(Self { store, snapshot })
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/add", get(handlers::links::add))
        .route("/remove", get(handlers::links::remove))
        .route("/modify", get(handlers::links::modify))
        // Everything else is a link lookup
        .fallback(handlers::redirect::redirect)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
