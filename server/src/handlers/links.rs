use super::found;
use crate::{store::link_key, AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// ── Query types ────────────────────────────────────────────────────────────

/// Raw query pairs in request order. Repeated names are allowed; only the
/// first occurrence of each is used.
type QueryPairs = Vec<(String, String)>;

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /add?key=<k>&value=<v>
pub async fn add(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Response {
    upsert(&state, params, "Added").await
}

/// GET /modify?key=<k>&value=<v>
///
/// Same upsert as `/add`: the key does not have to exist yet.
pub async fn modify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Response {
    upsert(&state, params, "Modified").await
}

/// GET /remove?key=<k>
///
/// Removing a key that was never added still succeeds.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Response {
    let Some(key) = required(first(&params, "key")) else {
        return bad_request();
    };

    let path = link_key(&key);
    let existed = state.store.delete(&path).await;
    state.snapshot.persist(&state.store).await;

    tracing::info!("Removed link '{}' (existed: {})", path, existed);
    found(&path)
}

// ── Private helpers ────────────────────────────────────────────────────────

async fn upsert(state: &AppState, params: QueryPairs, action: &str) -> Response {
    let key = required(first(&params, "key"));
    let value = required(first(&params, "value"));
    let (Some(key), Some(value)) = (key, value) else {
        return bad_request();
    };

    let path = link_key(&key);
    state.store.upsert(path.clone(), value).await;
    state.snapshot.persist(&state.store).await;

    tracing::info!("{} link '{}'", action, path);
    found(&path)
}

/// First value given for `name`, if any.
fn first(params: &[(String, String)], name: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

/// Absent and empty parameters are treated the same.
fn required(param: Option<String>) -> Option<String> {
    param.filter(|p| !p.is_empty())
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "Bad request").into_response()
}
