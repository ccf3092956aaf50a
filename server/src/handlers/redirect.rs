use super::found;
use crate::AppState;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Fallback for every path that is not an admin endpoint.
///
/// 1. Percent-decode the request path so it matches keys stored from
///    decoded query parameters. There is no validation: anything that does
///    not resolve is a 404.
/// 2. Look it up under a shared lock.
/// 3. Return a 302 to the destination, or 404.
pub async fn redirect(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    // Invalid UTF-8 cannot match a stored key; decode lossily and let it miss
    let decoded = urlencoding::decode_binary(uri.path().as_bytes());
    let path = String::from_utf8_lossy(&decoded);

    match state.store.lookup(&path).await {
        Some(destination) => found(&destination),
        None => {
            tracing::debug!("No link for '{}'", path);
            (StatusCode::NOT_FOUND, "404 page not found").into_response()
        }
    }
}
