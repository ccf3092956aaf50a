pub mod links;
pub mod redirect;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::fmt::Write;

/// 302 Found pointing at `location`.
///
/// Destinations are arbitrary user text, so non-ASCII and control bytes are
/// percent-escaped to keep the header valid.
pub(crate) fn found(location: &str) -> Response {
    match HeaderValue::try_from(escape_location(location)) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => {
            tracing::error!("Unusable redirect target '{}': {:?}", location, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

fn escape_location(location: &str) -> String {
    let mut out = String::with_capacity(location.len());
    for &b in location.as_bytes() {
        if b.is_ascii() && !b.is_ascii_control() {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}
