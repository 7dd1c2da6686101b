//! Session id cookie.

use axum::http::{header, HeaderMap, HeaderValue};

pub const COOKIE_NAME: &str = "rxscan_session";

/// Session id from the request's `Cookie` header, if present.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value binding the browser to `id`.
pub fn set_cookie(id: &str) -> HeaderValue {
    // uuid strings are always valid header bytes
    HeaderValue::from_str(&format!(
        "{COOKIE_NAME}={id}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static(""))
}
