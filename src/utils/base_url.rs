//! Public base URL resolution for building short URLs.

use axum::http::{HeaderMap, header};

const DEFAULT_HOST: &str = "localhost:3000";
const DEFAULT_SCHEME: &str = "https";

/// Derives `scheme://host` from request headers.
///
/// Uses the `Host` header (default `localhost:3000`) and
/// `X-Forwarded-Proto` (default `https`).
pub fn base_url_from_headers(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_HOST);

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim())
        .filter(|v| *v == "http" || *v == "https")
        .unwrap_or(DEFAULT_SCHEME);

    format!("{scheme}://{host}")
}

/// Joins a base URL and a code into a full short URL.
pub fn short_url(base: &str, code: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), code)
}
