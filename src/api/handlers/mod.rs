//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod admin;
pub mod extract;
pub mod health;
pub mod links;
pub mod redirect;

pub use admin::{delete_link_handler, get_link_handler, list_links_handler, stats_handler};
pub use extract::extract_code_handler;
pub use health::health_handler;
pub use links::{create_link_handler, rebind_link_handler};
pub use redirect::redirect_handler;

use axum::{Json, extract::rejection::JsonRejection, http::HeaderMap};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::base_url::base_url_from_headers;

/// Unwraps a JSON body, reporting malformed payloads as `invalid_format`.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        AppError::invalid_format(
            "Malformed request body",
            json!({ "reason": rejection.body_text() }),
        )
    })
}

/// Base for short URLs: the configured public URL, else the request's host.
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    match state.public_base_url {
        Some(ref base) => base.to_string(),
        None => base_url_from_headers(headers),
    }
}
