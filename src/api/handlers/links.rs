//! Handlers for link creation and rebinding.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use validator::Validate;

use super::{base_url, json_body};
use crate::api::dto::links::{CreateLinkRequest, LinkResponse, UpdateLinkRequest};
use crate::domain::entities::Caller;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Caller
///
/// Either `Authorization: Bearer <admin token>` (not rate limited) or
/// `X-Client-Id: <id>` (limited to a number of mutations per sliding window).
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "custom_code": "promo2026"
/// }
/// ```
///
/// `custom_code` is optional; without it a random 6-character code is generated.
///
/// # Errors
///
/// - 400 for a malformed URL, code, body or client id
/// - 409 if the custom code is taken
/// - 429 with `Retry-After` when the client's window is full
/// - 503 if no free code was found or the store is unavailable
pub async fn create_link_handler(
    State(state): State<AppState>,
    caller: Caller,
    headers: HeaderMap,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let payload = json_body(payload)?;
    payload.validate()?;

    let link = state
        .link_service
        .create_link(&payload.url, payload.custom_code.as_deref(), &caller)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &base_url(&state, &headers))),
    ))
}

/// Points an existing short code at a new target URL.
///
/// # Endpoint
///
/// `PATCH /api/links/{code}`
///
/// Counts against the client's window like creation does. Any caller may
/// rebind any code.
///
/// # Errors
///
/// - 400 for a malformed URL or body
/// - 404 with `suggestion: "create"` if the code does not exist
/// - 429 when the client's window is full
pub async fn rebind_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    caller: Caller,
    headers: HeaderMap,
    payload: Result<Json<UpdateLinkRequest>, JsonRejection>,
) -> Result<Json<LinkResponse>, AppError> {
    let payload = json_body(payload)?;
    payload.validate()?;

    let link = state
        .link_service
        .rebind(&code, &payload.url, &caller)
        .await?;

    Ok(Json(LinkResponse::from_link(
        link,
        &base_url(&state, &headers),
    )))
}
