//! Handler for pulling a short code out of scanned text.

use axum::{Json, extract::rejection::JsonRejection};
use validator::Validate;

use super::json_body;
use crate::api::dto::extract::{ExtractCodeRequest, ExtractCodeResponse};
use crate::error::AppError;
use crate::utils::extract_code::extract_code;

/// Extracts a short code from a full short URL, a bare code, or free text.
///
/// # Endpoint
///
/// `POST /api/codes/extract`
///
/// ```json
/// { "text": "https://s.example.com/Ab3dE9" }
/// ```
///
/// Responds with `{"code": "Ab3dE9"}`, or `{"code": null}` when nothing
/// code-like is present. The code is not looked up.
pub async fn extract_code_handler(
    payload: Result<Json<ExtractCodeRequest>, JsonRejection>,
) -> Result<Json<ExtractCodeResponse>, AppError> {
    let payload = json_body(payload)?;
    payload.validate()?;

    Ok(Json(ExtractCodeResponse {
        code: extract_code(&payload.text),
    }))
}
