//! Caller identification: admin bearer tokens and client ids.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{domain::entities::Caller, error::AppError, state::AppState};

/// Header carrying the anonymous client identifier.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Longest accepted client identifier.
pub const MAX_CLIENT_ID_LEN: usize = 128;

/// Extracts and verifies the bearer token from request parts.
async fn authenticate_bearer(parts: &mut Parts, state: &AppState) -> Result<(), AppError> {
    let AuthBearer(token) = AuthBearer::from_request_parts(parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    state.auth_service.authenticate(&token)
}

/// Admin gate for `/api/admin/*`.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing, malformed, or the
/// token's HMAC does not match the configured admin hash.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    authenticate_bearer(&mut parts, &st).await?;

    let req = Request::from_parts(parts, body);

    Ok(next.run(req).await)
}

/// Validates a client id: 1 to 128 visible ASCII characters.
pub fn validate_client_id(raw: &str) -> Result<&str, AppError> {
    let valid = !raw.is_empty()
        && raw.len() <= MAX_CLIENT_ID_LEN
        && raw.bytes().all(|b| b.is_ascii_graphic());

    if valid { Ok(raw) } else { Err(client_id_error()) }
}

fn client_id_error() -> AppError {
    AppError::invalid_format(
        "Invalid client id",
        json!({
            "header": CLIENT_ID_HEADER,
            "reason": format!("Must be 1-{MAX_CLIENT_ID_LEN} visible ASCII characters"),
        }),
    )
}

/// Resolves the caller of a mutating endpoint.
///
/// A request carrying an `Authorization` header must present the admin token
/// and becomes [`Caller::Admin`]; a wrong token is rejected rather than
/// downgraded. Otherwise the `X-Client-Id` header is required and the request
/// is rate limited under that id.
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.contains_key(header::AUTHORIZATION) {
            authenticate_bearer(parts, state).await?;
            return Ok(Caller::Admin);
        }

        let raw = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .ok_or_else(|| {
                AppError::invalid_format(
                    "Missing client id",
                    json!({ "header": CLIENT_ID_HEADER }),
                )
            })?
            .to_str()
            .map_err(|_| client_id_error())?;

        Ok(Caller::Client(validate_client_id(raw)?.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_client_id() {
        assert!(validate_client_id("a").is_ok());
        assert!(validate_client_id("3f2c9a1e-7b4d-4c8e-9a0f-1b2c3d4e5f60").is_ok());
        assert!(validate_client_id(&"x".repeat(128)).is_ok());

        assert!(validate_client_id("").is_err());
        assert!(validate_client_id(&"x".repeat(129)).is_err());
        assert!(validate_client_id("has space").is_err());
        assert!(validate_client_id("tab\there").is_err());
    }
}
