//! Application error type and its HTTP representation.
//!
//! Every fallible operation in the service layer returns [`AppError`]. Handlers
//! propagate it with `?` and axum turns it into a JSON body of the form:
//!
//! ```json
//! { "error": { "code": "already_exists", "message": "...", "details": {} } }
//! ```

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed short code, URL or client identifier. Not retried.
    #[error("{message}")]
    InvalidFormat { message: String, details: Value },

    /// The short code is already taken; the caller should switch to update.
    #[error("{message}")]
    AlreadyExists { message: String, details: Value },

    /// The target of an update/delete/redirect does not exist.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The client exhausted its attempt budget for the current window.
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64, details: Value },

    /// Random generation kept colliding; transient, safe to retry.
    #[error("{message}")]
    AllocationExhausted { message: String, details: Value },

    /// The record store failed or timed out; transient, safe to retry with backoff.
    #[error("{message}")]
    StoreUnavailable { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn invalid_format(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidFormat {
            message: message.into(),
            details,
        }
    }

    pub fn already_exists(message: impl Into<String>, details: Value) -> Self {
        Self::AlreadyExists {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimited {
            retry_after_secs,
            details: json!({ "retry_after_secs": retry_after_secs }),
        }
    }

    pub fn allocation_exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::AllocationExhausted {
            message: message.into(),
            details,
        }
    }

    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidFormat { .. } => StatusCode::BAD_REQUEST,
            Self::AlreadyExists { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::AllocationExhausted { .. } | Self::StoreUnavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code used in the JSON body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat { .. } => "invalid_format",
            Self::AlreadyExists { .. } => "already_exists",
            Self::NotFound { .. } => "not_found",
            Self::RateLimited { .. } => "rate_limited",
            Self::AllocationExhausted { .. } => "allocation_exhausted",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Returns true for failures the caller may retry as-is.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::AllocationExhausted { .. } | Self::StoreUnavailable { .. }
        )
    }

    fn details(&self) -> &Value {
        match self {
            Self::InvalidFormat { details, .. }
            | Self::AlreadyExists { details, .. }
            | Self::NotFound { details, .. }
            | Self::RateLimited { details, .. }
            | Self::AllocationExhausted { details, .. }
            | Self::StoreUnavailable { details, .. }
            | Self::Unauthorized { details, .. }
            | Self::Internal { details, .. } => details,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            details: self.details().clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::StoreUnavailable { .. } | Self::Internal { .. } => {
                tracing::error!(error = %self, details = %self.details(), "Request failed");
            }
            Self::AllocationExhausted { .. } => {
                tracing::warn!(error = %self, "Short code allocation exhausted");
            }
            _ => {}
        }

        let retry_after = match &self {
            Self::RateLimited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();

        if let Some(secs) = retry_after
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }

        response
    }
}

/// Maps store errors: unique violations become [`AppError::AlreadyExists`],
/// everything else is treated as the store being unavailable.
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::already_exists(
                "Short code already exists",
                json!({ "constraint": db.constraint(), "suggestion": "update" }),
            );
        }

        AppError::store_unavailable("Record store error", json!({ "reason": e.to_string() }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();

        AppError::invalid_format(
            "Request validation failed",
            json!({ "fields": fields, "reason": errors.to_string() }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::invalid_format("x", json!({})).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::already_exists("x", json!({})).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::not_found("x", json!({})).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::rate_limited(10).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::allocation_exhausted("x", json!({})).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::store_unavailable("x", json!({})).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::unauthorized("x", json!({})).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_transient_errors() {
        assert!(AppError::store_unavailable("x", json!({})).is_transient());
        assert!(AppError::allocation_exhausted("x", json!({})).is_transient());
        assert!(!AppError::rate_limited(1).is_transient());
        assert!(!AppError::not_found("x", json!({})).is_transient());
    }

    #[test]
    fn test_rate_limited_sets_retry_after_header() {
        let response = AppError::rate_limited(120).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "120"
        );
    }

    #[test]
    fn test_error_info_carries_details() {
        let err = AppError::already_exists("taken", json!({ "code": "abc" }));
        let info = err.to_error_info();

        assert_eq!(info.code, "already_exists");
        assert_eq!(info.message, "taken");
        assert_eq!(info.details["code"], "abc");
    }

    #[test]
    fn test_non_database_sqlx_error_is_store_unavailable() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }
}
