//! Short code generation and format validation.
//!
//! Codes are 3-20 ASCII alphanumerics. Randomly generated codes are always
//! [`GENERATED_CODE_LENGTH`] symbols drawn uniformly from the 62-symbol
//! alphabet `[A-Za-z0-9]`.

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Length of randomly generated codes.
pub const GENERATED_CODE_LENGTH: usize = 6;

/// Accepted short code format.
pub const CODE_PATTERN: &str = r"^[A-Za-z0-9]{3,20}$";

static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CODE_PATTERN).expect("code pattern is a valid regex"));

/// Generates a random short code of [`GENERATED_CODE_LENGTH`] alphanumerics.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Returns true if `code` matches `^[A-Za-z0-9]{3,20}$`.
pub fn is_valid_code(code: &str) -> bool {
    CODE_REGEX.is_match(code)
}

/// Validates a caller-supplied short code.
///
/// # Errors
///
/// Returns [`AppError::InvalidFormat`] if the code is not 3-20 ASCII
/// letters and digits.
pub fn validate_code(code: &str) -> Result<(), AppError> {
    if is_valid_code(code) {
        return Ok(());
    }

    Err(AppError::invalid_format(
        "Short code must be 3-20 letters or digits",
        json!({ "code": code, "pattern": CODE_PATTERN }),
    ))
}
