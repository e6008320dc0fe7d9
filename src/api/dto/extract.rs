//! DTOs for short code extraction.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Scanned text to search for a short code.
#[derive(Debug, Deserialize, Validate)]
pub struct ExtractCodeRequest {
    #[validate(length(max = 4096))]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractCodeResponse {
    /// `null` when the text contains nothing code-like.
    pub code: Option<String>,
}
