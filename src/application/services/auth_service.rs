//! Admin bearer-token verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw admin token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. The admin CLI uses this
/// to produce the `ADMIN_TOKEN_HASH` value.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies the bearer token that marks a caller as admin.
///
/// Only the HMAC of the admin token is configured, so reading the service
/// environment does not reveal a usable token. Comparison is constant-time.
pub struct AuthService {
    signing_secret: String,
    expected_mac: Vec<u8>,
}

impl AuthService {
    /// Creates the service from the signing secret and the hex-encoded MAC of
    /// the admin token.
    ///
    /// # Errors
    ///
    /// Returns an error if `admin_token_hash` is not valid hex.
    pub fn new(signing_secret: String, admin_token_hash: &str) -> Result<Self, hex::FromHexError> {
        let expected_mac = hex::decode(admin_token_hash.trim())?;

        Ok(Self {
            signing_secret,
            expected_mac,
        })
    }

    /// Authenticates a raw bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token does not match.
    pub fn authenticate(&self, token: &str) -> Result<(), AppError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());

        mac.verify_slice(&self.expected_mac).map_err(|_| {
            tracing::warn!("Rejected admin token");
            AppError::unauthorized("Unauthorized", json!({ "reason": "Invalid admin token" }))
        })
    }
}
