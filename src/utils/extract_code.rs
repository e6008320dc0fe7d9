//! Short code extraction from scanned text such as QR code payloads.

use url::Url;

use super::code_generator::is_valid_code;

/// Pulls a short code out of arbitrary scanned text.
///
/// Tried in order:
///
/// 1. A full short URL (`https://host/Ab3dE9`) yields its path
/// 2. A bare code yields itself
///
/// Anything else, including URLs whose path is not a single valid code,
/// yields `None`.
pub fn extract_code(text: &str) -> Option<String> {
    let text = text.trim();

    if text.contains("://")
        && let Ok(url) = Url::parse(text)
    {
        let path = url.path().trim_start_matches('/');
        if is_valid_code(path) {
            return Some(path.to_string());
        }
    }

    is_valid_code(text).then(|| text.to_string())
}
