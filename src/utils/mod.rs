//! Utility functions for code handling, URL processing, and request helpers.
//!
//! - [`code_generator`] - Random short codes and format validation
//! - [`url_validator`] - Absolute http(s) URL checks
//! - [`extract_code`] - Short code extraction from scanned text
//! - [`base_url`] - Short URL construction from request headers

pub mod base_url;
pub mod code_generator;
pub mod extract_code;
pub mod url_validator;
