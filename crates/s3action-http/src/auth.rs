//! Static API-key check.
//!
//! The check is only active when a key is configured. The key is accepted
//! from `X-API-Key` or from `Authorization: Bearer <key>`.

use http::HeaderMap;
use s3action_model::error::ActionError;
use subtle::ConstantTimeEq;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extract the caller's API key from the request headers.
#[must_use]
pub fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key.trim());
    }
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Verify the request against the configured key.
///
/// # Errors
///
/// `Unauthorized` if a key is configured and the request does not carry it.
pub fn verify_api_key(headers: &HeaderMap, expected: Option<&str>) -> Result<(), ActionError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    match extract_api_key(headers) {
        Some(provided) if provided.as_bytes().ct_eq(expected.as_bytes()).into() => Ok(()),
        _ => Err(ActionError::unauthorized()),
    }
}
