//! Error mapping for HTTP responses
//!
//! Converts a non-success response from the incident service into a
//! normalized `SyncError`.

use serde_json::Value;

use super::SyncError;
use crate::util::truncate_string;

/// Longest raw body quoted in an error message
const MAX_BODY_IN_MESSAGE: usize = 100;

/// Map a non-success HTTP response to a SyncError
pub fn map_http_error(status: u16, body: &str) -> SyncError {
    // Prefer a message the server put in a JSON body
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let message = json
            .get("message")
            .or_else(|| json.get("error"))
            .and_then(|m| m.as_str());

        if let Some(message) = message {
            return SyncError::http(status, message);
        }
    }

    let message = if body.trim().is_empty() {
        format!("{} response", classify_status(status))
    } else {
        truncate_string(body.trim(), MAX_BODY_IN_MESSAGE)
    };

    SyncError::http(status, message)
}

/// Helper function to classify HTTP statuses by category
pub fn classify_status(status: u16) -> &'static str {
    match status {
        400 => "validation",
        401 => "authentication",
        403 => "authorization",
        404 => "not_found",
        408 => "timeout",
        409 => "conflict",
        429 => "rate_limit",
        500..=599 => "server",
        _ => "unknown",
    }
}

/// Determine if an HTTP status indicates a server-side (retryable) failure
pub fn is_retryable_status(status: u16) -> bool {
    status >= 500
}
