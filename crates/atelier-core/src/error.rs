//! Sync error handling
//!
//! Provides typed errors for the sync subsystem. Every boundary operation
//! normalizes these into a `SyncResult` envelope; no error crosses the
//! subsystem boundary as a panic or an untyped fault.

use thiserror::Error;

/// Maximum number of characters of a remote error body kept for diagnostics
pub const ERROR_BODY_LIMIT: usize = 200;

/// Errors that can occur during sync operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Caller presented no token, or a malformed authorization header
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Caller is authenticated but lacks the admin role
    #[error("Admin role required: {0}")]
    Forbidden(String),

    /// Request is missing required fields or carries an unknown action
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Local record has no remote linkage, so there is nothing to push to
    #[error("Record is not linked to a Notion page")]
    LinkageMissing,

    /// The remote service answered with a non-2xx status or an unusable body
    #[error("{0}")]
    Remote(String),

    /// Network-level failure before a response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local store failure (settings, projects, operators)
    #[error("Store error: {0}")]
    Store(String),
}

impl SyncError {
    /// Normalize a failed remote response into the diagnostic form
    /// `"<status>: <first 200 chars of body>"`
    pub fn from_response(status: u16, body: &str) -> Self {
        SyncError::Remote(format!("{}: {}", status, truncate_body(body)))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

impl From<rusqlite::Error> for SyncError {
    fn from(err: rusqlite::Error) -> Self {
        SyncError::Store(err.to_string())
    }
}

/// Truncate a raw error body to the diagnostic limit, on a char boundary
pub fn truncate_body(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_short_body() {
        let err = SyncError::from_response(500, "internal error");
        assert_eq!(err.to_string(), "500: internal error");
    }

    #[test]
    fn test_from_response_truncates_long_body() {
        let body = "x".repeat(500);
        let err = SyncError::from_response(502, &body);
        let msg = err.to_string();
        assert!(msg.starts_with("502: "));
        assert_eq!(msg.len(), "502: ".len() + ERROR_BODY_LIMIT);
    }

    #[test]
    fn test_truncate_body_char_boundary() {
        // Multibyte characters must not be split mid-codepoint
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert_eq!(cut.chars().count(), ERROR_BODY_LIMIT);
    }

    #[test]
    fn test_transport_from_reqwest_is_normalized() {
        // Any reqwest failure becomes a Transport message, never a panic
        let err = SyncError::Transport("dns failure".to_string());
        assert!(err.to_string().contains("dns failure"));
    }
}
