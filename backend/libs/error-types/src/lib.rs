//! Shared error response envelope for Collab HTTP services.
//!
//! Every service renders failures as an [`ErrorResponse`] so clients can route on
//! `type` and localize on `code` without parsing free-form messages.

use serde::{Deserialize, Serialize};

/// Unified API error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short HTTP reason phrase, e.g. "Forbidden"
    pub error: String,

    /// Human readable message. Never carries storage internals for server errors.
    pub message: String,

    /// HTTP status code
    pub status: u16,

    /// Error category for client-side routing:
    /// - "validation_error"
    /// - "authentication_error"
    /// - "authorization_error"
    /// - "not_found_error"
    /// - "server_error"
    #[serde(rename = "type")]
    pub error_type: String,

    /// Stable machine code, e.g. "INVALID_PAIRING"
    pub code: String,

    /// Correlation id for log lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            trace_id: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: String) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

/// Standard error codes
pub mod error_codes {
    // Request validation
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

    // Authentication
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";

    // Authorization
    pub const NOT_A_PARTICIPANT: &str = "NOT_A_PARTICIPANT";
    pub const INVALID_PAIRING: &str = "INVALID_PAIRING";
    pub const SELF_CONVERSATION: &str = "SELF_CONVERSATION";

    // Lookup
    pub const CONVERSATION_NOT_FOUND: &str = "CONVERSATION_NOT_FOUND";
    pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";

    // Server
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const DIRECTORY_UNAVAILABLE: &str = "DIRECTORY_UNAVAILABLE";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}
