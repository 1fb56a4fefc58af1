use crate::middleware::error_handling;
use crate::models::UserRole;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(AppError::status_code(self))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        error_handling::into_response(self)
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("conversations are only allowed between a brand and a creator ({initiator} -> {participant})")]
    InvalidPairing {
        initiator: UserRole,
        participant: UserRole,
    },

    #[error("cannot start a conversation with yourself")]
    SelfConversation,

    #[error("{0}")]
    NotFound(String),

    #[error("user {0} not found")]
    UserNotFound(uuid::Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("directory error: {0}")]
    Directory(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_a_participant() -> Self {
        AppError::Forbidden("not a participant of this conversation".into())
    }

    pub fn conversation_not_found(id: &str) -> Self {
        AppError::NotFound(format!("conversation {id} not found"))
    }

    /// Internal kinds never expose their detail to callers
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Database(_)
                | AppError::Directory(_)
                | AppError::Internal(_)
                | AppError::Config(_)
                | AppError::StartServer(_)
        )
    }

    /// Returns whether this error is retryable (e.g., database connection timeout).
    /// The service never retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Database(e) => {
                matches!(
                    e,
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
                )
            }
            AppError::Directory(_) => true,
            _ => false,
        }
    }

    /// Returns HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) | AppError::SelfConversation => 400,
            AppError::Unauthorized => 401,
            AppError::Forbidden(_) | AppError::InvalidPairing { .. } => 403,
            AppError::NotFound(_) | AppError::UserNotFound(_) => 404,
            AppError::Database(_)
            | AppError::Directory(_)
            | AppError::Internal(_)
            | AppError::Config(_)
            | AppError::StartServer(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(AppError::SelfConversation.status_code(), 400);
        assert_eq!(AppError::not_a_participant().status_code(), 403);
        assert_eq!(
            AppError::InvalidPairing {
                initiator: UserRole::Brand,
                participant: UserRole::Brand,
            }
            .status_code(),
            403
        );
        assert_eq!(AppError::conversation_not_found("a_b").status_code(), 404);
        assert_eq!(AppError::UserNotFound(uuid::Uuid::nil()).status_code(), 404);
        assert_eq!(AppError::Database(sqlx::Error::RowNotFound).status_code(), 500);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(AppError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!AppError::Database(sqlx::Error::RowNotFound).is_retryable());
        assert!(!AppError::not_a_participant().is_retryable());
        assert!(!AppError::Internal("user has unknown role".into()).is_retryable());
        assert!(AppError::Directory("connection reset".into()).is_retryable());
    }

    #[test]
    fn test_internal_classification() {
        assert!(AppError::Directory("timeout".into()).is_internal());
        assert!(!AppError::SelfConversation.is_internal());
    }
}
