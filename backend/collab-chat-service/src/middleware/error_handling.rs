use crate::error::AppError;
use actix_web::{http::StatusCode, HttpResponse};
use error_types::{error_codes, ErrorResponse};

/// Map domain errors to HTTP responses
pub fn map_error(err: &AppError) -> (StatusCode, ErrorResponse) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let (error_type, code) = match err {
        AppError::BadRequest(_) => ("validation_error", error_codes::INVALID_REQUEST),
        AppError::SelfConversation => ("validation_error", error_codes::SELF_CONVERSATION),
        AppError::Unauthorized => ("authentication_error", error_codes::TOKEN_INVALID),
        AppError::Forbidden(_) => ("authorization_error", error_codes::NOT_A_PARTICIPANT),
        AppError::InvalidPairing { .. } => ("authorization_error", error_codes::INVALID_PAIRING),
        AppError::UserNotFound(_) => ("not_found_error", error_codes::USER_NOT_FOUND),
        AppError::NotFound(_) => ("not_found_error", error_codes::CONVERSATION_NOT_FOUND),
        AppError::Database(_) => ("server_error", error_codes::DATABASE_ERROR),
        AppError::Directory(_) => ("server_error", error_codes::DIRECTORY_UNAVAILABLE),
        AppError::Internal(_) | AppError::Config(_) | AppError::StartServer(_) => {
            ("server_error", error_codes::INTERNAL_SERVER_ERROR)
        }
    };

    let message = if err.is_internal() {
        tracing::error!(error = %err, "request failed with internal error");
        "internal server error".to_string()
    } else {
        err.to_string()
    };

    let response = ErrorResponse::new(
        status.canonical_reason().unwrap_or("Error"),
        &message,
        status.as_u16(),
        error_type,
        code,
    );

    (status, response)
}

pub fn into_response(err: &AppError) -> HttpResponse {
    let (status, response) = map_error(err);
    HttpResponse::build(status).json(response)
}
