//! Error handling - RFC 7807 problem responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use portal_core::DomainError;
use portal_shared::ErrorResponse;
use thiserror::Error;

use crate::observability::current_request_id;

/// Application-level error type rendered as a problem document.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn problem(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized().with_detail(detail),
            AppError::Forbidden(detail) => ErrorResponse::forbidden(detail),
            AppError::Duplicate(detail) => ErrorResponse::duplicate(detail),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Internal(_) => ErrorResponse::internal_error(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Duplicate(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Internal(detail) => tracing::error!(error = %detail, "Internal error"),
            AppError::Forbidden(detail) => tracing::warn!(reason = %detail, "Request forbidden"),
            other => tracing::debug!(error = %other, "Request rejected"),
        }

        let mut problem = self.problem();
        if let Some(request_id) = current_request_id() {
            problem = problem.with_request_id(request_id);
        }
        HttpResponse::build(self.status_code()).json(problem)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => AppError::NotFound(err.to_string()),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Duplicate(msg) => AppError::Duplicate(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::Unauthorized => AppError::Unauthorized("Authentication required".to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::not_found("Post", Uuid::new_v4()), StatusCode::NOT_FOUND),
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::Duplicate("dup".into()), StatusCode::CONFLICT),
            (DomainError::Conflict("used".into()), StatusCode::CONFLICT),
            (DomainError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (DomainError::Unauthorized, StatusCode::UNAUTHORIZED),
            (DomainError::Internal("db".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let problem = AppError::Internal("password=hunter2".into()).problem();
        assert_eq!(problem.code, "INTERNAL");
        assert!(problem.detail.is_none());
    }

    #[test]
    fn test_duplicate_and_conflict_keep_distinct_codes() {
        assert_eq!(AppError::Duplicate("x".into()).problem().code, "DUPLICATE");
        assert_eq!(AppError::Conflict("x".into()).problem().code, "CONFLICT");
    }
}
