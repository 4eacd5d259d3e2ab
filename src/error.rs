use actix_web::{error, http::StatusCode, HttpResponse};
use thiserror::Error;
use crate::models::{BookingStatus, ErrorResponse};
use crate::services::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-visible failures
///
/// Every variant maps to a distinct HTTP status. Storage failures are logged
/// with their cause and reported without internal detail.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Booking cannot move from {from} to {to}")]
    InvalidState {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(what.to_string())
    }

    pub fn forbidden(why: &str) -> Self {
        ServiceError::Forbidden(why.to_string())
    }

    fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::InvalidState { .. } => "invalid_state",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::Validation(_) => "validation_failed",
            ServiceError::Storage(_) => "storage_error",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => ServiceError::Conflict(what),
            other => {
                tracing::error!("Store operation failed: {}", other);
                ServiceError::Storage("backing store unavailable".to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}

impl error::ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) | ServiceError::InvalidState { .. } => StatusCode::CONFLICT,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ServiceError::Validation(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    ServiceError::Validation(format!("Invalid query: {}", err)).into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    ServiceError::Validation(format!("Invalid path: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_status_codes_are_distinct_per_kind() {
        assert_eq!(ServiceError::not_found("Booking").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::forbidden("owner only").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServiceError::Conflict("Vendor profile already exists".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::InvalidState {
                from: BookingStatus::Accepted,
                to: BookingStatus::Declined,
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ServiceError::Unauthorized("Not authenticated".into()).status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_duplicate_store_error_becomes_conflict() {
        let err: ServiceError = StoreError::Duplicate("Vendor profile already exists".into()).into();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn test_invalid_state_message() {
        let err = ServiceError::InvalidState {
            from: BookingStatus::Accepted,
            to: BookingStatus::Accepted,
        };
        assert_eq!(err.to_string(), "Booking cannot move from accepted to accepted");
    }
}
