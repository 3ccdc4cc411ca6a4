use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use crate::constants::{
    CODE_BACKEND_OPERATION_FAILED, CODE_BACKEND_UNAVAILABLE, CODE_BAD_REQUEST,
    CODE_BUG_NOT_FOUND, CODE_REQUEST_CANCELLED, CODE_VALIDATION_FAILED, ERR_REQUEST_CANCELLED,
    ERR_VALIDATION_FAILED,
};
use crate::models::ErrorResponse;

/// Non-standard status used by proxies for "client closed request".
const STATUS_CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    ValidationFailed(Vec<String>),
    BadRequest(String),
    BackendUnavailable(String),
    BackendOperationFailed(String),
    Cancelled,
}

impl ApiError {
    /// Machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => CODE_BUG_NOT_FOUND,
            ApiError::ValidationFailed(_) => CODE_VALIDATION_FAILED,
            ApiError::BadRequest(_) => CODE_BAD_REQUEST,
            ApiError::BackendUnavailable(_) => CODE_BACKEND_UNAVAILABLE,
            ApiError::BackendOperationFailed(_) => CODE_BACKEND_OPERATION_FAILED,
            ApiError::Cancelled => CODE_REQUEST_CANCELLED,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::NotFound(message)
            | ApiError::BadRequest(message)
            | ApiError::BackendUnavailable(message)
            | ApiError::BackendOperationFailed(message) => message.clone(),
            ApiError::ValidationFailed(_) => ERR_VALIDATION_FAILED.to_string(),
            ApiError::Cancelled => ERR_REQUEST_CANCELLED.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(message) => write!(f, "Not Found: {}", message),
            ApiError::ValidationFailed(errors) => write!(f, "Validation Failed: {:?}", errors),
            ApiError::BadRequest(message) => write!(f, "Bad Request: {}", message),
            ApiError::BackendUnavailable(message) => {
                write!(f, "Backend Unavailable: {}", message)
            }
            ApiError::BackendOperationFailed(message) => {
                write!(f, "Backend Operation Failed: {}", message)
            }
            ApiError::Cancelled => write!(f, "Cancelled: {}", ERR_REQUEST_CANCELLED),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            // Backend failures are reported as bad requests; transient and
            // permanent failures are not told apart.
            ApiError::ValidationFailed(_)
            | ApiError::BadRequest(_)
            | ApiError::BackendUnavailable(_)
            | ApiError::BackendOperationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Cancelled => StatusCode::from_u16(STATUS_CLIENT_CLOSED_REQUEST)
                .unwrap_or(StatusCode::BAD_REQUEST),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let errors = match self {
            ApiError::ValidationFailed(errors) => Some(errors.clone()),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            code: self.code().to_string(),
            message: self.message(),
            errors,
        })
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match *err.kind {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::DnsResolve { .. } => {
                ApiError::BackendUnavailable(err.to_string())
            }
            _ => ApiError::BackendOperationFailed(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                ApiError::BackendUnavailable(err.to_string())
            }
            _ => ApiError::BackendOperationFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ApiError::BackendUnavailable(err.to_string())
        } else {
            ApiError::BackendOperationFailed(err.to_string())
        }
    }
}
