//!
//! # Error Handling
//!
//! This module defines `AppError`, the single error type returned by handlers,
//! extractors, stores and the authorization chain.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so a handler can
//! return `Result<_, AppError>` and the framework renders the matching status
//! with a `{"error": "..."}` body. Server-side failures (`InternalServerError`,
//! `DatabaseError`) are logged with their detail and rendered with a generic
//! message so no internals leak to the client.
//!
//! `From` implementations exist for `sqlx::Error`, `validator::ValidationErrors`,
//! `bcrypt::BcryptError`, `TokenError` and `HttpError`, allowing the `?` operator throughout.

use actix_web::{
    error::{HttpError, ResponseError},
    http::StatusCode,
    HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::TokenError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid or expired credentials, or no resolvable current user (HTTP 401).
    Unauthorized(String),
    /// The caller is known but does not own the resource and is not an admin (HTTP 403).
    Forbidden(String),
    /// Malformed input or a body that failed to bind (HTTP 400).
    BadRequest(String),
    /// The resource, or one of its parents on the request path, does not exist (HTTP 404).
    NotFound(String),
    /// A unique field (the username) is already taken (HTTP 409).
    Conflict(String),
    /// An unexpected server-side failure, e.g. token signing (HTTP 500).
    InternalServerError(String),
    /// A storage failure or a storage call that exceeded its deadline (HTTP 500).
    DatabaseError(String),
    /// A field failed its policy (username, password, email, lengths) (HTTP 400).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::InternalServerError(detail) | AppError::DatabaseError(detail) => {
                log::error!("{}", detail);
                "internal server error"
            }
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, a unique-constraint violation becomes
/// `Conflict`, anything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        if let sqlx::Error::RowNotFound = error {
            return AppError::NotFound("Record not found".into());
        }
        let unique_violation = error
            .as_database_error()
            .map(|db_err| db_err.is_unique_violation())
            .unwrap_or(false);
        if unique_violation {
            AppError::Conflict("Record already exists".into())
        } else {
            AppError::DatabaseError(error.to_string())
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Signing(msg) => {
                AppError::InternalServerError(format!("Failed to sign token: {}", msg))
            }
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<HttpError> for AppError {
    fn from(error: HttpError) -> AppError {
        AppError::InternalServerError(format!("Failed to build response: {}", error))
    }
}
