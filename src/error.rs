//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! various error conditions that can occur, from database issues to validation failures.
//!
//! `AppError` implements `actix_web::error::ResponseError` to seamlessly convert
//! application errors into appropriate HTTP responses. Validation and sign-in
//! failures carry a JSON `{error: message}` body; 401 and 404 responses are
//! deliberately empty so that nothing about resource existence or ownership
//! leaks to the caller.
//!
//! `From` trait implementations for common error types like `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error`, and
//! `bcrypt::BcryptError` allow easy conversion using the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// The auth gate rejected the request (HTTP 401, empty body).
    /// Missing, malformed, unverifiable, or revoked bearer token.
    Unauthorized,
    /// A sign-in attempt failed (HTTP 400).
    /// The same generic message is used for unknown email and wrong password.
    Auth(String),
    /// Input failed validation or contained disallowed fields (HTTP 400).
    Validation(String),
    /// The requested resource is absent or not owned by the caller (HTTP 404, empty body).
    NotFound,
    /// An unexpected server-side error (HTTP 500).
    Internal(String),
    /// An error originating from database operations (HTTP 500).
    Database(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Auth(msg) => write!(f, "Authentication failed: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::NotFound => write!(f, "Not Found"),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Auth(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized => HttpResponse::Unauthorized().finish(),
            AppError::Auth(msg) => HttpResponse::BadRequest().json(json!({ "error": msg })),
            AppError::Validation(msg) => HttpResponse::BadRequest().json(json!({ "error": msg })),
            AppError::NotFound => HttpResponse::NotFound().finish(),
            AppError::Internal(msg) => {
                HttpResponse::InternalServerError().json(json!({ "error": msg }))
            }
            AppError::Database(msg) => {
                HttpResponse::InternalServerError().json(json!({ "error": msg }))
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; every other
/// database failure becomes `AppError::Database`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound,
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`,
/// preserving the detailed field messages.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Converts JWT processing failures into the empty-bodied 401.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
///
/// Hashing or verification only fails on malformed stored hashes or
/// resource exhaustion, never on an ordinary wrong password.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("Password processing failed: {}", error))
    }
}

/// Converts multipart stream failures into a 400 with an `{error}` body.
impl From<actix_multipart::MultipartError> for AppError {
    fn from(error: actix_multipart::MultipartError) -> AppError {
        AppError::Validation(format!("Invalid multipart payload: {}", error))
    }
}
