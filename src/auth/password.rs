use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};
use std::borrow::Cow;
use validator::ValidationError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}

/// Rejects passwords that literally contain the word "password", in any
/// casing. Used as a `validator` custom rule on registration and profile
/// update payloads.
pub fn validate_password_content(password: &str) -> Result<(), ValidationError> {
    if password.to_lowercase().contains("password") {
        let mut error = ValidationError::new("forbidden_password");
        error.message = Some(Cow::from("Password must not contain the word \"password\""));
        return Err(error);
    }
    Ok(())
}
