use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Rejects empty and whitespace-only names. Handlers store the trimmed
/// value, so the name must be non-empty after trimming too.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut error = ValidationError::new("blank_name");
        error.message = Some(Cow::from("Name is required"));
        return Err(error);
    }
    Ok(())
}

/// A user account as stored in the database.
///
/// `password_hash`, `tokens` and `avatar` never appear in JSON output;
/// every external representation of a user excludes them.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: i32,
    /// Allow-list of currently valid session tokens, oldest first.
    #[serde(skip_serializing)]
    pub tokens: Vec<String>,
    #[serde(skip_serializing)]
    pub avatar: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /users` (registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom = "validate_name")]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        custom = "crate::auth::password::validate_password_content"
    )]
    pub password: String,
    /// Defaults to 0 when omitted.
    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: Option<i32>,
}

/// Payload for `POST /users/signin`.
///
/// No format validation here: a malformed email simply never matches an
/// account and falls into the same generic sign-in failure.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Payload for `PATCH /users/me`.
///
/// The allowed fields are exactly name, email, password and age. Any other
/// key in the request body fails deserialization, which rejects the whole
/// update before anything is applied.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    #[validate(custom = "validate_name")]
    pub name: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters long"),
        custom = "crate::auth::password::validate_password_content"
    )]
    pub password: Option<String>,
    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: Option<i32>,
}

impl UserUpdate {
    /// True when the payload carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.age.is_none()
    }
}
