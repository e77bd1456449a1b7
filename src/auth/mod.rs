pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::User;
use crate::store;

// Re-export necessary items
pub use extractors::AuthSession;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{decode_token, issue_token, sign_token, Claims};

/// Response body for successful registration or sign-in.
///
/// The user serializes through its public representation, so the password
/// hash and the token allow-list never appear here.
#[derive(Debug, Serialize)]
pub struct AuthResponse<'a> {
    pub user: &'a User,
    pub token: String,
}

/// Resolves a raw bearer token into an authenticated session.
///
/// A token is valid only when its signature verifies, its subject user
/// still exists, and the exact token string is present in that user's
/// allow-list. Every failure collapses into the same empty-bodied 401.
pub async fn authenticate(pool: &PgPool, token: &str) -> Result<AuthSession, AppError> {
    let claims = token::decode_token(token)?;

    let user = store::users::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !user.tokens.iter().any(|issued| issued == token) {
        return Err(AppError::Unauthorized);
    }

    Ok(AuthSession {
        user,
        token: token.to_string(),
    })
}
