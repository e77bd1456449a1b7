use crate::error::AppError;
use crate::store;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Claims encoded within a session token.
///
/// Tokens carry no expiry: a token stays valid until it is removed from the
/// owning user's allow-list, so revocation is the only way a token dies.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: Uuid,
    /// Issue timestamp (seconds since epoch). Makes repeated logins
    /// produce distinct token strings.
    pub iat: usize,
}

fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET").map_err(|_| AppError::Internal("JWT_SECRET not set".into()))
}

/// Signs a session token for the given user id.
///
/// Requires the `JWT_SECRET` environment variable. Signing alone does not
/// make the token usable; it must also be appended to the user's
/// allow-list, which is what [`issue_token`] does.
pub fn sign_token(user_id: Uuid) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id,
        iat: chrono::Utc::now().timestamp() as usize,
    };

    let secret = jwt_secret()?;

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Verifies a token's signature and decodes its claims.
///
/// This is the cryptographic half of verification only; the caller must
/// still check the token against the subject user's allow-list. Any
/// malformed or wrongly-signed token yields the empty-bodied 401.
pub fn decode_token(token: &str) -> Result<Claims, AppError> {
    let secret = jwt_secret()?;

    let mut validation = Validation::new(Algorithm::HS256);
    // No exp claim in these tokens; revocation happens via the allow-list.
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// Signs a new token and appends it to the user's allow-list.
pub async fn issue_token(pool: &PgPool, user_id: Uuid) -> Result<String, AppError> {
    let token = sign_token(user_id)?;
    store::users::append_token(pool, user_id, &token).await?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref JWT_ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    }

    // Helper to run test logic with a temporarily set JWT_SECRET
    fn run_with_temp_jwt_secret<F>(secret_value: &str, test_logic: F)
    where
        F: FnOnce(),
    {
        let _guard = JWT_ENV_LOCK.lock().unwrap();

        let original_secret_val = std::env::var("JWT_SECRET").ok();
        std::env::set_var("JWT_SECRET", secret_value);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(test_logic));

        if let Some(original) = original_secret_val {
            std::env::set_var("JWT_SECRET", original);
        } else {
            std::env::remove_var("JWT_SECRET");
        }

        if let Err(panic_payload) = result {
            std::panic::resume_unwind(panic_payload);
        }
    }

    #[test]
    fn test_token_signing_and_decoding() {
        run_with_temp_jwt_secret("test_secret_for_sign_decode", || {
            let user_id = Uuid::new_v4();
            let token = sign_token(user_id).unwrap();
            let claims = decode_token(&token).unwrap();
            assert_eq!(claims.sub, user_id);
        });
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let token = {
            let mut forged = None;
            run_with_temp_jwt_secret("secret_a", || {
                forged = Some(sign_token(Uuid::new_v4()).unwrap());
            });
            forged.unwrap()
        };

        run_with_temp_jwt_secret("secret_b", || match decode_token(&token) {
            Err(AppError::Unauthorized) => {}
            Ok(_) => panic!("Token signed with another secret should be rejected"),
            Err(e) => panic!("Unexpected error type: {:?}", e),
        });
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        run_with_temp_jwt_secret("test_secret_for_garbage", || {
            match decode_token("not-a-jwt-at-all") {
                Err(AppError::Unauthorized) => {}
                Ok(_) => panic!("Garbage token should be rejected"),
                Err(e) => panic!("Unexpected error type: {:?}", e),
            }
        });
    }

    #[test]
    fn test_repeated_signing_yields_usable_tokens() {
        run_with_temp_jwt_secret("test_secret_for_repeat", || {
            let user_id = Uuid::new_v4();
            let first = sign_token(user_id).unwrap();
            let second = sign_token(user_id).unwrap();
            assert_eq!(decode_token(&first).unwrap().sub, user_id);
            assert_eq!(decode_token(&second).unwrap().sub, user_id);
        });
    }
}
