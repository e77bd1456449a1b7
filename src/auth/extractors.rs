use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::User;

/// The authenticated session resolved by the auth gate.
///
/// Carries both the user record and the exact token the request presented,
/// so that signout can revoke precisely that token.
///
/// This extractor is intended for routes protected by `AuthMiddleware`,
/// which validates the bearer token against the user's allow-list and
/// inserts the session into request extensions. If the session is missing
/// (middleware not applied, or applied after this route), the extractor
/// fails with the empty-bodied 401.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

impl FromRequest for AuthSession {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthSession>().cloned() {
            Some(session) => ready(Ok(session)),
            None => ready(Err(AppError::Unauthorized.into())),
        }
    }
}
