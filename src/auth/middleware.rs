use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::authenticate;
use crate::error::AppError;

/// The auth gate.
///
/// Wrapped around the whole app; public routes pass straight through.
/// Everything else must present `Authorization: Bearer <token>`. The token's
/// signature is verified and the token is checked against the subject
/// user's allow-list, so a signed-out token is rejected even though its
/// signature still verifies. On success the resolved session is placed in
/// request extensions for the `AuthSession` extractor; on any failure the
/// request short-circuits with an empty 401 and the handler never runs.
pub struct AuthMiddleware;

/// Routes reachable without a token: health check, registration, sign-in
/// and the public avatar fetch.
fn is_public(req: &ServiceRequest) -> bool {
    let path = req.path();
    let method = req.method();

    path == "/health"
        || (path == "/users" && method == Method::POST)
        || path == "/users/signin"
        || (method == Method::GET && path.starts_with("/users/") && path.ends_with("/avatar"))
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public(&req) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        // The allow-list check needs the database, so the verification is
        // awaited before the inner service is called.
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let token = bearer_token(&req).ok_or(AppError::Unauthorized)?;

            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| AppError::Internal("Database pool missing from app data".into()))?;

            let session = authenticate(&pool, &token).await?;
            req.extensions_mut().insert(session);

            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    fn service_request(method: Method, path: &str) -> ServiceRequest {
        test::TestRequest::default()
            .method(method)
            .uri(path)
            .to_srv_request()
    }

    #[actix_rt::test]
    async fn test_public_route_matching() {
        assert!(is_public(&service_request(Method::GET, "/health")));
        assert!(is_public(&service_request(Method::POST, "/users")));
        assert!(is_public(&service_request(Method::POST, "/users/signin")));
        assert!(is_public(&service_request(
            Method::GET,
            "/users/7b69fc6e-0000-0000-0000-000000000000/avatar"
        )));

        // Everything else goes through the gate.
        assert!(!is_public(&service_request(Method::GET, "/users")));
        assert!(!is_public(&service_request(Method::GET, "/users/me")));
        assert!(!is_public(&service_request(Method::POST, "/users/signout")));
        assert!(!is_public(&service_request(
            Method::POST,
            "/users/me/avatar"
        )));
        assert!(!is_public(&service_request(
            Method::DELETE,
            "/users/me/avatar"
        )));
        assert!(!is_public(&service_request(Method::GET, "/tasks")));
        assert!(!is_public(&service_request(Method::POST, "/tasks")));
    }

    #[actix_rt::test]
    async fn test_bearer_token_extraction() {
        let req = test::TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_srv_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));

        let req = test::TestRequest::default()
            .insert_header(("Authorization", "Basic abc"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), None);

        let req = test::TestRequest::default().to_srv_request();
        assert_eq!(bearer_token(&req), None);
    }
}
