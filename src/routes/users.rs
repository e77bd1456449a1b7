use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use futures::TryStreamExt;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{hash_password, issue_token, verify_password, AuthResponse, AuthSession},
    avatar,
    error::AppError,
    models::{RegisterRequest, SigninRequest, UserUpdate},
    store,
};

/// Register a new user
///
/// Creates the account, issues a first session token and returns both.
#[post("")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let name = register_data.name.trim().to_string();
    let email = register_data.email.trim().to_lowercase();
    let age = register_data.age.unwrap_or(0);

    // Check if email already exists
    if store::users::find_by_email(&pool, &email).await?.is_some() {
        return Err(AppError::Validation("Email already registered".into()));
    }

    let password_hash = hash_password(&register_data.password)?;

    let user = store::users::insert(&pool, &name, &email, &password_hash, age).await?;
    let token = issue_token(&pool, user.id).await?;

    Ok(HttpResponse::Created().json(AuthResponse { user: &user, token }))
}

/// Sign in an existing user
///
/// Unknown email and wrong password produce the same generic 400, so a
/// caller cannot probe which addresses are registered.
#[post("/signin")]
pub async fn signin(
    pool: web::Data<PgPool>,
    signin_data: web::Json<SigninRequest>,
) -> Result<impl Responder, AppError> {
    let email = signin_data.email.trim().to_lowercase();

    let user = store::users::find_by_email(&pool, &email)
        .await?
        .ok_or_else(|| AppError::Auth("Unable to login!".into()))?;

    if !verify_password(&signin_data.password, &user.password_hash)? {
        return Err(AppError::Auth("Unable to login!".into()));
    }

    let token = issue_token(&pool, user.id).await?;

    Ok(HttpResponse::Ok().json(AuthResponse { user: &user, token }))
}

/// Revoke the presented token only; other sessions stay signed in.
#[post("/signout")]
pub async fn signout(
    pool: web::Data<PgPool>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    store::users::remove_token(&pool, session.user.id, &session.token).await?;

    Ok(HttpResponse::Ok().finish())
}

/// Revoke every token issued to the user.
#[post("/signoutall")]
pub async fn signout_all(
    pool: web::Data<PgPool>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    store::users::clear_tokens(&pool, session.user.id).await?;

    Ok(HttpResponse::Ok().finish())
}

/// The caller's own profile.
#[get("/me")]
pub async fn me(session: AuthSession) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(session.user))
}

/// Update the caller's profile.
///
/// Allowed fields are exactly name, email, password and age; any other
/// field rejects the whole request before anything is written. A new
/// password is hashed with the same cost as at registration.
#[patch("/me")]
pub async fn update_me(
    pool: web::Data<PgPool>,
    session: AuthSession,
    update: web::Json<UserUpdate>,
) -> Result<impl Responder, AppError> {
    update.validate()?;

    if update.is_empty() {
        return Ok(HttpResponse::Ok().json(session.user));
    }

    let current = &session.user;

    let name = match &update.name {
        Some(name) => name.trim().to_string(),
        None => current.name.clone(),
    };
    let email = match &update.email {
        Some(email) => email.trim().to_lowercase(),
        None => current.email.clone(),
    };
    let password_hash = match &update.password {
        Some(password) => hash_password(password)?,
        None => current.password_hash.clone(),
    };
    let age = update.age.unwrap_or(current.age);

    let user =
        store::users::update_profile(&pool, current.id, &name, &email, &password_hash, age).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Delete the caller's account and, in the same transaction, every task
/// it owns. Returns the deleted profile.
#[delete("/me")]
pub async fn delete_me(
    pool: web::Data<PgPool>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let user = store::users::delete_cascade(&pool, session.user.id).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Directory of all registered users, public fields only.
#[get("")]
pub async fn list_users(
    pool: web::Data<PgPool>,
    _session: AuthSession,
) -> Result<impl Responder, AppError> {
    let users = store::users::list_all(&pool).await?;

    Ok(HttpResponse::Ok().json(users))
}

/// Upload an avatar as the multipart file field `avatar`.
///
/// Accepts jpg/jpeg/png up to 1 MB and stores a normalized 250x250 PNG.
#[post("/me/avatar")]
pub async fn upload_avatar(
    pool: web::Data<PgPool>,
    session: AuthSession,
    mut payload: Multipart,
) -> Result<impl Responder, AppError> {
    let mut stored = false;

    while let Some(mut field) = payload.try_next().await? {
        if field.name() != "avatar" {
            // Drain and ignore unrelated fields.
            while field.try_next().await?.is_some() {}
            continue;
        }

        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation("Avatar upload requires a filename".into()))?;

        if !avatar::has_allowed_extension(&filename) {
            return Err(AppError::Validation(
                "File must be an image with one of the following extensions: jpg, jpeg, png!"
                    .into(),
            ));
        }

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if data.len() + chunk.len() > avatar::MAX_AVATAR_BYTES {
                return Err(AppError::Validation("Avatar file is too large".into()));
            }
            data.extend_from_slice(&chunk);
        }

        let normalized = avatar::normalize(&data)?;
        store::users::set_avatar(&pool, session.user.id, &normalized).await?;
        stored = true;
    }

    if !stored {
        return Err(AppError::Validation(
            "Multipart field \"avatar\" is required".into(),
        ));
    }

    Ok(HttpResponse::Ok().finish())
}

/// Remove the caller's avatar.
#[delete("/me/avatar")]
pub async fn delete_avatar(
    pool: web::Data<PgPool>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    store::users::clear_avatar(&pool, session.user.id).await?;

    Ok(HttpResponse::Ok().finish())
}

/// Public avatar fetch. Unparseable ids, unknown users and users without
/// an avatar all produce the same empty 404.
#[get("/{id}/avatar")]
pub async fn get_avatar(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = Uuid::parse_str(&path.into_inner()).map_err(|_| AppError::NotFound)?;

    match store::users::avatar(&pool, id).await? {
        Some(bytes) => Ok(HttpResponse::Ok().content_type("image/png").body(bytes)),
        None => Err(AppError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{RegisterRequest, SigninRequest};
    use validator::Validate;

    #[test]
    fn test_register_payload_rules() {
        let payload = RegisterRequest {
            name: "Dariusz".to_string(),
            email: "dariusz@dariusz.com".to_string(),
            password: "password123".to_string(),
            age: None,
        };
        // The forbidden-substring rule fires regardless of what surrounds it.
        assert!(payload.validate().is_err());

        let payload = RegisterRequest {
            name: "Dariusz".to_string(),
            email: "dariusz@dariusz.com".to_string(),
            password: "abc123".to_string(),
            age: None,
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_signin_payload_deserializes() {
        let payload: SigninRequest =
            serde_json::from_str(r#"{"email": "a@b.com", "password": "abc123"}"#).unwrap();
        assert_eq!(payload.email, "a@b.com");
    }
}
