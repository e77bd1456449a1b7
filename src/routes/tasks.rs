use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::AuthSession,
    error::AppError,
    models::{TaskCreate, TaskQuery, TaskUpdate},
    store,
};

/// Lists the caller's tasks.
///
/// ## Query Parameters:
/// - `completed` (optional): the literal string "true" selects completed
///   tasks; any other value selects incomplete ones.
/// - `limit` / `skip` (optional): pagination; non-numeric values are
///   ignored rather than rejected.
///
/// Tasks owned by other users are never returned, whatever the filters.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    session: AuthSession,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = store::tasks::list(
        &pool,
        session.user.id,
        query.completed_filter(),
        query.limit(),
        query.skip(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the caller.
///
/// The owner is always the authenticated user; any owner value in the
/// body is ignored. A missing or blank description is a 400.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    session: AuthSession,
    task_data: web::Json<TaskCreate>,
) -> Result<impl Responder, AppError> {
    let description = task_data
        .description
        .as_deref()
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .ok_or_else(|| AppError::Validation("Description is required".into()))?;

    let completed = task_data.completed.unwrap_or(false);

    let task = store::tasks::insert(&pool, session.user.id, description, completed).await?;

    Ok(HttpResponse::Created().json(task))
}

/// Fetches one of the caller's tasks.
///
/// A task owned by someone else yields the same empty 404 as a missing
/// one, so ids leak nothing about other users' data.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    session: AuthSession,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = store::tasks::find(&pool, session.user.id, task_id.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(task))
}

/// Updates one of the caller's tasks.
///
/// Allowed fields are exactly description and completed; any other field
/// rejects the whole update with 400 and nothing is applied. A blank
/// description is rejected the same way as on creation.
#[patch("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    session: AuthSession,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let description = match task_data.description.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("Description is required".into())),
        other => other,
    };

    let task = store::tasks::update(
        &pool,
        session.user.id,
        task_id.into_inner(),
        description,
        task_data.completed,
    )
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes one of the caller's tasks and returns the removed record.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    session: AuthSession,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = store::tasks::delete(&pool, session.user.id, task_id.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(task))
}
