use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Task;

const TASK_COLUMNS: &str = "id, description, completed, owner, created_at, updated_at";

/// Lists tasks owned by `owner`, optionally filtered by completion state
/// and paginated. Results are ordered by creation time so `skip`/`limit`
/// walk the list stably.
pub async fn list(
    pool: &PgPool,
    owner: Uuid,
    completed: Option<bool>,
    limit: Option<i64>,
    skip: Option<i64>,
) -> Result<Vec<Task>, AppError> {
    let mut sql = format!("SELECT {} FROM tasks WHERE owner = $1", TASK_COLUMNS);
    let mut param_count = 2;

    if completed.is_some() {
        sql.push_str(&format!(" AND completed = ${}", param_count));
        param_count += 1;
    }

    sql.push_str(" ORDER BY created_at");

    if limit.is_some() {
        sql.push_str(&format!(" LIMIT ${}", param_count));
        param_count += 1;
    }
    if skip.is_some() {
        sql.push_str(&format!(" OFFSET ${}", param_count));
    }

    let mut query = sqlx::query_as::<_, Task>(&sql).bind(owner);

    if let Some(completed) = completed {
        query = query.bind(completed);
    }
    if let Some(limit) = limit {
        query = query.bind(limit);
    }
    if let Some(skip) = skip {
        query = query.bind(skip);
    }

    let tasks = query.fetch_all(pool).await?;

    Ok(tasks)
}

pub async fn insert(
    pool: &PgPool,
    owner: Uuid,
    description: &str,
    completed: bool,
) -> Result<Task, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (description, completed, owner) \
         VALUES ($1, $2, $3) \
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(description)
    .bind(completed)
    .bind(owner)
    .fetch_one(pool)
    .await?;

    Ok(task)
}

/// Ownership-scoped lookup. `None` covers both "no such task" and "owned
/// by someone else", so callers respond with a uniform 404.
pub async fn find(pool: &PgPool, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND owner = $2",
        TASK_COLUMNS
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}

/// Ownership-scoped partial update; omitted fields keep their value.
pub async fn update(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    description: Option<&str>,
    completed: Option<bool>,
) -> Result<Option<Task>, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks \
         SET description = COALESCE($1, description), \
             completed = COALESCE($2, completed), \
             updated_at = now() \
         WHERE id = $3 AND owner = $4 \
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(description)
    .bind(completed)
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}

/// Ownership-scoped delete, returning the removed record.
pub async fn delete(pool: &PgPool, owner: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "DELETE FROM tasks WHERE id = $1 AND owner = $2 RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}
