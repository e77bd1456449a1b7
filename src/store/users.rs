use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, age, tokens, avatar, created_at, updated_at";

/// Maps a unique-constraint violation on the email column to a validation
/// failure so a duplicate registration surfaces as 400, not 500.
fn map_unique_email(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.code().as_deref() == Some("23505") {
            return AppError::Validation("Email already registered".into());
        }
    }
    error.into()
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = $1",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY created_at",
        USER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(users)
}

pub async fn insert(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    age: i32,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash, age) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(age)
    .fetch_one(pool)
    .await
    .map_err(map_unique_email)?;

    Ok(user)
}

/// Applies a full profile write. The caller merges the requested changes
/// onto the current record first, so this is always an all-or-nothing
/// replacement of the mutable fields.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    email: &str,
    password_hash: &str,
    age: i32,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users \
         SET name = $1, email = $2, password_hash = $3, age = $4, updated_at = now() \
         WHERE id = $5 \
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(age)
    .bind(id)
    .fetch_one(pool)
    .await
    .map_err(map_unique_email)?;

    Ok(user)
}

/// Appends a freshly issued token to the user's allow-list.
/// A single-statement array mutation, atomic per row.
pub async fn append_token(pool: &PgPool, id: Uuid, token: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET tokens = array_append(tokens, $1) WHERE id = $2")
        .bind(token)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Revokes exactly the presented token (single-device signout).
pub async fn remove_token(pool: &PgPool, id: Uuid, token: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET tokens = array_remove(tokens, $1) WHERE id = $2")
        .bind(token)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Revokes every outstanding token (all-devices signout).
pub async fn clear_tokens(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET tokens = '{}' WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn set_avatar(pool: &PgPool, id: Uuid, avatar: &[u8]) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET avatar = $1, updated_at = now() WHERE id = $2")
        .bind(avatar)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn clear_avatar(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET avatar = NULL, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Fetches just the avatar bytes for the public avatar route.
/// `None` when the user does not exist or has no avatar stored.
pub async fn avatar(pool: &PgPool, id: Uuid) -> Result<Option<Vec<u8>>, AppError> {
    let row: Option<(Option<Vec<u8>>,)> =
        sqlx::query_as("SELECT avatar FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.and_then(|(avatar,)| avatar))
}

/// Deletes the account together with every task it owns, in one
/// transaction. If the task cascade fails nothing is committed, so a
/// failed cascade reports the whole deletion as failed.
pub async fn delete_cascade(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM tasks WHERE owner = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let user = sqlx::query_as::<_, User>(&format!(
        "DELETE FROM users WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(user)
}
