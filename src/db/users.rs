use sqlx::PgPool;

use super::{models::User, DbError};

/// Inserts a user. A taken username is reported as [`DbError::Conflict`] by
/// the `users_username_key` constraint, so concurrent registrations of the
/// same name cannot both succeed.
pub async fn insert(pool: &PgPool, username: &str, hashed_password: &str) -> Result<User, DbError> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, hashed_password)
        VALUES ($1, $2)
        RETURNING id, username, hashed_password
        "#,
    )
    .bind(username)
    .bind(hashed_password)
    .fetch_one(pool)
    .await
    .map_err(DbError::from_insert)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, DbError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, hashed_password
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
