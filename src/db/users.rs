use super::DbError;
use crate::models::User;
use sqlx::SqlitePool;

/// Emails are stored and looked up lowercased, so case variants of one
/// address are the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Insert a user. The `UNIQUE` constraint on `email` is the only duplicate
/// check, so two concurrent signups cannot both succeed.
pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64, DbError> {
    let result = sqlx::query("INSERT INTO users (name, email, password) VALUES (?, ?, ?)")
        .bind(name)
        .bind(normalize_email(email))
        .bind(password_hash)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(done.last_insert_rowid()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DbError::DuplicateEmail),
        Err(e) => Err(e.into()),
    }
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, DbError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password, profile_image FROM users WHERE email = ?",
    )
    .bind(normalize_email(email))
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, DbError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password, profile_image FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn update_profile_image(pool: &SqlitePool, user_id: i64, url: &str) -> Result<(), DbError> {
    sqlx::query("UPDATE users SET profile_image = ? WHERE id = ?")
        .bind(url)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Remove a user; their posts go with them via `ON DELETE CASCADE`.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool, DbError> {
    let done = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(done.rows_affected() > 0)
}
