//! SQLite persistence for users and posts.
//!
//! Every query takes the shared [`SqlitePool`]; a connection is checked out
//! for the duration of one statement and returned to the pool when the
//! future completes, on success and error paths alike.

pub mod posts;
pub mod users;

use anyhow::Context;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
        password      TEXT NOT NULL,
        profile_image TEXT
    );"#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        title      TEXT NOT NULL,
        content    TEXT NOT NULL,
        user_id    INTEGER NOT NULL,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );"#,
];

/// Open a pool, creating the database file if it does not exist yet.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("parse database url {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .with_context(|| format!("connect to sqlite via {database_url}"))
}

/// Create both tables if they are missing. Safe to run on every start.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    for stmt in SCHEMA {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .context("apply schema")?;
    }
    Ok(())
}

/// True when a pooled connection can be checked out.
pub async fn is_reachable(pool: &SqlitePool) -> bool {
    pool.acquire().await.is_ok()
}

#[cfg(test)]
pub(crate) async fn test_pool() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("blog.db").display());
    let pool = connect(&url).await.expect("connect");
    run_migrations(&pool).await.expect("migrate");
    (dir, pool)
}
