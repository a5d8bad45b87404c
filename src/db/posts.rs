use super::DbError;
use crate::models::{Post, PostWithAuthor};
use sqlx::SqlitePool;

const WITH_AUTHOR: &str = "SELECT posts.id, posts.title, posts.content, posts.user_id, \
     posts.created_at, users.name AS author \
     FROM posts JOIN users ON posts.user_id = users.id";

pub async fn create_post(
    pool: &SqlitePool,
    title: &str,
    content: &str,
    user_id: i64,
) -> Result<i64, DbError> {
    let done = sqlx::query("INSERT INTO posts (title, content, user_id) VALUES (?, ?, ?)")
        .bind(title)
        .bind(content)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(done.last_insert_rowid())
}

/// A user's posts, in insertion order.
pub async fn list_posts_by_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Post>, DbError> {
    let posts = sqlx::query_as::<_, Post>(
        "SELECT id, title, content, user_id, created_at FROM posts WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(posts)
}

/// Every post with its author's name, newest first.
pub async fn list_posts_with_author(pool: &SqlitePool) -> Result<Vec<PostWithAuthor>, DbError> {
    let posts = sqlx::query_as::<_, PostWithAuthor>(&format!("{WITH_AUTHOR} ORDER BY posts.id DESC"))
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

pub async fn find_post_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Post>, DbError> {
    let post = sqlx::query_as::<_, Post>(
        "SELECT id, title, content, user_id, created_at FROM posts WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(post)
}

pub async fn find_post_with_author(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<PostWithAuthor>, DbError> {
    let post = sqlx::query_as::<_, PostWithAuthor>(&format!("{WITH_AUTHOR} WHERE posts.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

/// Returns `false` when no post has this id.
pub async fn update_post(
    pool: &SqlitePool,
    id: i64,
    title: &str,
    content: &str,
) -> Result<bool, DbError> {
    let done = sqlx::query("UPDATE posts SET title = ?, content = ? WHERE id = ?")
        .bind(title)
        .bind(content)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(done.rows_affected() > 0)
}

/// Returns `false` when no post has this id.
pub async fn delete_post(pool: &SqlitePool, id: i64) -> Result<bool, DbError> {
    let done = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(done.rows_affected() > 0)
}

/// Case-insensitive substring match on title, content or author name.
///
/// Folding happens in Rust: SQLite's `LIKE` and `lower()` only fold ASCII.
pub async fn search_posts(pool: &SqlitePool, term: &str) -> Result<Vec<PostWithAuthor>, DbError> {
    let needle = term.to_lowercase();
    let posts = list_posts_with_author(pool)
        .await?
        .into_iter()
        .filter(|post| matches_term(post, &needle))
        .collect();
    Ok(posts)
}

fn matches_term(post: &PostWithAuthor, needle: &str) -> bool {
    [&post.title, &post.content, &post.author]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}
