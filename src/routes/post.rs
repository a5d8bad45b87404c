use super::load_navbar;
use crate::{
    db,
    dto::{FormView, HomeView, PostForm, PostView, SearchParams, SearchView, ValidForm},
    errors::ApiError,
    notify::notify_post_published,
    session::{AuthSession, CurrentSession},
    states::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use tracing::info;

/// GET /
/// All posts, newest first; the newest is also the featured post.
pub async fn home(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<HomeView>, ApiError> {
    let posts = db::posts::list_posts_with_author(&state.pool).await?;
    let navbar = load_navbar(&state.pool, session.as_ref()).await?;

    Ok(Json(HomeView {
        navbar,
        featured_post: posts.first().cloned(),
        posts,
    }))
}

/// GET /create
pub async fn create_form(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<FormView>, ApiError> {
    let navbar = load_navbar(&state.pool, Some(&session)).await?;
    Ok(Json(FormView::new(navbar, "create_post")))
}

/// POST /create
/// Form: title, content
pub async fn create_post(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ValidForm(form): ValidForm<PostForm>,
) -> Result<Redirect, ApiError> {
    let id = db::posts::create_post(&state.pool, &form.title, &form.content, session.user_id).await?;
    info!("Post created: {} by user {}", id, session.user_id);

    notify_post_published(state.notifier.as_ref(), &session.name, &form.title).await;

    Ok(Redirect::to("/dashboard"))
}

// Edit and delete only require a session, not ownership of the post.

/// GET /edit/{id}
pub async fn edit_form(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<FormView>, ApiError> {
    let post = db::posts::find_post_by_id(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let navbar = load_navbar(&state.pool, Some(&session)).await?;

    Ok(Json(FormView::new(navbar, "edit_post").with_post(post)))
}

/// POST /edit/{id}
/// Form: title, content
pub async fn update_post(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<i64>,
    ValidForm(form): ValidForm<PostForm>,
) -> Result<Redirect, ApiError> {
    if !db::posts::update_post(&state.pool, id, &form.title, &form.content).await? {
        return Err(ApiError::NotFound);
    }
    info!("Post updated: {} by user {}", id, session.user_id);

    Ok(Redirect::to("/dashboard"))
}

/// GET /delete/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    if !db::posts::delete_post(&state.pool, id).await? {
        return Err(ApiError::NotFound);
    }
    info!("Post deleted: {} by user {}", id, session.user_id);

    Ok(Redirect::to("/dashboard"))
}

/// GET /post/{id}
pub async fn view_post(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
) -> Result<Json<PostView>, ApiError> {
    let post = db::posts::find_post_with_author(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let navbar = load_navbar(&state.pool, session.as_ref()).await?;

    Ok(Json(PostView { navbar, post }))
}

/// GET /search?q=term
pub async fn search(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchView>, ApiError> {
    let results = db::posts::search_posts(&state.pool, &params.q).await?;
    let navbar = load_navbar(&state.pool, session.as_ref()).await?;

    Ok(Json(SearchView {
        navbar,
        query: params.q,
        results,
    }))
}
