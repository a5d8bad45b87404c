pub mod health;
pub mod post;
pub mod profile;
pub mod user;

use crate::{db, dto::Navbar, errors::ApiError, session::SessionUser, states::AppState};
use axum::{Router, routing::get};
use sqlx::SqlitePool;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Public pages
        .route("/", get(post::home))
        .route("/post/{id}", get(post::view_post))
        .route("/search", get(post::search))
        .route("/signup", get(user::signup_form).post(user::signup))
        .route("/login", get(user::login_form).post(user::login))
        .route("/logout", get(user::logout))
        // Signed-in pages
        .route("/dashboard", get(user::dashboard))
        .route("/create", get(post::create_form).post(post::create_post))
        .route("/edit/{id}", get(post::edit_form).post(post::update_post))
        .route("/delete/{id}", get(post::delete_post))
        .route(
            "/upload_profile",
            get(profile::upload_form).post(profile::upload_profile),
        )
        .with_state(state)
}

/// Reads the signed-in user's current name and image for the page header.
pub(crate) async fn load_navbar(
    pool: &SqlitePool,
    session: Option<&SessionUser>,
) -> Result<Navbar, ApiError> {
    let Some(session) = session else {
        return Ok(Navbar::anonymous());
    };

    let navbar = db::users::find_user_by_id(pool, session.user_id)
        .await?
        .map(|user| Navbar::for_user(&user))
        .unwrap_or_else(Navbar::anonymous);
    Ok(navbar)
}
