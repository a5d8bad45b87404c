use super::load_navbar;
use crate::{
    db::{self, DbError},
    dto::{DashboardView, FormView, LoginForm, Navbar, SignupForm, ValidForm},
    errors::ApiError,
    session::{AuthSession, CurrentSession},
    states::AppState,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, warn};

/// GET /signup
pub async fn signup_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<FormView>, ApiError> {
    let navbar = load_navbar(&state.pool, session.as_ref()).await?;
    Ok(Json(FormView::new(navbar, "signup")))
}

/// POST /signup
/// Form: name, email, password
pub async fn signup(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    ValidForm(form): ValidForm<SignupForm>,
) -> Result<Response, ApiError> {
    let password_hash = state.hasher.hash(&form.password).await?;

    match db::users::create_user(&state.pool, &form.name, &form.email, &password_hash).await {
        Ok(id) => {
            info!("New user registered: {} ({})", form.email, id);
            Ok(Redirect::to("/login").into_response())
        }
        Err(DbError::DuplicateEmail) => {
            info!("Signup rejected, email taken: {}", form.email);
            let navbar = load_navbar(&state.pool, session.as_ref()).await?;
            let view = FormView::new(navbar, "signup")
                .with_error("Email already registered. Please login.");
            Ok((StatusCode::CONFLICT, Json(view)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /login
pub async fn login_form(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<FormView>, ApiError> {
    let navbar = load_navbar(&state.pool, session.as_ref()).await?;
    Ok(Json(FormView::new(navbar, "login")))
}

/// POST /login
/// Form: email, password
pub async fn login(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    ValidForm(form): ValidForm<LoginForm>,
) -> Result<Response, ApiError> {
    let user = db::users::find_user_by_email(&state.pool, &form.email).await?;

    if let Some(user) = user {
        if state.hasher.verify(&form.password, &user.password).await? {
            let cookie = state.sessions.establish(user.id, &user.name)?;
            info!("User logged in: {}", user.email);
            return Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/dashboard")).into_response());
        }
    }

    warn!("Failed login for {}", form.email);
    let navbar = load_navbar(&state.pool, session.as_ref()).await?;
    let view = FormView::new(navbar, "login").with_error("Invalid email or password");
    Ok((StatusCode::UNAUTHORIZED, Json(view)).into_response())
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let cookie = state.sessions.clear(&headers);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/"))
}

/// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<DashboardView>, ApiError> {
    let posts = db::posts::list_posts_by_user(&state.pool, session.user_id).await?;
    let user = db::users::find_user_by_id(&state.pool, session.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(DashboardView {
        navbar: Navbar::for_user(&user),
        user: (&user).into(),
        posts,
    }))
}
