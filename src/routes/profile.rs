use super::load_navbar;
use crate::{
    db,
    dto::FormView,
    errors::ApiError,
    session::AuthSession,
    states::AppState,
    storage::upload_profile_image,
};
use axum::{
    Json,
    extract::{Multipart, State},
    response::Redirect,
};
use tracing::info;

const PROFILE_FIELD: &str = "profile";

/// GET /upload_profile
pub async fn upload_form(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<FormView>, ApiError> {
    let navbar = load_navbar(&state.pool, Some(&session)).await?;
    Ok(Json(FormView::new(navbar, "upload_profile")))
}

/// POST /upload_profile
/// Multipart: file field `profile`
pub async fn upload_profile(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::ValidationError(e.body_text()))?
    {
        if field.name() != Some(PROFILE_FIELD) {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::ValidationError(e.body_text()))?;
        upload = Some((bytes, content_type));
    }

    let (bytes, content_type) = upload
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| ApiError::ValidationError("profile: an image file is required".into()))?;

    let url = upload_profile_image(state.storage.as_ref(), session.user_id, bytes, &content_type)
        .await?;
    db::users::update_profile_image(&state.pool, session.user_id, &url).await?;
    info!("Profile image updated for user {}: {}", session.user_id, url);

    Ok(Redirect::to("/dashboard"))
}
