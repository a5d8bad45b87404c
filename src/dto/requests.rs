use crate::errors::ApiError;
use axum::{
    Form,
    extract::{FromRequest, Request},
};
use serde::{Deserialize, de::DeserializeOwned};
use validator::Validate;

#[derive(Debug, Validate, Deserialize)]
pub struct SignupForm {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "Password must be 1-100 characters"))]
    pub password: String,
}

#[derive(Debug, Validate, Deserialize)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body of both create and edit.
#[derive(Debug, Validate, Deserialize)]
pub struct PostForm {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// GET /search?q=
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// A url-encoded form that has been decoded and has passed its
/// `validator` rules. Either failure is a `ValidationError`.
#[derive(Debug)]
pub struct ValidForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidForm<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::ValidationError(e.body_text()))?;

        value
            .validate()
            .map_err(|e| ApiError::ValidationError(e.to_string()))?;

        Ok(Self(value))
    }
}
