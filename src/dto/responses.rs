use crate::models::{Post, PostWithAuthor, User};
use serde::Serialize;

pub const DEFAULT_PROFILE_IMAGE: &str = "/static/default.png";

/// Header block shown on every page.
#[derive(Debug, Serialize)]
pub struct Navbar {
    pub name: Option<String>,
    pub image: String,
}

impl Navbar {
    pub fn anonymous() -> Self {
        Self {
            name: None,
            image: DEFAULT_PROFILE_IMAGE.to_string(),
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self {
            name: Some(user.name.clone()),
            image: user
                .profile_image
                .clone()
                .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string()),
        }
    }
}

/// GET /
#[derive(Debug, Serialize)]
pub struct HomeView {
    pub navbar: Navbar,
    /// The newest post, also present in `posts`.
    pub featured_post: Option<PostWithAuthor>,
    pub posts: Vec<PostWithAuthor>,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub name: String,
    pub profile_image: Option<String>,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

/// GET /dashboard
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub navbar: Navbar,
    pub user: ProfileView,
    pub posts: Vec<Post>,
}

/// GET /post/{id}
#[derive(Debug, Serialize)]
pub struct PostView {
    pub navbar: Navbar,
    pub post: PostWithAuthor,
}

/// GET /search
#[derive(Debug, Serialize)]
pub struct SearchView {
    pub navbar: Navbar,
    pub query: String,
    pub results: Vec<PostWithAuthor>,
}

/// Any of the input pages: signup, login, create, edit, upload.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub navbar: Navbar,
    pub form: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
}

impl FormView {
    pub fn new(navbar: Navbar, form: &'static str) -> Self {
        Self {
            navbar,
            form,
            error: None,
            post: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_post(mut self, post: Post) -> Self {
        self.post = Some(post);
        self
    }
}
