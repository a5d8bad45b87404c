//! A small multi-user blog: signup and login, posts with search, and a
//! profile image kept in object storage.

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod models;
pub mod notify;
pub mod routes;
pub mod session;
pub mod states;
pub mod storage;

pub use config::Config;
pub use states::AppState;

use axum::{Router, extract::DefaultBodyLimit};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// The full service: routes, static assets and middleware.
pub fn app(state: AppState, config: &Config) -> Router {
    routes::router(state)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
}
