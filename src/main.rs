// ============================================================================
// MULTI-USER BLOG
// ============================================================================

// - Signup/login with bcrypt password hashing
// - Cookie-addressed server-side sessions
// - Posts: create, edit, delete, view, search
// - Profile images in object storage
// - Publish notifications on new posts
// - Structured logging

use anyhow::Context;
use blog::{AppState, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blog=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config)
        .await
        .context("initialise application state")?;
    let app = blog::app(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("bind tcp listener")?;

    info!("Server running on http://{}", config.bind_addr);
    info!("Routes:");
    info!("  GET       /                - All posts, newest first");
    info!("  GET/POST  /signup          - Create account");
    info!("  GET/POST  /login           - Sign in");
    info!("  GET       /logout          - Sign out");
    info!("  GET       /dashboard       - Own posts and profile (auth)");
    info!("  GET/POST  /create          - New post (auth)");
    info!("  GET/POST  /edit/{{id}}       - Edit post (auth)");
    info!("  GET       /delete/{{id}}     - Delete post (auth)");
    info!("  GET       /post/{{id}}       - View post");
    info!("  GET       /search?q=       - Search posts");
    info!("  GET/POST  /upload_profile  - Profile image (auth)");
    info!("  GET       /health          - Health check");

    axum::serve(listener, app).await.context("server shutdown")?;

    Ok(())
}
