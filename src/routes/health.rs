use crate::{db, states::AppState};
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

/// GET /health
/// Response: 200 OK with JSON, 503 when the database is unreachable
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let (status, label) = if db::is_reachable(&state.pool).await {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        status,
        Json(serde_json::json!({
          "status": label,
          "timestamp": Utc::now().timestamp()
        })),
    )
}
