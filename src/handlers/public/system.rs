use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Redirect},
};
use serde_json::json;

use crate::app::AppState;

/// GET / - send visitors to the landing page; the gate decides from there
pub async fn root(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.config.security.landing_path)
}

/// GET /health - liveness plus a user store round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.users.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
