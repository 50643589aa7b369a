// handlers/public/session.rs - POST /api/auth/login

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::authenticate;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ApiLoginRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

/// Programmatic sign-in.
///
/// ```json
/// { "success": true, "data": { "token": "...", "expires_at": "...", "expires_in": 604800, "user": { ... } } }
/// ```
pub async fn api_login(State(state): State<AppState>, Json(body): Json<ApiLoginRequest>) -> ApiResult<Value> {
    let user = authenticate(state.users.as_ref(), &body.phone, &body.password).await?;
    let issued = state.issuer.issue_default(user.id)?;

    Ok(ApiResponse::success(json!({
        "token": issued.token,
        "expires_at": issued.expires_at,
        "expires_in": issued.expires_in_secs(),
        "user": user,
    })))
}
