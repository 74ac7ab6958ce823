//! Authentication Handlers
//!
//! Session creation warms the per-user state (meal logs, order history);
//! logout tears it down and stops running delivery simulations.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: CurrentUser,
    pub profile_complete: bool,
}

/// POST /api/auth/session
pub async fn create_session(
    State(state): State<ServerState>,
    Json(req): Json<SessionRequest>,
) -> AppResult<Json<ApiResponse<SessionResponse>>> {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::validation("user_id is required"));
    }
    let display_name = req.display_name.trim();

    let token = state
        .jwt_service()
        .generate_token(user_id, display_name)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    state.tracker.load(user_id).await?;
    state.orders.orders(user_id).await?;
    let profile_complete = state.profiles.is_complete(user_id).await?;

    security_log!(INFO, "session_created", user_id = %user_id);
    tracing::info!(user_id = %user_id, profile_complete, "User signed in");

    Ok(ok(SessionResponse {
        token,
        user: CurrentUser {
            id: user_id.to_string(),
            display_name: display_name.to_string(),
        },
        profile_complete,
    }))
}

/// GET /api/auth/me
pub async fn me(user: CurrentUser) -> Json<ApiResponse<CurrentUser>> {
    ok(user)
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Json<ApiResponse<()>> {
    state.unload_user(&user.id);
    security_log!(INFO, "logout", user_id = %user.id);
    Json(ApiResponse::ok())
}
