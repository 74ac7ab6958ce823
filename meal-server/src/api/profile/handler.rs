use axum::{Json, extract::State};
use shared::models::UserProfile;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::profile::ProfileUpdate;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/profile
pub async fn get(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    Ok(ok(state.profiles.get(&user.id).await?))
}

/// PUT /api/profile
pub async fn save(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    Ok(ok(state.profiles.save(&user.id, update).await?))
}
