//! Meal API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::Meal;

use crate::auth::CurrentUser;
use crate::catalog::{MealTypeFilter, Recommendation};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationParams {
    #[serde(default)]
    pub meal_type: MealTypeFilter,
}

#[derive(Debug, Deserialize)]
pub struct PersistRequest {
    pub meal_id: String,
}

/// GET /api/meals/recommendations
pub async fn recommendations(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(params): Query<RecommendationParams>,
) -> AppResult<Json<ApiResponse<Recommendation>>> {
    let profile = state.profiles.get(&user.id).await?;
    let recommendation = state.catalog.recommend(&profile, params.meal_type).await?;
    Ok(ok(recommendation))
}

/// GET /api/meals/catalog
pub async fn catalog(State(state): State<ServerState>) -> Json<ApiResponse<Vec<Meal>>> {
    ok(state.catalog.static_catalog().to_vec())
}

/// GET /api/meals/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Meal>>> {
    Ok(ok(state.catalog.get(&id).await?))
}

/// GET /api/meals
pub async fn list_persisted(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Meal>>>> {
    Ok(ok(state.catalog.list_persisted().await?))
}

/// POST /api/meals
pub async fn persist(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<PersistRequest>,
) -> AppResult<Json<ApiResponse<Meal>>> {
    let meal = state.catalog.persist(&req.meal_id).await?;
    crate::audit_log!(user.id, "meal_persisted", format!("meal:{}", meal.id));
    Ok(ok(meal))
}
