//! Meal Log API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::models::{DailyNutrition, MealLog, MealType};
use shared::util::today;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::tracker::NewEntry;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct AddEntryRequest {
    pub meal_id: String,
    /// 默认今天
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub meal_type: MealType,
    #[serde(default)]
    pub notes: Option<String>,
}

/// GET /api/meal-logs
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<MealLog>>>> {
    Ok(ok(state.tracker.list(&user.id).await?))
}

/// POST /api/meal-logs
pub async fn add_entry(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<AddEntryRequest>,
) -> AppResult<Json<ApiResponse<MealLog>>> {
    let entry = NewEntry {
        meal_id: req.meal_id,
        date: req.date.unwrap_or_else(today),
        meal_type: req.meal_type,
        notes: req.notes.filter(|n| !n.trim().is_empty()),
    };
    Ok(ok(state.tracker.add_entry(&user.id, entry).await?))
}

/// GET /api/meal-logs/date/{date}
pub async fn get_by_date(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<ApiResponse<Option<MealLog>>>> {
    Ok(ok(state.tracker.get_by_date(&user.id, date).await?))
}

/// GET /api/meal-logs/date/{date}/nutrition
pub async fn daily_nutrition(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<ApiResponse<DailyNutrition>>> {
    Ok(ok(state.tracker.daily_nutrition(&user.id, date).await?))
}

/// DELETE /api/meal-logs/{log_id}/entries/{meal_id}
///
/// `data` is the remaining log, `null` once the last entry was removed
pub async fn remove_entry(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((log_id, meal_id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<Option<MealLog>>>> {
    Ok(ok(state
        .tracker
        .remove_entry(&user.id, &log_id, &meal_id)
        .await?))
}
