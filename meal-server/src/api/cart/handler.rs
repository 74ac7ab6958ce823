//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::order::Cart;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub meal_id: String,
    #[serde(default = "one")]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

/// GET /api/cart
pub async fn get(State(state): State<ServerState>, user: CurrentUser) -> Json<ApiResponse<Cart>> {
    ok(state.cart.get(&user.id))
}

/// POST /api/cart/items
pub async fn add_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<AddItemRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let meal = state.catalog.get(&req.meal_id).await?;
    let cart = state.cart.add_item(&user.id, &meal, req.quantity)?;
    Ok(ok(cart))
}

/// PUT /api/cart/items/{meal_id}
pub async fn set_quantity(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(meal_id): Path<String>,
    Json(req): Json<QuantityRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    Ok(ok(state.cart.set_quantity(&user.id, &meal_id, req.quantity)?))
}

/// DELETE /api/cart/items/{meal_id}
pub async fn remove_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(meal_id): Path<String>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    Ok(ok(state.cart.remove_item(&user.id, &meal_id)?))
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Cart>>> {
    Ok(ok(state.cart.clear(&user.id)?))
}
