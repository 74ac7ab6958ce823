//! Order API Handlers

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, stream};
use serde::{Deserialize, Serialize};
use shared::order::{Order, OrderStatusEvent};
use tokio::sync::broadcast::error::RecvError;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::DeliveryTracking;
use crate::payment::{PaymentReceipt, PaymentRequest};
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub delivery_address: String,
    pub payment: PaymentRequest,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
    pub receipt: PaymentReceipt,
}

#[derive(Debug, Deserialize)]
pub struct LiveRequest {
    pub enabled: bool,
}

/// POST /api/orders
///
/// 支付信息先校验, 订单落库后再模拟扣款
pub async fn checkout(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutResponse>>> {
    let method = state.payments.validate(&req.payment)?;
    let order = state
        .orders
        .checkout(&user.id, &req.delivery_address, method)
        .await?;
    let receipt = state.payments.pay(&order, &req.payment).await?;
    Ok(ok(CheckoutResponse { order, receipt }))
}

/// GET /api/orders
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    Ok(ok(state.orders.orders(&user.id).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(state.orders.get(&user.id, id).await?))
}

/// GET /api/orders/{id}/tracking
pub async fn tracking(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DeliveryTracking>>> {
    Ok(ok(state.orders.tracking(&user.id, id).await?))
}

/// PUT /api/orders/{id}/live
pub async fn set_live(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<LiveRequest>,
) -> AppResult<Json<ApiResponse<DeliveryTracking>>> {
    Ok(ok(state.orders.set_live(&user.id, id, req.enabled).await?))
}

/// GET /api/orders/events
///
/// 只推送当前用户的订单事件
pub async fn events(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.orders.subscribe();
    let user_id = user.id;

    let stream = stream::unfold((rx, user_id), |(mut rx, user_id)| async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.user_id == user_id => {
                    let sse = to_sse(&event);
                    return Some((Ok(sse), (rx, user_id)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id = %user_id, skipped, "Order event subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse(event: &OrderStatusEvent) -> Event {
    let sse = Event::default().event("order_status");
    match sse.json_data(event) {
        Ok(sse) => sse,
        Err(e) => {
            tracing::error!(order_id = event.order_id, error = %e, "Failed to encode order event");
            Event::default().event("order_status").data(event.message.clone())
        }
    }
}
