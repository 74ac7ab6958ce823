//! Order API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | GET | 订单历史 (最新在前) |
//! | /api/orders | POST | 下单 + 模拟支付 |
//! | /api/orders/events | GET | 状态变化 (SSE) |
//! | /api/orders/{id} | GET | 单个订单 |
//! | /api/orders/{id}/tracking | GET | 配送时间线 |
//! | /api/orders/{id}/live | PUT | 暂停/恢复实时更新 |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::checkout))
        .route("/events", get(handler::events))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/tracking", get(handler::tracking))
        .route("/{id}/live", put(handler::set_live))
}
