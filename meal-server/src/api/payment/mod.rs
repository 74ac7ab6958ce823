//! Payment API 模块
//!
//! 扣款随下单一起完成 (POST /api/orders); 这里只提供提交前校验。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/payment/validate", post(handler::validate))
}
