//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 会话与登出
//! - [`meals`] - 餐品目录与推荐
//! - [`profile`] - 健康档案
//! - [`cart`] - 购物车
//! - [`orders`] - 下单、订单历史、配送跟踪
//! - [`meal_logs`] - 饮食记录
//! - [`payment`] - 支付校验
//!
//! 除 `/health`、`/api/auth/session` 与餐品目录查询外, 处理器通过
//! [`crate::auth::CurrentUser`] 要求 Bearer 令牌。

pub mod auth;
pub mod cart;
pub mod health;
pub mod meal_logs;
pub mod meals;
pub mod orders;
pub mod payment;
pub mod profile;

use axum::Router;

use crate::core::ServerState;

/// Build the Axum router (without state)
pub fn router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(meals::router())
        .merge(profile::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(meal_logs::router())
        .merge(payment::router())
}
