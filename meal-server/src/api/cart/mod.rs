//! Cart API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/cart | GET | 当前购物车 |
//! | /api/cart | DELETE | 清空 |
//! | /api/cart/items | POST | 加入餐品 |
//! | /api/cart/items/{meal_id} | PUT | 修改数量 (<= 0 删除) |
//! | /api/cart/items/{meal_id} | DELETE | 删除一行 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get).delete(handler::clear))
        .route("/items", post(handler::add_item))
        .route(
            "/items/{meal_id}",
            put(handler::set_quantity).delete(handler::remove_item),
        )
}
