//! Meal API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/meals | GET | 已持久化的餐品 |
//! | /api/meals | POST | 持久化一个已知餐品 |
//! | /api/meals/catalog | GET | 静态目录 |
//! | /api/meals/recommendations | GET | 按健康档案推荐 (?meal_type=lunch) |
//! | /api/meals/{id} | GET | 按 id 查询 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/meals", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_persisted).post(handler::persist))
        .route("/catalog", get(handler::catalog))
        .route("/recommendations", get(handler::recommendations))
        .route("/{id}", get(handler::get_by_id))
}
