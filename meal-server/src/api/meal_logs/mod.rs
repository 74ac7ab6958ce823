//! Meal Log API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/meal-logs | GET | 全部记录 (日期倒序) |
//! | /api/meal-logs | POST | 添加一条 (同日期追加) |
//! | /api/meal-logs/date/{date} | GET | 某日记录 |
//! | /api/meal-logs/date/{date}/nutrition | GET | 某日营养汇总 |
//! | /api/meal-logs/{log_id}/entries/{meal_id} | DELETE | 删除第一条匹配 |

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/meal-logs", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::add_entry))
        .route("/date/{date}", get(handler::get_by_date))
        .route("/date/{date}/nutrition", get(handler::daily_nutrition))
        .route("/{log_id}/entries/{meal_id}", delete(handler::remove_entry))
}
