//! 统一错误处理
//!
//! 错误类型统一来自 `shared::error`，这里只做 re-export 和响应包装。
//!
//! ```ignore
//! async fn handler() -> AppResult<Json<ApiResponse<Cart>>> {
//!     let cart = manager.cart(&user.id);
//!     Ok(ok(cart))
//! }
//! ```

use axum::Json;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Wrap data in a success envelope
pub fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}
