//! 工具模块
//!
//! - [`AppError`] / [`ApiResponse`] (from shared::error)
//! - 日志初始化与清理

pub mod error;
pub mod logger;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, ok};
