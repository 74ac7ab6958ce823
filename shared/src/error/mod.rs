//! Unified error system for HealMeal
//!
//! - [`ErrorCode`]: numeric error codes shared with API clients
//! - [`ErrorCategory`]: classification by code range
//! - [`AppError`]: error with code, message and optional details
//! - [`ApiResponse`]: JSON response envelope
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::CartEmpty)
//!     .with_detail("user_id", "u-1");
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(3001));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
