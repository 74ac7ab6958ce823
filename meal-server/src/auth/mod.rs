//! 认证模块
//!
//! - [`JwtService`] - JWT 令牌签发与校验
//! - [`CurrentUser`] - 请求中的当前用户 (axum extractor)

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
