//! 用户健康档案

pub mod service;

pub use service::{ProfileService, ProfileUpdate};
