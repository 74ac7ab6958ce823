//! Data models
//!
//! Shared between meal-server and API clients.

pub mod meal;
pub mod meal_log;
pub mod profile;

// Re-exports
pub use meal::*;
pub use meal_log::*;
pub use profile::*;
