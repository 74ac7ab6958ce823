//! Shared types for HealMeal
//!
//! Domain models, cart/order types and the unified error system used by
//! the meal server and its API clients.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
