//! Cart and order types

pub mod cart;
pub mod types;

// Re-exports
pub use cart::{Cart, CartItem, MAX_QUANTITY};
pub use types::*;
