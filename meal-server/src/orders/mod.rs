//! Orders Module
//!
//! - **manager**: checkout, order history, delivery tracking
//! - **lifecycle**: delivery state machine, timeline and tracker back-fill plan
//! - **money**: decimal helpers for totals and stored amounts
//!
//! ```text
//! Cart ──checkout──▶ Order (SQLite) ──▶ DeliverySimulation ──▶ OrderStatusEvent
//!                                                   │
//!                                     delivered ────┴──▶ MealTracker
//! ```

pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod money;

pub use error::{OrderError, OrderResult};
pub use lifecycle::{DeliveryObserver, DeliverySimulation, Flow};
pub use manager::{DeliveryTracking, OrderManager, OrderSettings};
