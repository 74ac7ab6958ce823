//! 饮食记录 (Nutrition Tracker)

pub mod error;
pub mod manager;

pub use error::{TrackerError, TrackerResult};
pub use manager::{MealTracker, NewEntry};
