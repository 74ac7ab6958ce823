//! Meal Log Model

use super::meal::{MealType, Nutrition};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a log lives
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogOrigin {
    /// Row in `meal_logs`
    Backend,
    /// Held in memory only (non-persisted meals)
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealLogEntry {
    /// Backend row id, `None` for local entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<i64>,
    pub meal_id: String,
    pub meal_type: MealType,
    /// Unix millis
    pub time_consumed: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One log per (user, date); entries keep insertion order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealLog {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub origin: LogOrigin,
    pub entries: Vec<MealLogEntry>,
}

impl MealLog {
    /// Position of the first entry for `meal_id`
    pub fn position_of(&self, meal_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.meal_id == meal_id)
    }
}

/// Per-day nutrition totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyNutrition {
    pub date: NaiveDate,
    pub totals: Nutrition,
    pub entry_count: usize,
    /// Entries whose meal could not be resolved (counted as zero)
    pub unknown_entries: usize,
}
