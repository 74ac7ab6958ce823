//! Meal Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 餐次
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Round-robin order used when back-filling delivered orders
    pub const ROTATION: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            other => Err(format!("unknown meal type: {other}")),
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a meal came from
///
/// | Source      | Origin                              | Backend row |
/// |-------------|-------------------------------------|-------------|
/// | `catalog`   | bundled static dataset (m1..m6)     | no          |
/// | `external`  | recipe API, synthesized per request | no          |
/// | `persisted` | `meals` table in the row backend    | yes         |
///
/// Only persisted meals can be referenced by backend meal-log rows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MealSource {
    #[default]
    Catalog,
    External,
    Persisted,
}

impl MealSource {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::External => "external",
            Self::Persisted => "persisted",
        }
    }
}

impl FromStr for MealSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catalog" => Ok(Self::Catalog),
            "external" => Ok(Self::External),
            "persisted" => Ok(Self::Persisted),
            other => Err(format!("unknown meal source: {other}")),
        }
    }
}

/// 健康状况 (closed set)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HealthCondition {
    Diabetes,
    Hypertension,
    CeliacDisease,
    CrohnsDisease,
    UlcerativeColitis,
    Ibs,
    Cancer,
    Hypothyroidism,
    Hyperthyroidism,
    Arthritis,
    Lupus,
    MultipleSclerosis,
    Parkinsons,
    Alzheimers,
    HeartDisease,
    KidneyDisease,
    LiverDisease,
    HighCholesterol,
    None,
}

impl HealthCondition {
    pub const ALL: [HealthCondition; 19] = [
        Self::Diabetes,
        Self::Hypertension,
        Self::CeliacDisease,
        Self::CrohnsDisease,
        Self::UlcerativeColitis,
        Self::Ibs,
        Self::Cancer,
        Self::Hypothyroidism,
        Self::Hyperthyroidism,
        Self::Arthritis,
        Self::Lupus,
        Self::MultipleSclerosis,
        Self::Parkinsons,
        Self::Alzheimers,
        Self::HeartDisease,
        Self::KidneyDisease,
        Self::LiverDisease,
        Self::HighCholesterol,
        Self::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::Hypertension => "hypertension",
            Self::CeliacDisease => "celiac_disease",
            Self::CrohnsDisease => "crohns_disease",
            Self::UlcerativeColitis => "ulcerative_colitis",
            Self::Ibs => "ibs",
            Self::Cancer => "cancer",
            Self::Hypothyroidism => "hypothyroidism",
            Self::Hyperthyroidism => "hyperthyroidism",
            Self::Arthritis => "arthritis",
            Self::Lupus => "lupus",
            Self::MultipleSclerosis => "multiple_sclerosis",
            Self::Parkinsons => "parkinsons",
            Self::Alzheimers => "alzheimers",
            Self::HeartDisease => "heart_disease",
            Self::KidneyDisease => "kidney_disease",
            Self::LiverDisease => "liver_disease",
            Self::HighCholesterol => "high_cholesterol",
            Self::None => "none",
        }
    }
}

impl FromStr for HealthCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown health condition: {s}"))
    }
}

/// Restaurant a meal is delivered from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub address: String,
    pub distance_km: f64,
    pub rating: f64,
    pub delivery_time_minutes: u32,
}

/// Nutritional facts, macros in grams
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl std::ops::AddAssign for Nutrition {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.protein += rhs.protein;
        self.carbs += rhs.carbs;
        self.fats += rhs.fats;
    }
}

/// Meal entity (immutable once loaded)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub nutrition: Nutrition,
    /// Health conditions this meal is suitable for
    pub suitable_for: Vec<HealthCondition>,
    pub allergens: Vec<String>,
    pub ingredients: Vec<String>,
    pub preparation: String,
    pub meal_type: MealType,
    pub tags: Vec<String>,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<Restaurant>,
    #[serde(default)]
    pub source: MealSource,
}

impl Meal {
    /// Meals priced at zero (or below) cannot be ordered
    pub fn has_usable_price(&self) -> bool {
        self.price > Decimal::ZERO
    }

    pub fn restaurant_id(&self) -> Option<&str> {
        self.restaurant.as_ref().map(|r| r.id.as_str())
    }
}
