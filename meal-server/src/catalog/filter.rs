//! Meal Filter
//!
//! Pure functions, no I/O. A meal is eligible when:
//! 1. the profile lists real conditions (non-empty, no `none`) and at least
//!    one of them is in the meal's `suitable_for`, or the profile lists none;
//! 2. none of the meal's allergens is in the profile's allergy list.

use serde::Deserialize;
use shared::models::{HealthCondition, Meal, MealType};

/// Meals from `catalog` compatible with the given conditions and allergies
pub fn filter_meals(
    conditions: &[HealthCondition],
    allergies: &[String],
    catalog: &[Meal],
) -> Vec<Meal> {
    let check_conditions = !conditions.is_empty() && !conditions.contains(&HealthCondition::None);

    catalog
        .iter()
        .filter(|meal| {
            !check_conditions || meal.suitable_for.iter().any(|c| conditions.contains(c))
        })
        .filter(|meal| !has_allergen(meal, allergies))
        .cloned()
        .collect()
}

/// Allergen names compare case-insensitively
fn has_allergen(meal: &Meal, allergies: &[String]) -> bool {
    meal.allergens.iter().any(|allergen| {
        allergies
            .iter()
            .any(|a| a.trim().eq_ignore_ascii_case(allergen.trim()))
    })
}

/// 餐品类型视图过滤: `all` 或单一类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealTypeFilter {
    #[default]
    All,
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealTypeFilter {
    fn meal_type(self) -> Option<MealType> {
        match self {
            Self::All => None,
            Self::Breakfast => Some(MealType::Breakfast),
            Self::Lunch => Some(MealType::Lunch),
            Self::Dinner => Some(MealType::Dinner),
            Self::Snack => Some(MealType::Snack),
        }
    }

    pub fn apply(self, meals: Vec<Meal>) -> Vec<Meal> {
        match self.meal_type() {
            None => meals,
            Some(t) => meals.into_iter().filter(|m| m.meal_type == t).collect(),
        }
    }
}
