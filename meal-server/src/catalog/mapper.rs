//! Recipe API response → [`Meal`]
//!
//! Each recipe is mapped on its own: one with missing id, title or calories
//! is skipped and logged, the rest of the page still maps. Mapping is
//! deterministic (price from calories, restaurant by position).

use super::recipe_api::condition_diets;
use crate::orders::money::price_from_calories;
use serde::Deserialize;
use shared::models::{HealthCondition, Meal, MealSource, MealType, Nutrition, Restaurant};
use thiserror::Error;

const DEFAULT_DESCRIPTION: &str = "A healthy and delicious meal.";
const DEFAULT_PREPARATION: &str = "Please visit the recipe source for detailed instructions.";

/// Response envelope of `complexSearch`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDto {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub summary: Option<String>,
    pub instructions: Option<String>,
    #[serde(default)]
    pub dish_types: Vec<String>,
    #[serde(default)]
    pub diets: Vec<String>,
    pub dairy_free: Option<bool>,
    pub gluten_free: Option<bool>,
    #[serde(default)]
    pub very_healthy: bool,
    #[serde(default)]
    pub extended_ingredients: Vec<IngredientDto>,
    pub nutrition: Option<NutritionDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IngredientDto {
    pub original: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NutritionDto {
    #[serde(default)]
    pub nutrients: Vec<NutrientDto>,
}

#[derive(Debug, Deserialize)]
pub struct NutrientDto {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    #[error("recipe has no id")]
    MissingId,
    #[error("recipe {0} has no title")]
    MissingTitle(i64),
    #[error("recipe {0} has no calories")]
    MissingCalories(i64),
}

impl RecipeDto {
    fn nutrient(&self, name: &str) -> Option<f64> {
        self.nutrition
            .as_ref()?
            .nutrients
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(name))
            .map(|n| n.amount)
            .filter(|amount| amount.is_finite())
    }
}

/// Map every result; malformed entries are logged and dropped
pub fn map_results(response: SearchResponse, restaurants: &[Restaurant]) -> Vec<Meal> {
    let mut meals = Vec::with_capacity(response.results.len());
    for (index, raw) in response.results.into_iter().enumerate() {
        let recipe: RecipeDto = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping undecodable recipe");
                continue;
            }
        };
        match map_recipe(recipe, index, restaurants) {
            Ok(meal) => meals.push(meal),
            Err(e) => tracing::warn!(index, error = %e, "Skipping incomplete recipe"),
        }
    }
    meals
}

pub fn map_recipe(
    recipe: RecipeDto,
    index: usize,
    restaurants: &[Restaurant],
) -> Result<Meal, MappingError> {
    let id = recipe.id.ok_or(MappingError::MissingId)?;
    let title = recipe
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(MappingError::MissingTitle(id))?
        .to_string();
    let calories = recipe
        .nutrient("Calories")
        .ok_or(MappingError::MissingCalories(id))?
        .round();

    let nutrition = Nutrition {
        calories,
        protein: recipe.nutrient("Protein").unwrap_or(0.0).round(),
        carbs: recipe.nutrient("Carbohydrates").unwrap_or(0.0).round(),
        fats: recipe.nutrient("Fat").unwrap_or(0.0).round(),
    };

    let mut allergens = Vec::new();
    if recipe.dairy_free == Some(false) {
        allergens.push("Dairy".to_string());
    }
    if recipe.gluten_free == Some(false) {
        allergens.push("Gluten".to_string());
    }

    let description = recipe
        .summary
        .as_deref()
        .map(strip_html)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let preparation = recipe
        .instructions
        .as_deref()
        .map(strip_html)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_PREPARATION.to_string());
    let image_url = recipe
        .image
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("https://spoonacular.com/recipeImages/{id}-556x370.jpg"));

    let restaurant = if restaurants.is_empty() {
        None
    } else {
        Some(restaurants[index % restaurants.len()].clone())
    };

    Ok(Meal {
        id: id.to_string(),
        name: title,
        description,
        image_url,
        nutrition,
        suitable_for: suitable_conditions(&recipe),
        allergens,
        ingredients: recipe
            .extended_ingredients
            .iter()
            .filter_map(|i| i.original.clone())
            .collect(),
        preparation,
        meal_type: meal_type_from_dish_types(&recipe.dish_types),
        tags: recipe
            .diets
            .iter()
            .chain(recipe.dish_types.iter())
            .cloned()
            .collect(),
        price: price_from_calories(calories),
        restaurant,
        source: MealSource::External,
    })
}

/// Conditions whose diets appear in the recipe's diets or dish types
fn suitable_conditions(recipe: &RecipeDto) -> Vec<HealthCondition> {
    let mut conditions: Vec<HealthCondition> = HealthCondition::ALL
        .into_iter()
        .filter(|condition| {
            let (diets, _) = condition_diets(*condition);
            diets.iter().any(|diet| {
                recipe.diets.iter().any(|d| d == diet)
                    || recipe.dish_types.iter().any(|d| d == diet)
                    || (recipe.very_healthy && *diet == "anti-inflammatory")
            })
        })
        .collect();

    if conditions.is_empty() {
        conditions.push(HealthCondition::None);
    }
    conditions
}

pub fn meal_type_from_dish_types(dish_types: &[String]) -> MealType {
    let has = |names: &[&str]| {
        dish_types
            .iter()
            .any(|t| names.iter().any(|n| t.eq_ignore_ascii_case(n)))
    };

    if has(&["breakfast", "brunch", "morning meal"]) {
        MealType::Breakfast
    } else if has(&["lunch", "main course", "main dish", "salad"]) {
        MealType::Lunch
    } else if has(&["snack", "appetizer", "side dish", "dessert"]) {
        MealType::Snack
    } else {
        MealType::Dinner
    }
}

/// Drop everything between `<` and `>`
pub fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::data::api_restaurants;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn recipe_json(id: i64, calories: f64) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Quinoa Salad",
            "summary": "<b>Fresh</b> and <i>light</i>",
            "instructions": "<ol><li>Mix</li></ol>",
            "dishTypes": ["salad", "side dish"],
            "diets": ["gluten free", "fodmap"],
            "dairyFree": false,
            "glutenFree": true,
            "veryHealthy": true,
            "extendedIngredients": [{"original": "1 cup quinoa"}],
            "nutrition": {"nutrients": [
                {"name": "Calories", "amount": calories},
                {"name": "Protein", "amount": 12.4},
                {"name": "Fat", "amount": 9.6}
            ]}
        })
    }

    #[test]
    fn test_map_recipe_fields() {
        let response = SearchResponse {
            results: vec![recipe_json(101, 420.0)],
        };
        let meals = map_results(response, &api_restaurants());
        assert_eq!(meals.len(), 1);

        let meal = &meals[0];
        assert_eq!(meal.id, "101");
        assert_eq!(meal.description, "Fresh and light");
        assert_eq!(meal.preparation, "Mix");
        assert_eq!(meal.meal_type, MealType::Lunch);
        assert_eq!(meal.allergens, vec!["Dairy".to_string()]);
        assert_eq!(meal.nutrition.protein, 12.0);
        assert_eq!(meal.nutrition.carbs, 0.0);
        assert_eq!(meal.price, Decimal::new(630, 2));
        assert_eq!(meal.source, MealSource::External);
        assert_eq!(meal.restaurant_id(), Some("api-r1"));
        assert_eq!(
            meal.image_url,
            "https://spoonacular.com/recipeImages/101-556x370.jpg"
        );
        assert_eq!(meal.tags, vec!["gluten free", "fodmap", "salad", "side dish"]);
        // fodmap → crohns, colitis, ibs; veryHealthy → anti-inflammatory group
        assert!(meal.suitable_for.contains(&HealthCondition::Ibs));
        assert!(meal.suitable_for.contains(&HealthCondition::Lupus));
        assert!(!meal.suitable_for.contains(&HealthCondition::None));
    }

    #[test]
    fn test_incomplete_recipes_are_skipped() {
        let mut no_title = recipe_json(2, 300.0);
        no_title["title"] = json!("  ");
        let mut no_calories = recipe_json(3, 300.0);
        no_calories["nutrition"] = json!({"nutrients": []});

        let response = SearchResponse {
            results: vec![
                json!({"title": "no id"}),
                no_title,
                no_calories,
                json!("not an object"),
                recipe_json(4, 300.0),
            ],
        };
        let meals = map_results(response, &api_restaurants());
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].id, "4");
        // restaurant follows the position in the page
        assert_eq!(meals[0].restaurant_id(), Some("api-r2"));
    }

    #[test]
    fn test_envelope_mismatch_is_error() {
        assert!(serde_json::from_str::<SearchResponse>(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn test_meal_type_from_dish_types() {
        let t = |v: &[&str]| {
            meal_type_from_dish_types(&v.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        };
        assert_eq!(t(&["Brunch"]), MealType::Breakfast);
        assert_eq!(t(&["main course"]), MealType::Lunch);
        assert_eq!(t(&["dessert"]), MealType::Snack);
        assert_eq!(t(&["soup"]), MealType::Dinner);
        assert_eq!(t(&[]), MealType::Dinner);
    }

    #[test]
    fn test_suitability_defaults_to_none() {
        let recipe = RecipeDto {
            diets: vec!["primal".into()],
            ..Default::default()
        };
        assert_eq!(suitable_conditions(&recipe), vec![HealthCondition::None]);
    }
}
