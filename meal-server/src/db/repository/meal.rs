//! Meal Repository (persisted meals)

use super::RepoResult;
use crate::orders::money::{to_decimal, to_f64};
use shared::models::{HealthCondition, Meal, MealSource, Nutrition, Restaurant};
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct MealRow {
    id: String,
    name: String,
    description: String,
    image_url: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fats: f64,
    suitable_for: String,
    allergens: String,
    ingredients: String,
    preparation: String,
    meal_type: String,
    tags: String,
    price: f64,
    restaurant: Option<String>,
}

impl MealRow {
    fn into_meal(self) -> RepoResult<Meal> {
        let suitable_for: Vec<String> = serde_json::from_str(&self.suitable_for)?;
        let restaurant: Option<Restaurant> = match self.restaurant {
            Some(raw) => Some(serde_json::from_str(&raw)?),
            None => None,
        };

        Ok(Meal {
            meal_type: self
                .meal_type
                .parse()
                .map_err(super::RepoError::Database)?,
            id: self.id,
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            nutrition: Nutrition {
                calories: self.calories,
                protein: self.protein,
                carbs: self.carbs,
                fats: self.fats,
            },
            suitable_for: suitable_for
                .iter()
                .filter_map(|c| c.parse::<HealthCondition>().ok())
                .collect(),
            allergens: serde_json::from_str(&self.allergens)?,
            ingredients: serde_json::from_str(&self.ingredients)?,
            preparation: self.preparation,
            tags: serde_json::from_str(&self.tags)?,
            price: to_decimal(self.price),
            restaurant,
            source: MealSource::Persisted,
        })
    }
}

const SELECT_MEAL: &str = "SELECT id, name, description, image_url, calories, protein, carbs, fats,
    suitable_for, allergens, ingredients, preparation, meal_type, tags, price, restaurant
    FROM meals";

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Meal>> {
    let row = sqlx::query_as::<_, MealRow>(&format!("{SELECT_MEAL} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(MealRow::into_meal).transpose()
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Meal>> {
    let rows = sqlx::query_as::<_, MealRow>(&format!("{SELECT_MEAL} ORDER BY name"))
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(MealRow::into_meal).collect()
}

/// Insert or replace a meal row
pub async fn upsert(pool: &SqlitePool, meal: &Meal) -> RepoResult<()> {
    let suitable_for: Vec<&str> = meal.suitable_for.iter().map(|c| c.as_str()).collect();
    let restaurant = meal
        .restaurant
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        "INSERT INTO meals (id, name, description, image_url, calories, protein, carbs, fats,
            suitable_for, allergens, ingredients, preparation, meal_type, tags, price, restaurant)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name, description = excluded.description,
            image_url = excluded.image_url, calories = excluded.calories,
            protein = excluded.protein, carbs = excluded.carbs, fats = excluded.fats,
            suitable_for = excluded.suitable_for, allergens = excluded.allergens,
            ingredients = excluded.ingredients, preparation = excluded.preparation,
            meal_type = excluded.meal_type, tags = excluded.tags, price = excluded.price,
            restaurant = excluded.restaurant",
    )
    .bind(&meal.id)
    .bind(&meal.name)
    .bind(&meal.description)
    .bind(&meal.image_url)
    .bind(meal.nutrition.calories)
    .bind(meal.nutrition.protein)
    .bind(meal.nutrition.carbs)
    .bind(meal.nutrition.fats)
    .bind(serde_json::to_string(&suitable_for)?)
    .bind(serde_json::to_string(&meal.allergens)?)
    .bind(serde_json::to_string(&meal.ingredients)?)
    .bind(&meal.preparation)
    .bind(meal.meal_type.as_str())
    .bind(serde_json::to_string(&meal.tags)?)
    .bind(to_f64(meal.price))
    .bind(restaurant)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::data::static_meals;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_upsert_marks_meal_as_persisted() {
        let db = DbService::in_memory().await.unwrap();
        let meal = static_meals().remove(3);
        upsert(&db.pool, &meal).await.unwrap();

        let loaded = find_by_id(&db.pool, &meal.id).await.unwrap().unwrap();
        assert_eq!(loaded.source, MealSource::Persisted);
        assert_eq!(loaded.price, meal.price);
        assert_eq!(loaded.allergens, vec!["nuts".to_string()]);
        assert_eq!(loaded.suitable_for, meal.suitable_for);
        assert_eq!(loaded.restaurant, meal.restaurant);

        assert_eq!(find_all(&db.pool).await.unwrap().len(), 1);
        assert!(find_by_id(&db.pool, "nope").await.unwrap().is_none());
    }
}
