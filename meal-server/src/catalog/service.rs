//! Catalog Service - static catalog, recipe API results and persisted meals
//!
//! Meal lookup order: persisted rows, then meals registered by earlier
//! recommendations, then the static catalog.

use super::data::{api_restaurants, static_meals};
use super::filter::{MealTypeFilter, filter_meals};
use super::recipe_api::{RecipeQuery, RecipeSource};
use crate::db::repository::meal as meal_repo;
use crate::orders::money::price_from_calories;
use crate::utils::{AppError, AppResult, ErrorCode};
use parking_lot::RwLock;
use serde::Serialize;
use shared::models::{Meal, MealSource, UserProfile};
use sqlx::SqlitePool;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationOrigin {
    /// Recipe API results
    External,
    /// Static catalog filtered against the profile
    Catalog,
    /// Nothing matched; the whole static catalog
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub origin: RecommendationOrigin,
    pub meals: Vec<Meal>,
}

/// Recipe API meals kept for lookups after a recommendation
pub const REGISTRY_CAPACITY: usize = 1024;

/// Insertion-ordered id -> meal map; the oldest entry goes first when full
#[derive(Debug)]
struct MealRegistry {
    meals: HashMap<String, Meal>,
    order: VecDeque<String>,
    capacity: usize,
}

impl MealRegistry {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            meals: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn insert(&mut self, meal: Meal) {
        if self.meals.insert(meal.id.clone(), meal.clone()).is_some() {
            return;
        }
        self.order.push_back(meal.id);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.meals.remove(&oldest);
            }
        }
    }

    fn get(&self, id: &str) -> Option<&Meal> {
        self.meals.get(id)
    }

    fn len(&self) -> usize {
        self.meals.len()
    }
}

#[derive(Clone)]
pub struct CatalogService {
    pool: SqlitePool,
    recipes: Arc<dyn RecipeSource>,
    static_meals: Arc<Vec<Meal>>,
    /// Meals handed out by recommendations
    registered: Arc<RwLock<MealRegistry>>,
    limit: u32,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("static_count", &self.static_meals.len())
            .field("registered_count", &self.registered.read().len())
            .field("limit", &self.limit)
            .finish()
    }
}

impl CatalogService {
    pub fn new(pool: SqlitePool, recipes: Arc<dyn RecipeSource>, limit: u32) -> Self {
        Self {
            pool,
            recipes,
            static_meals: Arc::new(static_meals()),
            registered: Arc::new(RwLock::new(MealRegistry::with_capacity(REGISTRY_CAPACITY))),
            limit,
        }
    }

    pub fn static_catalog(&self) -> &[Meal] {
        &self.static_meals
    }

    // =========================================================================
    // Recommendation
    // =========================================================================

    /// Meals for a complete profile: API results, else the filtered static
    /// catalog, else the whole static catalog
    pub async fn recommend(
        &self,
        profile: &UserProfile,
        view: MealTypeFilter,
    ) -> AppResult<Recommendation> {
        if !profile.is_complete() {
            return Err(AppError::with_message(
                ErrorCode::ProfileIncomplete,
                "Complete your health profile to get personalized meal suggestions",
            ));
        }

        let query = RecipeQuery::from_profile(
            &profile.health_conditions,
            &profile.allergies,
            None,
            self.limit,
        );
        let external = self.recipes.recommend(&query).await;

        let (origin, meals) = if !external.is_empty() {
            (RecommendationOrigin::External, external)
        } else {
            let filtered = filter_meals(
                &profile.health_conditions,
                &profile.allergies,
                &self.static_meals,
            );
            if filtered.is_empty() {
                (RecommendationOrigin::Fallback, self.static_meals.to_vec())
            } else {
                (RecommendationOrigin::Catalog, filtered)
            }
        };
        let meals = with_price_and_restaurant(meals);

        self.register(&meals);
        tracing::info!(
            user_id = %profile.id,
            origin = ?origin,
            count = meals.len(),
            "Meal recommendations prepared"
        );

        Ok(Recommendation {
            origin,
            meals: view.apply(meals),
        })
    }

    fn register(&self, meals: &[Meal]) {
        let mut registered = self.registered.write();
        for meal in meals.iter().filter(|m| m.source == MealSource::External) {
            registered.insert(meal.clone());
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Resolve a meal id; `None` when no source knows it
    pub async fn find(&self, meal_id: &str) -> AppResult<Option<Meal>> {
        if let Some(meal) = meal_repo::find_by_id(&self.pool, meal_id).await? {
            return Ok(Some(meal));
        }
        Ok(self.find_in_memory(meal_id))
    }

    pub async fn get(&self, meal_id: &str) -> AppResult<Meal> {
        self.find(meal_id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::MealNotFound, format!("Meal {meal_id} not found"))
                .with_detail("meal_id", meal_id)
        })
    }

    /// Registered or static meal, without touching the row backend
    pub fn find_in_memory(&self, meal_id: &str) -> Option<Meal> {
        if let Some(meal) = self.registered.read().get(meal_id) {
            return Some(meal.clone());
        }
        self.static_meals.iter().find(|m| m.id == meal_id).cloned()
    }

    // =========================================================================
    // Persisted meals
    // =========================================================================

    /// Store a known meal as a backend row
    pub async fn persist(&self, meal_id: &str) -> AppResult<Meal> {
        let meal = self.get(meal_id).await?;
        if meal.source.is_persisted() {
            return Ok(meal);
        }
        meal_repo::upsert(&self.pool, &meal).await?;
        tracing::info!(meal_id = %meal_id, "Meal persisted");

        Ok(Meal {
            source: MealSource::Persisted,
            ..meal
        })
    }

    pub async fn list_persisted(&self) -> AppResult<Vec<Meal>> {
        Ok(meal_repo::find_all(&self.pool).await?)
    }
}

/// Fill in a price from calories and a restaurant round-robin where missing
fn with_price_and_restaurant(meals: Vec<Meal>) -> Vec<Meal> {
    let restaurants = api_restaurants();
    meals
        .into_iter()
        .enumerate()
        .map(|(index, mut meal)| {
            if !meal.has_usable_price() {
                meal.price = price_from_calories(meal.nutrition.calories);
            }
            if meal.restaurant.is_none() {
                meal.restaurant = Some(restaurants[index % restaurants.len()].clone());
            }
            meal
        })
        .collect()
}
