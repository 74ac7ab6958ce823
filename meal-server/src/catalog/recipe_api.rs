//! Recipe API client
//!
//! `GET {base}/recipes/complexSearch` with diets and intolerances derived from
//! the profile. Callers that only want meals use [`RecipeSource::recommend`],
//! which turns every failure into an empty list.

use super::mapper::{self, SearchResponse};
use async_trait::async_trait;
use shared::models::{HealthCondition, Meal, MealType, Restaurant};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeApiError {
    #[error("Recipe API key not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Recipe API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Diets and intolerances requested for a health condition
pub fn condition_diets(
    condition: HealthCondition,
) -> (&'static [&'static str], &'static [&'static str]) {
    use HealthCondition as C;
    match condition {
        C::Diabetes => (&["diabetic", "low-carb"], &[]),
        C::Hypertension => (&["dash", "low-sodium"], &[]),
        C::CeliacDisease => (&["gluten-free"], &["gluten"]),
        C::CrohnsDisease => (&["fodmap", "low-fiber"], &["dairy"]),
        C::UlcerativeColitis => (&["fodmap", "low-fiber"], &[]),
        C::Ibs => (&["fodmap"], &[]),
        C::Cancer | C::Arthritis | C::Lupus | C::MultipleSclerosis => {
            (&["anti-inflammatory"], &[])
        }
        C::Hypothyroidism => (&["iodine-rich"], &["soy"]),
        C::Hyperthyroidism => (&["low-iodine"], &[]),
        C::Parkinsons => (&["high-protein"], &[]),
        C::Alzheimers => (&["mind", "mediterranean"], &[]),
        C::HeartDisease => (&["dash", "mediterranean", "low-fat"], &[]),
        C::KidneyDisease => (&["low-protein", "low-sodium", "low-potassium"], &[]),
        C::LiverDisease => (&["low-protein", "low-sodium"], &[]),
        C::HighCholesterol => (&["low-fat"], &[]),
        C::None => (&[], &[]),
    }
}

/// Allergy label → API intolerance (unknown allergies are dropped)
pub fn allergy_intolerance(allergy: &str) -> Option<&'static str> {
    const TABLE: [(&str, &str); 9] = [
        ("dairy", "dairy"),
        ("eggs", "egg"),
        ("peanuts", "peanut"),
        ("tree nuts", "tree nut"),
        ("soy", "soy"),
        ("wheat", "wheat"),
        ("fish", "seafood"),
        ("shellfish", "shellfish"),
        ("gluten", "gluten"),
    ];
    let key = allergy.trim();
    TABLE
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(key))
        .map(|(_, intolerance)| *intolerance)
}

fn push_unique(target: &mut Vec<String>, value: &str) {
    if !target.iter().any(|v| v == value) {
        target.push(value.to_string());
    }
}

/// Search parameters derived from a profile
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecipeQuery {
    pub diets: Vec<String>,
    pub intolerances: Vec<String>,
    pub meal_type: Option<MealType>,
    pub number: u32,
}

impl RecipeQuery {
    /// Allergy intolerances first, then condition intolerances; both de-duplicated
    pub fn from_profile(
        conditions: &[HealthCondition],
        allergies: &[String],
        meal_type: Option<MealType>,
        number: u32,
    ) -> Self {
        let mut query = Self {
            meal_type,
            number,
            ..Default::default()
        };

        for allergy in allergies {
            if let Some(intolerance) = allergy_intolerance(allergy) {
                push_unique(&mut query.intolerances, intolerance);
            }
        }
        for condition in conditions {
            let (diets, intolerances) = condition_diets(*condition);
            for diet in diets {
                push_unique(&mut query.diets, diet);
            }
            for intolerance in intolerances {
                push_unique(&mut query.intolerances, intolerance);
            }
        }
        query
    }

    pub fn params(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apiKey", api_key.to_string()),
            ("number", self.number.to_string()),
            ("addRecipeInformation", "true".into()),
            ("addRecipeNutrition", "true".into()),
            ("fillIngredients", "true".into()),
            ("instructionsRequired", "true".into()),
            ("sort", "healthiness".into()),
            ("sortDirection", "desc".into()),
        ];
        if !self.diets.is_empty() {
            params.push(("diet", self.diets.join(",")));
        }
        if !self.intolerances.is_empty() {
            params.push(("intolerances", self.intolerances.join(",")));
        }
        if let Some(meal_type) = self.meal_type {
            params.push(("type", meal_type.as_str().to_string()));
        }
        params
    }
}

/// Source of external meals
#[async_trait]
pub trait RecipeSource: Send + Sync {
    async fn search(&self, query: &RecipeQuery) -> Result<Vec<Meal>, RecipeApiError>;

    /// Like [`search`](Self::search) but any failure yields an empty list
    async fn recommend(&self, query: &RecipeQuery) -> Vec<Meal> {
        match self.search(query).await {
            Ok(meals) => meals,
            Err(RecipeApiError::NotConfigured) => {
                tracing::debug!("Recipe API not configured, skipping");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Recipe API request failed");
                Vec::new()
            }
        }
    }
}

/// reqwest backed recipe API client
pub struct RecipeApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    restaurants: Vec<Restaurant>,
}

impl RecipeApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        restaurants: Vec<Restaurant>,
    ) -> Result<Self, RecipeApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            restaurants,
        })
    }
}

impl std::fmt::Debug for RecipeApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[async_trait]
impl RecipeSource for RecipeApiClient {
    async fn search(&self, query: &RecipeQuery) -> Result<Vec<Meal>, RecipeApiError> {
        let api_key = self.api_key.as_deref().ok_or(RecipeApiError::NotConfigured)?;
        let url = format!("{}/recipes/complexSearch", self.base_url);

        tracing::debug!(
            diets = ?query.diets,
            intolerances = ?query.intolerances,
            number = query.number,
            "Querying recipe API"
        );

        let resp = self
            .http
            .get(&url)
            .query(&query.params(api_key))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(RecipeApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        let response: SearchResponse = serde_json::from_str(&body)?;
        let meals = mapper::map_results(response, &self.restaurants);

        tracing::info!(count = meals.len(), "Recipe API meals fetched");
        Ok(meals)
    }
}
