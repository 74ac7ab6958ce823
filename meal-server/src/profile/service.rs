//! Profile Store
//!
//! Thin layer over the profile repository: default profile for new users,
//! numeric validation and BMI derivation on save.

use crate::db::repository::profile as profile_repo;
use crate::utils::{AppError, AppResult, ErrorCode};
use serde::Deserialize;
use shared::models::{Gender, HealthCondition, UserProfile, compute_bmi};
use sqlx::SqlitePool;

/// Fields a user may edit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: String,
    pub age: i64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: Gender,
    pub health_conditions: Vec<HealthCondition>,
    pub allergies: Vec<String>,
    pub dietary_preferences: Vec<String>,
}

impl ProfileUpdate {
    fn validate(&self) -> AppResult<()> {
        if self.age < 0 || self.age > i64::from(u32::MAX) {
            return Err(invalid_metric("age", self.age));
        }
        for (field, value) in [("height_cm", self.height_cm), ("weight_kg", self.weight_kg)] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid_metric(field, value));
            }
        }
        Ok(())
    }
}

fn invalid_metric(field: &str, value: impl Into<serde_json::Value>) -> AppError {
    AppError::with_message(
        ErrorCode::ProfileInvalidMetric,
        format!("{field} must be a non-negative number"),
    )
    .with_detail("field", field)
    .with_detail("value", value)
}

/// Trim, drop blanks and duplicates, keep order
fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct ProfileService {
    pool: SqlitePool,
}

impl ProfileService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stored profile, or the empty default for a user without one
    pub async fn get(&self, user_id: &str) -> AppResult<UserProfile> {
        Ok(profile_repo::find(&self.pool, user_id)
            .await?
            .unwrap_or_else(|| UserProfile::empty(user_id)))
    }

    pub async fn save(&self, user_id: &str, update: ProfileUpdate) -> AppResult<UserProfile> {
        update.validate()?;

        let mut health_conditions = Vec::with_capacity(update.health_conditions.len());
        for condition in update.health_conditions {
            if !health_conditions.contains(&condition) {
                health_conditions.push(condition);
            }
        }

        let profile = UserProfile {
            id: user_id.to_string(),
            name: update.name.trim().to_string(),
            age: u32::try_from(update.age).unwrap_or(0),
            height_cm: update.height_cm,
            weight_kg: update.weight_kg,
            gender: update.gender,
            health_conditions,
            allergies: clean_list(update.allergies),
            dietary_preferences: clean_list(update.dietary_preferences),
            bmi: compute_bmi(update.height_cm, update.weight_kg),
        };

        profile_repo::save(&self.pool, &profile).await?;
        tracing::info!(
            user_id = %user_id,
            complete = profile.is_complete(),
            conditions = profile.health_conditions.len(),
            "Profile saved"
        );
        Ok(profile)
    }

    pub async fn is_complete(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.get(user_id).await?.is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn service() -> ProfileService {
        ProfileService::new(DbService::in_memory().await.unwrap().pool)
    }

    #[tokio::test]
    async fn test_default_profile_for_new_user() {
        let profiles = service().await;
        let profile = profiles.get("u1").await.unwrap();
        assert_eq!(profile, UserProfile::empty("u1"));
        assert!(!profiles.is_complete("u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_computes_bmi_and_cleans_lists() {
        let profiles = service().await;
        let saved = profiles
            .save(
                "u1",
                ProfileUpdate {
                    name: "  Ada ".into(),
                    age: 36,
                    height_cm: 180.0,
                    weight_kg: 75.0,
                    gender: Gender::Female,
                    health_conditions: vec![HealthCondition::Lupus, HealthCondition::Lupus],
                    allergies: vec!["nuts".into(), " ".into(), "nuts".into()],
                    dietary_preferences: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(saved.name, "Ada");
        assert_eq!(saved.bmi, Some(23.1));
        assert_eq!(saved.health_conditions, vec![HealthCondition::Lupus]);
        assert_eq!(saved.allergies, vec!["nuts".to_string()]);
        assert_eq!(profiles.get("u1").await.unwrap(), saved);
        assert!(profiles.is_complete("u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_metrics_rejected() {
        let profiles = service().await;
        for update in [
            ProfileUpdate {
                age: -1,
                ..Default::default()
            },
            ProfileUpdate {
                height_cm: f64::NAN,
                ..Default::default()
            },
            ProfileUpdate {
                weight_kg: -70.0,
                ..Default::default()
            },
        ] {
            let err = profiles.save("u1", update).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::ProfileInvalidMetric);
        }
        assert_eq!(profiles.get("u1").await.unwrap(), UserProfile::empty("u1"));
    }

    #[tokio::test]
    async fn test_bmi_absent_without_height() {
        let profiles = service().await;
        let saved = profiles
            .save(
                "u1",
                ProfileUpdate {
                    name: "Ada".into(),
                    weight_kg: 70.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.bmi, None);
        assert!(!saved.is_complete());
    }
}
