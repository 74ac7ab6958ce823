//! Profile Repository
//!
//! `profiles` plus the three attribute tables keyed by user id.

use super::{RepoError, RepoResult};
use shared::models::{Gender, HealthCondition, UserProfile};
use shared::util::now_millis;
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: String,
    name: String,
    age: i64,
    height: f64,
    weight: f64,
    gender: String,
    bmi: Option<f64>,
}

pub async fn find(pool: &SqlitePool, user_id: &str) -> RepoResult<Option<UserProfile>> {
    let row = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, name, age, height, weight, gender, bmi FROM profiles WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let conditions: Vec<String> = sqlx::query_scalar(
        "SELECT condition FROM user_health_conditions WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let allergies: Vec<String> =
        sqlx::query_scalar("SELECT allergy FROM user_allergies WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    let preferences: Vec<String> = sqlx::query_scalar(
        "SELECT preference FROM user_dietary_preferences WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let health_conditions = conditions
        .iter()
        .filter_map(|c| match c.parse::<HealthCondition>() {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Skipping stored health condition");
                None
            }
        })
        .collect();

    Ok(Some(UserProfile {
        id: row.id,
        name: row.name,
        age: u32::try_from(row.age).unwrap_or(0),
        height_cm: row.height,
        weight_kg: row.weight,
        gender: row.gender.parse().unwrap_or(Gender::Other),
        health_conditions,
        allergies,
        dietary_preferences: preferences,
        bmi: row.bmi,
    }))
}

/// Upsert the profile row and replace the attribute lists
pub async fn save(pool: &SqlitePool, profile: &UserProfile) -> RepoResult<()> {
    if profile.id.is_empty() {
        return Err(RepoError::Validation("profile id is required".into()));
    }

    sqlx::query(
        "INSERT INTO profiles (id, name, age, height, weight, gender, bmi, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name, age = excluded.age, height = excluded.height,
            weight = excluded.weight, gender = excluded.gender, bmi = excluded.bmi,
            updated_at = excluded.updated_at",
    )
    .bind(&profile.id)
    .bind(&profile.name)
    .bind(i64::from(profile.age))
    .bind(profile.height_cm)
    .bind(profile.weight_kg)
    .bind(profile.gender.as_str())
    .bind(profile.bmi)
    .bind(now_millis())
    .execute(pool)
    .await?;

    let conditions: Vec<&str> = profile.health_conditions.iter().map(|c| c.as_str()).collect();
    replace_list(pool, "user_health_conditions", "condition", &profile.id, &conditions).await?;

    let allergies: Vec<&str> = profile.allergies.iter().map(String::as_str).collect();
    replace_list(pool, "user_allergies", "allergy", &profile.id, &allergies).await?;

    let preferences: Vec<&str> = profile
        .dietary_preferences
        .iter()
        .map(String::as_str)
        .collect();
    replace_list(
        pool,
        "user_dietary_preferences",
        "preference",
        &profile.id,
        &preferences,
    )
    .await?;

    Ok(())
}

/// Delete then insert; table/column names are compile-time constants
async fn replace_list(
    pool: &SqlitePool,
    table: &'static str,
    column: &'static str,
    user_id: &str,
    values: &[&str],
) -> RepoResult<()> {
    sqlx::query(&format!("DELETE FROM {table} WHERE user_id = ?"))
        .bind(user_id)
        .execute(pool)
        .await?;

    let insert = format!("INSERT INTO {table} (user_id, {column}) VALUES (?, ?)");
    for value in values {
        sqlx::query(&insert)
            .bind(user_id)
            .bind(*value)
            .execute(pool)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_save_and_find_roundtrip_replaces_lists() {
        let db = DbService::in_memory().await.unwrap();
        let mut profile = UserProfile::empty("u1");
        profile.name = "Ada".into();
        profile.age = 30;
        profile.health_conditions = vec![HealthCondition::Diabetes, HealthCondition::Ibs];
        profile.allergies = vec!["nuts".into()];
        save(&db.pool, &profile).await.unwrap();

        profile.health_conditions = vec![HealthCondition::Lupus];
        profile.allergies.clear();
        save(&db.pool, &profile).await.unwrap();

        let loaded = find(&db.pool, "u1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Ada");
        assert_eq!(loaded.health_conditions, vec![HealthCondition::Lupus]);
        assert!(loaded.allergies.is_empty());
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let db = DbService::in_memory().await.unwrap();
        assert!(find(&db.pool, "ghost").await.unwrap().is_none());
    }
}
