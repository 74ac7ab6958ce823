//! Meal Log Repository
//!
//! `meal_logs` (one per user and date) and `meal_log_items`.

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{LogOrigin, MealLog, MealLogEntry};
use shared::util::now_millis;
use sqlx::SqlitePool;
use std::collections::HashMap;

#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    id: i64,
    user_id: String,
    date: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i64,
    meal_log_id: i64,
    meal_id: String,
    meal_type: String,
    time_consumed: i64,
    notes: Option<String>,
}

impl ItemRow {
    fn into_entry(self) -> RepoResult<MealLogEntry> {
        Ok(MealLogEntry {
            entry_id: Some(self.id),
            meal_type: self.meal_type.parse().map_err(RepoError::Database)?,
            meal_id: self.meal_id,
            time_consumed: self.time_consumed,
            notes: self.notes,
        })
    }
}

/// All logs of a user with their entries, newest date first
pub async fn find_by_user(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<MealLog>> {
    let logs = sqlx::query_as::<_, LogRow>(
        "SELECT id, user_id, date FROM meal_logs WHERE user_id = ? ORDER BY date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let items = sqlx::query_as::<_, ItemRow>(
        "SELECT i.id, i.meal_log_id, i.meal_id, i.meal_type, i.time_consumed, i.notes
         FROM meal_log_items i JOIN meal_logs l ON l.id = i.meal_log_id
         WHERE l.user_id = ? ORDER BY i.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut by_log: HashMap<i64, Vec<MealLogEntry>> = HashMap::new();
    for item in items {
        let log_id = item.meal_log_id;
        by_log.entry(log_id).or_default().push(item.into_entry()?);
    }

    let mut result = Vec::with_capacity(logs.len());
    for log in logs {
        let date = NaiveDate::parse_from_str(&log.date, "%Y-%m-%d")
            .map_err(|e| RepoError::Database(format!("Bad log date {}: {e}", log.date)))?;
        let entries = by_log.remove(&log.id).unwrap_or_default();

        result.push(MealLog {
            id: log.id.to_string(),
            user_id: log.user_id,
            date,
            origin: LogOrigin::Backend,
            entries,
        });
    }
    Ok(result)
}

/// Create the (user, date) log row and return its id
pub async fn create_log(pool: &SqlitePool, user_id: &str, date: NaiveDate) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO meal_logs (user_id, date, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(date.format("%Y-%m-%d").to_string())
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn insert_item(pool: &SqlitePool, log_id: i64, entry: &MealLogEntry) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO meal_log_items (meal_log_id, meal_id, meal_type, time_consumed, notes)
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(log_id)
    .bind(&entry.meal_id)
    .bind(entry.meal_type.as_str())
    .bind(entry.time_consumed)
    .bind(&entry.notes)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn delete_item(pool: &SqlitePool, item_id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM meal_log_items WHERE id = ?")
        .bind(item_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Meal log item {item_id} not found")));
    }
    Ok(())
}

/// Delete a log and its items; all or nothing
pub async fn delete_log(pool: &SqlitePool, log_id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM meal_log_items WHERE meal_log_id = ?")
        .bind(log_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM meal_logs WHERE id = ?")
        .bind(log_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
