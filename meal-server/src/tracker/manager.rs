//! Nutrition Tracker
//!
//! Per-user, per-date meal logs. Entries for persisted meals are written to
//! the row backend; entries for catalog or recipe API meals live only in
//! memory. A log mixing both keeps the backend id.
//!
//! Each user's logs sit behind their own async mutex so that backend writes
//! and the in-memory update for one call finish before the next call starts.
//! Meal ids no source can resolve are still logged, locally.

use super::error::{TrackerError, TrackerResult};
use crate::catalog::CatalogService;
use crate::db::repository::meal_log as log_repo;
use chrono::NaiveDate;
use dashmap::DashMap;
use shared::models::{DailyNutrition, LogOrigin, MealLog, MealLogEntry, MealType, Nutrition};
use shared::util::now_millis;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A user's logs; `loaded` once the backend copy has been merged in
#[derive(Debug, Default)]
struct LogBook {
    loaded: bool,
    logs: Vec<MealLog>,
}

impl LogBook {
    /// Backend logs replace local ones of the same date
    fn merge_backend(&mut self, backend: Vec<MealLog>) {
        let local: Vec<MealLog> = self
            .logs
            .drain(..)
            .filter(|log| log.origin == LogOrigin::Local)
            .filter(|log| !backend.iter().any(|b| b.date == log.date))
            .collect();
        self.logs = backend;
        self.logs.extend(local);
        self.loaded = true;
    }
}

type UserLogs = Arc<Mutex<LogBook>>;

#[derive(Clone)]
pub struct MealTracker {
    pool: SqlitePool,
    catalog: CatalogService,
    users: Arc<DashMap<String, UserLogs>>,
}

impl std::fmt::Debug for MealTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealTracker")
            .field("loaded_users", &self.users.len())
            .finish()
    }
}

/// Parameters of a new log entry
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub meal_id: String,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub notes: Option<String>,
}

impl MealTracker {
    pub fn new(pool: SqlitePool, catalog: CatalogService) -> Self {
        Self {
            pool,
            catalog,
            users: Arc::new(DashMap::new()),
        }
    }

    fn slot(&self, user_id: &str) -> UserLogs {
        if let Some(slot) = self.users.get(user_id) {
            return slot.clone();
        }
        self.users
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    /// Locked logs of a user. The backend is read until one read succeeds.
    async fn logs(&self, user_id: &str) -> TrackerResult<OwnedMutexGuard<LogBook>> {
        let mut book = self.slot(user_id).lock_owned().await;
        if !book.loaded {
            let backend = self.fetch_backend(user_id).await?;
            book.merge_backend(backend);
        }
        Ok(book)
    }

    async fn fetch_backend(&self, user_id: &str) -> TrackerResult<Vec<MealLog>> {
        let mut logs = log_repo::find_by_user(&self.pool, user_id).await?;
        logs.retain(|log| !log.entries.is_empty());
        Ok(logs)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign-in: reload backend logs, keeping local-only logs already held
    pub async fn load(&self, user_id: &str) -> TrackerResult<usize> {
        let backend = self.fetch_backend(user_id).await?;
        let mut book = self.slot(user_id).lock_owned().await;
        book.merge_backend(backend);

        let count = book.logs.len();
        tracing::info!(user_id = %user_id, count, "Meal logs loaded");
        Ok(count)
    }

    /// Sign-out: forget the user's logs (local-only entries are lost)
    pub fn unload(&self, user_id: &str) {
        if self.users.remove(user_id).is_some() {
            tracing::debug!(user_id = %user_id, "Meal logs unloaded");
        }
    }

    // =========================================================================
    // Entries
    // =========================================================================

    /// Append an entry to the (user, date) log, creating the log if needed.
    /// Only persisted meals reach the backend.
    pub async fn add_entry(&self, user_id: &str, entry: NewEntry) -> TrackerResult<MealLog> {
        let persisted = match self.catalog.find(&entry.meal_id).await? {
            Some(meal) => meal.source.is_persisted(),
            None => {
                tracing::debug!(meal_id = %entry.meal_id, "Unresolved meal, logging locally");
                false
            }
        };

        let mut book = self.logs(user_id).await?;
        let logs = &mut book.logs;

        let mut new_entry = MealLogEntry {
            entry_id: None,
            meal_id: entry.meal_id,
            meal_type: entry.meal_type,
            time_consumed: now_millis(),
            notes: entry.notes.filter(|n| !n.trim().is_empty()),
        };
        let index = logs.iter().position(|log| log.date == entry.date);

        let mut backend_log_id = None;
        if persisted {
            let (log_id, created) = match index.map(|i| &logs[i]) {
                Some(log) if log.origin == LogOrigin::Backend => {
                    (parse_backend_id(&log.id)?, false)
                }
                _ => {
                    let id = log_repo::create_log(&self.pool, user_id, entry.date).await?;
                    (id, true)
                }
            };
            match log_repo::insert_item(&self.pool, log_id, &new_entry).await {
                Ok(entry_id) => new_entry.entry_id = Some(entry_id),
                Err(e) => {
                    if created
                        && let Err(cleanup) = log_repo::delete_log(&self.pool, log_id).await
                    {
                        tracing::warn!(log_id, error = %cleanup, "Failed to drop empty meal log");
                    }
                    return Err(e.into());
                }
            }
            backend_log_id = Some(log_id);
        }

        let index = match index {
            Some(i) => i,
            None => {
                logs.push(MealLog {
                    id: format!("local-{}", uuid::Uuid::new_v4()),
                    user_id: user_id.to_string(),
                    date: entry.date,
                    origin: LogOrigin::Local,
                    entries: Vec::new(),
                });
                logs.len() - 1
            }
        };
        let log = &mut logs[index];
        if let Some(log_id) = backend_log_id {
            // 本地日志升级为后端日志
            log.id = log_id.to_string();
            log.origin = LogOrigin::Backend;
        }
        log.entries.push(new_entry);

        tracing::debug!(
            user_id = %user_id,
            log_id = %log.id,
            meal_id = %log.entries[log.entries.len() - 1].meal_id,
            persisted,
            "Meal logged"
        );
        Ok(log.clone())
    }

    /// Remove the first entry for `meal_id`; an emptied log is deleted.
    /// Returns the remaining log, `None` once it was deleted.
    pub async fn remove_entry(
        &self,
        user_id: &str,
        log_id: &str,
        meal_id: &str,
    ) -> TrackerResult<Option<MealLog>> {
        let mut book = self.logs(user_id).await?;
        let logs = &mut book.logs;

        let index = logs
            .iter()
            .position(|log| log.id == log_id)
            .ok_or_else(|| TrackerError::LogNotFound(log_id.to_string()))?;
        let position = logs[index]
            .position_of(meal_id)
            .ok_or_else(|| TrackerError::EntryNotFound {
                log_id: log_id.to_string(),
                meal_id: meal_id.to_string(),
            })?;

        // 最后一条: 整个日志删除, 后端成功后才改内存
        if logs[index].entries.len() == 1 {
            if logs[index].origin == LogOrigin::Backend {
                log_repo::delete_log(&self.pool, parse_backend_id(log_id)?).await?;
            }
            logs.remove(index);
            tracing::debug!(user_id = %user_id, log_id = %log_id, "Empty meal log deleted");
            return Ok(None);
        }

        if let Some(entry_id) = logs[index].entries[position].entry_id {
            log_repo::delete_item(&self.pool, entry_id).await?;
        }
        logs[index].entries.remove(position);
        Ok(Some(logs[index].clone()))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn get_by_date(&self, user_id: &str, date: NaiveDate) -> TrackerResult<Option<MealLog>> {
        let book = self.logs(user_id).await?;
        Ok(book.logs.iter().find(|log| log.date == date).cloned())
    }

    /// All logs, newest date first
    pub async fn list(&self, user_id: &str) -> TrackerResult<Vec<MealLog>> {
        let mut logs = self.logs(user_id).await?.logs.clone();
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    /// Nutrition totals for a date; unresolvable meals count as zero
    pub async fn daily_nutrition(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> TrackerResult<DailyNutrition> {
        let entries = self
            .get_by_date(user_id, date)
            .await?
            .map(|log| log.entries)
            .unwrap_or_default();

        let mut totals = Nutrition::default();
        let mut unknown_entries = 0;
        for entry in &entries {
            match self.catalog.find(&entry.meal_id).await {
                Ok(Some(meal)) => totals += meal.nutrition,
                Ok(None) => unknown_entries += 1,
                Err(e) => {
                    tracing::warn!(meal_id = %entry.meal_id, error = %e, "Meal lookup failed");
                    unknown_entries += 1;
                }
            }
        }

        Ok(DailyNutrition {
            date,
            totals,
            entry_count: entries.len(),
            unknown_entries,
        })
    }
}

fn parse_backend_id(id: &str) -> TrackerResult<i64> {
    id.parse()
        .map_err(|_| TrackerError::LogNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::recipe_api::{RecipeApiError, RecipeQuery, RecipeSource};
    use crate::db::DbService;
    use async_trait::async_trait;
    use shared::models::Meal;

    struct NoRecipes;

    #[async_trait]
    impl RecipeSource for NoRecipes {
        async fn search(&self, _query: &RecipeQuery) -> Result<Vec<Meal>, RecipeApiError> {
            Ok(Vec::new())
        }
    }

    async fn tracker() -> (MealTracker, CatalogService) {
        let db = DbService::in_memory().await.unwrap();
        let catalog = CatalogService::new(db.pool.clone(), Arc::new(NoRecipes), 6);
        (MealTracker::new(db.pool, catalog.clone()), catalog)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn entry(meal_id: &str, meal_type: MealType) -> NewEntry {
        NewEntry {
            meal_id: meal_id.into(),
            date: day(),
            meal_type,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_catalog_meals_stay_local() {
        let (tracker, _) = tracker().await;
        tracker.add_entry("u1", entry("m1", MealType::Breakfast)).await.unwrap();
        let log = tracker.add_entry("u1", entry("m2", MealType::Lunch)).await.unwrap();

        assert_eq!(log.origin, LogOrigin::Local);
        assert!(log.id.starts_with("local-"));
        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.entries[1].meal_id, "m2");
        assert!(log.entries.iter().all(|e| e.entry_id.is_none()));
    }

    #[tokio::test]
    async fn test_unresolved_meal_kept_locally() {
        let (tracker, _) = tracker().await;
        tracker.add_entry("u1", entry("716429", MealType::Snack)).await.unwrap();
        let log = tracker.add_entry("u1", entry("716429", MealType::Lunch)).await.unwrap();

        assert_eq!(log.origin, LogOrigin::Local);
        assert_eq!(log.entries.len(), 2);
        assert!(log.entries.iter().all(|e| e.entry_id.is_none()));
        assert!(log_repo::find_by_user(&tracker.pool, "u1").await.unwrap().is_empty());

        let daily = tracker.daily_nutrition("u1", day()).await.unwrap();
        assert_eq!(daily.entry_count, 2);
        assert_eq!(daily.unknown_entries, 2);
    }

    #[tokio::test]
    async fn test_failed_first_load_is_retried() {
        let (tracker, catalog) = tracker().await;
        catalog.persist("m3").await.unwrap();
        let log = tracker.add_entry("u1", entry("m3", MealType::Dinner)).await.unwrap();
        tracker.unload("u1");

        sqlx::query("ALTER TABLE meal_log_items RENAME TO meal_log_items_off")
            .execute(&tracker.pool)
            .await
            .unwrap();
        assert!(tracker.get_by_date("u1", day()).await.is_err());
        sqlx::query("ALTER TABLE meal_log_items_off RENAME TO meal_log_items")
            .execute(&tracker.pool)
            .await
            .unwrap();

        let reloaded = tracker.get_by_date("u1", day()).await.unwrap().unwrap();
        assert_eq!(reloaded.id, log.id);
        let appended = tracker.add_entry("u1", entry("m3", MealType::Snack)).await.unwrap();
        assert_eq!(appended.id, log.id);
        assert_eq!(appended.entries.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_log_delete_keeps_entry() {
        let (tracker, catalog) = tracker().await;
        catalog.persist("m2").await.unwrap();
        let log = tracker.add_entry("u1", entry("m2", MealType::Lunch)).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER keep_logs BEFORE DELETE ON meal_logs
             BEGIN SELECT RAISE(ABORT, 'locked'); END",
        )
        .execute(&tracker.pool)
        .await
        .unwrap();
        assert!(tracker.remove_entry("u1", &log.id, "m2").await.is_err());

        // 内存与后端都保持原样
        let held = tracker.get_by_date("u1", day()).await.unwrap().unwrap();
        assert_eq!(held.entries.len(), 1);
        let rows = log_repo::find_by_user(&tracker.pool, "u1").await.unwrap();
        assert_eq!(rows[0].entries.len(), 1);

        sqlx::query("DROP TRIGGER keep_logs")
            .execute(&tracker.pool)
            .await
            .unwrap();
        assert!(tracker.remove_entry("u1", &log.id, "m2").await.unwrap().is_none());
        assert!(log_repo::find_by_user(&tracker.pool, "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persisted_meal_upgrades_local_log() {
        let (tracker, catalog) = tracker().await;
        catalog.persist("m3").await.unwrap();

        tracker.add_entry("u1", entry("m1", MealType::Breakfast)).await.unwrap();
        let log = tracker.add_entry("u1", entry("m3", MealType::Dinner)).await.unwrap();
        assert_eq!(log.origin, LogOrigin::Backend);
        assert!(log.entries[1].entry_id.is_some());

        // a reload keeps only the backend entry
        tracker.unload("u1");
        let reloaded = tracker.get_by_date("u1", day()).await.unwrap().unwrap();
        assert_eq!(reloaded.id, log.id);
        assert_eq!(reloaded.entries.len(), 1);
        assert_eq!(reloaded.entries[0].meal_id, "m3");
    }

    #[tokio::test]
    async fn test_remove_first_match_then_delete_empty_log() {
        let (tracker, catalog) = tracker().await;
        catalog.persist("m2").await.unwrap();
        tracker.add_entry("u1", entry("m2", MealType::Lunch)).await.unwrap();
        let log = tracker.add_entry("u1", entry("m2", MealType::Dinner)).await.unwrap();

        let remaining = tracker.remove_entry("u1", &log.id, "m2").await.unwrap().unwrap();
        assert_eq!(remaining.entries.len(), 1);
        assert_eq!(remaining.entries[0].meal_type, MealType::Dinner);

        assert!(tracker.remove_entry("u1", &log.id, "m2").await.unwrap().is_none());
        assert!(tracker.get_by_date("u1", day()).await.unwrap().is_none());
        assert!(log_repo::find_by_user(&tracker.pool, "u1").await.unwrap().is_empty());

        assert!(matches!(
            tracker.remove_entry("u1", &log.id, "m2").await,
            Err(TrackerError::LogNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_daily_nutrition_counts_unknown_as_zero() {
        let (tracker, _) = tracker().await;
        tracker.add_entry("u1", entry("m1", MealType::Breakfast)).await.unwrap();
        tracker.add_entry("u1", entry("m6", MealType::Snack)).await.unwrap();

        // an entry whose meal can no longer be resolved
        {
            let mut book = tracker.logs("u1").await.unwrap();
            book.logs[0].entries.push(MealLogEntry {
                entry_id: None,
                meal_id: "vanished".into(),
                meal_type: MealType::Lunch,
                time_consumed: 0,
                notes: None,
            });
        }

        let daily = tracker.daily_nutrition("u1", day()).await.unwrap();
        assert_eq!(daily.entry_count, 3);
        assert_eq!(daily.unknown_entries, 1);
        assert_eq!(daily.totals.calories, 405.0);
        assert_eq!(daily.totals.protein, 19.0);

        let empty = tracker
            .daily_nutrition("u1", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(empty.entry_count, 0);
        assert_eq!(empty.totals, Nutrition::default());
    }
}
