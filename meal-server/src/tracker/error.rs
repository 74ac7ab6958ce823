use crate::db::repository::RepoError;
use crate::utils::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Meal log {0} not found")]
    LogNotFound(String),

    #[error("Meal {meal_id} not found in log {log_id}")]
    EntryNotFound { log_id: String, meal_id: String },

    #[error("Meal log backend failed: {0}")]
    Backend(#[from] RepoError),

    #[error(transparent)]
    Lookup(#[from] AppError),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::LogNotFound(ref log_id) => {
                AppError::with_message(ErrorCode::MealLogNotFound, err.to_string())
                    .with_detail("log_id", log_id.as_str())
            }
            TrackerError::EntryNotFound {
                ref log_id,
                ref meal_id,
            } => AppError::with_message(ErrorCode::MealLogEntryNotFound, err.to_string())
                .with_detail("log_id", log_id.as_str())
                .with_detail("meal_id", meal_id.as_str()),
            TrackerError::Backend(e) => e.into(),
            TrackerError::Lookup(e) => e,
        }
    }
}
