use super::storage::StorageError;
use crate::utils::{AppError, ErrorCode};
use shared::order::MAX_QUANTITY;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Meal {0} has no usable price")]
    MealWithoutPrice(String),

    #[error("Quantity must be between 1 and {max}, got {0}", max = MAX_QUANTITY)]
    InvalidQuantity(i64),

    #[error("Meal {0} is not in the cart")]
    ItemNotFound(String),

    #[error("Cart storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match &err {
            CartError::MealWithoutPrice(meal_id) => {
                AppError::with_message(ErrorCode::MealWithoutPrice, err.to_string())
                    .with_detail("meal_id", meal_id.as_str())
            }
            CartError::InvalidQuantity(q) => {
                AppError::with_message(ErrorCode::InvalidQuantity, err.to_string())
                    .with_detail("quantity", *q)
            }
            CartError::ItemNotFound(meal_id) => {
                AppError::with_message(ErrorCode::CartItemNotFound, err.to_string())
                    .with_detail("meal_id", meal_id.as_str())
            }
            CartError::Storage(_) => AppError::database(err.to_string()),
        }
    }
}
