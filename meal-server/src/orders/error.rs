use crate::db::repository::RepoError;
use crate::utils::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Delivery address is required")]
    AddressRequired,

    #[error("Please sign in to place an order")]
    NotAuthenticated,

    #[error("Cart is empty")]
    CartEmpty,

    #[error("Failed to persist order: {0}")]
    Persist(#[source] RepoError),

    #[error("Order {0} not found")]
    NotFound(i64),

    #[error("Delivery of order {0} is not being tracked")]
    NotTracked(i64),

    #[error("Order backend failed: {0}")]
    Backend(#[from] RepoError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::AddressRequired => AppError::new(ErrorCode::OrderAddressRequired),
            OrderError::NotAuthenticated => AppError::new(ErrorCode::NotAuthenticated),
            OrderError::CartEmpty => AppError::new(ErrorCode::CartEmpty),
            OrderError::Persist(ref e) => {
                tracing::error!(error = %e, "Order persistence failed");
                AppError::new(ErrorCode::OrderPersistFailed)
            }
            OrderError::NotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, err.to_string())
                    .with_detail("order_id", id)
            }
            OrderError::NotTracked(id) => {
                AppError::with_message(ErrorCode::DeliveryNotTracked, err.to_string())
                    .with_detail("order_id", id)
            }
            OrderError::Backend(e) => e.into(),
        }
    }
}
