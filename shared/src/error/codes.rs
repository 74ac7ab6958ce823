//! Unified error codes for HealMeal
//!
//! Error codes are shared by the meal server and its API clients and are
//! organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Profile errors
//! - 3xxx: Cart errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 7xxx: Meal log errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Profile ====================
    /// Profile does not exist
    ProfileNotFound = 2001,
    /// Profile misses name, age, height or weight
    ProfileIncomplete = 2002,
    /// Numeric profile field is negative or not finite
    ProfileInvalidMetric = 2003,

    // ==================== 3xxx: Cart ====================
    /// Cart has no items
    CartEmpty = 3001,
    /// Meal is not in the cart
    CartItemNotFound = 3002,
    /// Meal has no usable price
    MealWithoutPrice = 3003,
    /// Quantity must be at least one
    InvalidQuantity = 3004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Delivery address is required
    OrderAddressRequired = 4002,
    /// Order could not be persisted
    OrderPersistFailed = 4003,
    /// Delivery simulation is not running for this order
    DeliveryNotTracked = 4004,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Invalid payment method
    PaymentInvalidMethod = 5003,
    /// Required payment details are missing
    PaymentDetailsMissing = 5004,

    // ==================== 6xxx: Catalog ====================
    /// Meal not found
    MealNotFound = 6001,
    /// Recipe API is unavailable
    RecipeApiUnavailable = 6002,

    // ==================== 7xxx: Meal Log ====================
    /// Meal log not found
    MealLogNotFound = 7001,
    /// Meal is not part of the log
    MealLogEntryNotFound = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,

    // Storage
    /// Storage full (disk space insufficient)
    StorageFull = 9401,
    /// Storage corrupted
    StorageCorrupted = 9403,
    /// System busy
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this code represents success
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default English message for this code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Please sign in first",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",

            // Profile
            ErrorCode::ProfileNotFound => "Profile not found",
            ErrorCode::ProfileIncomplete => "Please complete your health profile first",
            ErrorCode::ProfileInvalidMetric => "Profile metrics must be finite and non-negative",

            // Cart
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartItemNotFound => "Cart item not found",
            ErrorCode::MealWithoutPrice => "Meal has no price",
            ErrorCode::InvalidQuantity => "Quantity out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAddressRequired => "Delivery address is required",
            ErrorCode::OrderPersistFailed => "Failed to place order",
            ErrorCode::DeliveryNotTracked => "Delivery is not being tracked",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentDetailsMissing => "Please fill in all card details",

            // Catalog
            ErrorCode::MealNotFound => "Meal not found",
            ErrorCode::RecipeApiUnavailable => "Recipe service is unavailable",

            // Meal log
            ErrorCode::MealLogNotFound => "Meal log not found",
            ErrorCode::MealLogEntryNotFound => "Meal is not in this log",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",

            // Storage
            ErrorCode::StorageFull => "Storage full (disk space insufficient)",
            ErrorCode::StorageCorrupted => "Storage corrupted (data file damaged)",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Profile
            2001 => Ok(ErrorCode::ProfileNotFound),
            2002 => Ok(ErrorCode::ProfileIncomplete),
            2003 => Ok(ErrorCode::ProfileInvalidMetric),

            // Cart
            3001 => Ok(ErrorCode::CartEmpty),
            3002 => Ok(ErrorCode::CartItemNotFound),
            3003 => Ok(ErrorCode::MealWithoutPrice),
            3004 => Ok(ErrorCode::InvalidQuantity),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAddressRequired),
            4003 => Ok(ErrorCode::OrderPersistFailed),
            4004 => Ok(ErrorCode::DeliveryNotTracked),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5003 => Ok(ErrorCode::PaymentInvalidMethod),
            5004 => Ok(ErrorCode::PaymentDetailsMissing),

            // Catalog
            6001 => Ok(ErrorCode::MealNotFound),
            6002 => Ok(ErrorCode::RecipeApiUnavailable),

            // Meal log
            7001 => Ok(ErrorCode::MealLogNotFound),
            7002 => Ok(ErrorCode::MealLogEntryNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            // Storage
            9401 => Ok(ErrorCode::StorageFull),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::ProfileIncomplete.code(), 2002);
        assert_eq!(ErrorCode::CartEmpty.code(), 3001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::PaymentDetailsMissing.code(), 5004);
        assert_eq!(ErrorCode::MealNotFound.code(), 6001);
        assert_eq!(ErrorCode::MealLogNotFound.code(), 7001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::CartEmpty.is_success());
    }

    #[test]
    fn test_try_from_every_known_code() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidFormat,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::NotAuthenticated,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::ProfileNotFound,
            ErrorCode::ProfileIncomplete,
            ErrorCode::ProfileInvalidMetric,
            ErrorCode::CartEmpty,
            ErrorCode::CartItemNotFound,
            ErrorCode::MealWithoutPrice,
            ErrorCode::InvalidQuantity,
            ErrorCode::OrderNotFound,
            ErrorCode::OrderAddressRequired,
            ErrorCode::OrderPersistFailed,
            ErrorCode::DeliveryNotTracked,
            ErrorCode::PaymentFailed,
            ErrorCode::PaymentInvalidMethod,
            ErrorCode::PaymentDetailsMissing,
            ErrorCode::MealNotFound,
            ErrorCode::RecipeApiUnavailable,
            ErrorCode::MealLogNotFound,
            ErrorCode::MealLogEntryNotFound,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::NetworkError,
            ErrorCode::TimeoutError,
            ErrorCode::ConfigError,
            ErrorCode::StorageFull,
            ErrorCode::StorageCorrupted,
            ErrorCode::SystemBusy,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(ErrorCode::try_from(3999), Err(InvalidErrorCode(3999)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::MealWithoutPrice).unwrap();
        assert_eq!(json, "3003");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("4002").unwrap();
        assert_eq!(code, ErrorCode::OrderAddressRequired);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("12345");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::CartEmpty.to_string(), "E3001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::CartEmpty.message(), "Cart is empty");
        assert_eq!(
            ErrorCode::OrderAddressRequired.message(),
            "Delivery address is required"
        );
    }

    #[test]
    fn test_invalid_error_code_display() {
        assert_eq!(InvalidErrorCode(42).to_string(), "invalid error code: 42");
    }
}
