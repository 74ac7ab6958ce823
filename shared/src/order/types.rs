//! Order types and the delivery state machine

use super::cart::CartItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Order Status
// ============================================================================

/// 订单状态
///
/// Linear: `confirmed → preparing → ready → out_for_delivery → delivered`.
/// `cancelled` is terminal and never entered by the delivery simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Stages in delivery order
    pub const STAGES: [OrderStatus; 5] = [
        Self::Confirmed,
        Self::Preparing,
        Self::Ready,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Next stage, `None` for terminal states
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Confirmed => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human readable text for status notifications
    pub fn notice(&self) -> &'static str {
        match self {
            Self::Confirmed => "Order confirmed",
            Self::Preparing => "Your order is being prepared",
            Self::Ready => "Your order is ready for pickup by the courier",
            Self::OutForDelivery => "Your order is out for delivery",
            Self::Delivered => "Your order has been delivered",
            Self::Cancelled => "Your order was cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Payment
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DigitalWallet,
}

impl PaymentMethod {
    /// Label stored on the order row
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::DigitalWallet => "Digital Wallet",
        }
    }
}

/// Accepts the wire name, the kebab-case id and the display label
impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit_card" | "credit-card" | "credit card" => Ok(Self::CreditCard),
            "digital_wallet" | "digital-wallet" | "digital wallet" => Ok(Self::DigitalWallet),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

// ============================================================================
// Order
// ============================================================================

/// Restaurant display info copied onto the order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestaurantInfo {
    pub name: String,
    pub address: String,
}

/// Order (items and total are immutable after creation)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub user_id: String,
    pub items: Vec<CartItem>,
    /// Cart total plus delivery fee
    pub total_price: Decimal,
    /// Unix millis
    pub order_date: i64,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub payment_method: String,
    /// Unix millis
    pub estimated_delivery: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant: Option<RestaurantInfo>,
}

/// One stage of the delivery timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryStep {
    pub status: OrderStatus,
    /// Expected time of reaching this stage (Unix millis)
    pub expected_at: i64,
    pub reached: bool,
}

/// Pushed to subscribers whenever an order changes stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderStatusEvent {
    pub order_id: i64,
    pub user_id: String,
    pub status: OrderStatus,
    pub message: String,
    /// Unix millis
    pub timestamp: i64,
}
