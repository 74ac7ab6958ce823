//! Payment Simulator
//!
//! No gateway: validates the submitted details, waits the configured delay
//! and issues a receipt.

use crate::utils::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::order::{Order, PaymentMethod};
use shared::util::now_millis;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CardDetails {
    pub card_number: String,
    pub expiry: String,
    pub cvc: String,
    pub name_on_card: String,
}

impl CardDetails {
    fn missing_field(&self) -> Option<&'static str> {
        [
            ("card_number", &self.card_number),
            ("expiry", &self.expiry),
            ("cvc", &self.cvc),
            ("name_on_card", &self.name_on_card),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub method: String,
    #[serde(default)]
    pub card: Option<CardDetails>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentReceipt {
    pub order_id: i64,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub method_label: &'static str,
    /// Unix millis
    pub paid_at: i64,
}

#[derive(Debug, Clone)]
pub struct PaymentSimulator {
    delay: Duration,
}

impl PaymentSimulator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Validate without processing
    pub fn validate(&self, request: &PaymentRequest) -> AppResult<PaymentMethod> {
        let method: PaymentMethod = request.method.parse().map_err(|e: String| {
            AppError::with_message(ErrorCode::PaymentInvalidMethod, e)
                .with_detail("method", request.method.as_str())
        })?;

        if method == PaymentMethod::CreditCard {
            let missing = match &request.card {
                None => Some("card_number"),
                Some(card) => card.missing_field(),
            };
            if let Some(field) = missing {
                return Err(AppError::with_message(
                    ErrorCode::PaymentDetailsMissing,
                    format!("{field} is required for card payments"),
                )
                .with_detail("field", field));
            }
        }
        Ok(method)
    }

    pub async fn pay(&self, order: &Order, request: &PaymentRequest) -> AppResult<PaymentReceipt> {
        let method = self.validate(request)?;

        tracing::info!(order_id = order.id, method = method.label(), "Processing payment");
        tokio::time::sleep(self.delay).await;

        let receipt = PaymentReceipt {
            order_id: order.id,
            amount: order.total_price,
            method,
            method_label: method.label(),
            paid_at: now_millis(),
        };
        crate::audit_log!(
            order.user_id,
            "payment_completed",
            format!("order:{}", order.id),
            format!("{} {}", method.label(), receipt.amount)
        );
        Ok(receipt)
    }
}
