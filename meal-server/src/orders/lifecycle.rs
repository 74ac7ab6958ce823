//! Delivery Lifecycle
//!
//! 配送状态机: `confirmed → preparing → ready → out_for_delivery → delivered`
//!
//! [`DeliverySimulation`] is a plain value. Tests drive it with
//! [`DeliverySimulation::advance`]; the server drives it with
//! [`DeliverySimulation::run`], which sleeps through each stage's dwell time
//! and reports every transition to a [`DeliveryObserver`].

use async_trait::async_trait;
use shared::models::MealType;
use shared::order::{CartItem, DeliveryStep, MAX_QUANTITY, OrderStatus};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Expected minutes after the order date for each stage in [`OrderStatus::STAGES`]
pub const TIMELINE_OFFSETS_MINUTES: [i64; 5] = [0, 5, 15, 17, 30];

/// Observer verdict after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The order is gone; stop without further transitions
    Stop,
}

#[async_trait]
pub trait DeliveryObserver: Send + Sync {
    async fn on_status(&self, order_id: i64, status: OrderStatus) -> Flow;
}

#[derive(Debug, Clone)]
pub struct DeliverySimulation {
    order_id: i64,
    status: OrderStatus,
    /// Dwell in confirmed, preparing, ready, out_for_delivery
    dwell: [Duration; 4],
}

impl DeliverySimulation {
    pub fn new(order_id: i64, dwell: [Duration; 4]) -> Self {
        Self::resume(order_id, OrderStatus::Confirmed, dwell)
    }

    /// Continue from a stage reached earlier
    pub fn resume(order_id: i64, status: OrderStatus, dwell: [Duration; 4]) -> Self {
        Self {
            order_id,
            status,
            dwell,
        }
    }

    pub fn order_id(&self) -> i64 {
        self.order_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Time to spend in the current stage, `None` once terminal
    pub fn next_dwell(&self) -> Option<Duration> {
        let index = match self.status {
            OrderStatus::Confirmed => 0,
            OrderStatus::Preparing => 1,
            OrderStatus::Ready => 2,
            OrderStatus::OutForDelivery => 3,
            OrderStatus::Delivered | OrderStatus::Cancelled => return None,
        };
        Some(self.dwell[index])
    }

    /// Step to the next stage without waiting
    pub fn advance(&mut self) -> Option<OrderStatus> {
        let next = self.status.next()?;
        self.status = next;
        Some(next)
    }

    /// Drive the machine on the tokio clock until delivered, cancelled or
    /// stopped by the observer. Returns the last stage reached.
    pub async fn run(
        mut self,
        observer: &dyn DeliveryObserver,
        cancel: CancellationToken,
    ) -> OrderStatus {
        while let Some(dwell) = self.next_dwell() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(order_id = self.order_id, status = %self.status, "Delivery simulation cancelled");
                    return self.status;
                }
                _ = tokio::time::sleep(dwell) => {}
            }

            let Some(next) = self.advance() else {
                break;
            };
            tracing::debug!(order_id = self.order_id, status = %next, "Delivery stage reached");

            if observer.on_status(self.order_id, next).await == Flow::Stop {
                tracing::debug!(order_id = self.order_id, "Order no longer present, stopping simulation");
                break;
            }
        }
        self.status
    }
}

/// Expected time of every stage, with the stages reached so far marked
pub fn timeline(order_date: i64, status: OrderStatus) -> Vec<DeliveryStep> {
    let current = OrderStatus::STAGES
        .iter()
        .position(|s| *s == status)
        // cancelled: only the confirmation happened
        .unwrap_or(0);

    OrderStatus::STAGES
        .iter()
        .zip(TIMELINE_OFFSETS_MINUTES)
        .enumerate()
        .map(|(index, (stage, minutes))| DeliveryStep {
            status: *stage,
            expected_at: order_date + minutes * 60_000,
            reached: index <= current,
        })
        .collect()
}

/// Tracker entries to create once an order is delivered
///
/// One entry per unit, at most [`MAX_QUANTITY`] per line. Meal types rotate
/// breakfast, lunch, dinner, snack with a single counter running across all
/// items.
pub fn backfill_plan(items: &[CartItem]) -> Vec<(String, MealType)> {
    items
        .iter()
        .flat_map(|item| {
            (0..item.quantity.min(MAX_QUANTITY)).map(move |_| item.meal_id.clone())
        })
        .zip(MealType::ROTATION.iter().copied().cycle())
        .collect()
}
