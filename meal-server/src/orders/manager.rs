//! Order Lifecycle Manager
//!
//! # 职责
//!
//! - checkout: 购物车快照 → 订单 (先写订单行, 再写明细行, 最后清空购物车)
//! - 每用户订单历史 (内存, 首次访问时从后端加载, 最新在前)
//! - 每个订单一个配送模拟任务, 状态变化广播给订阅者
//! - 送达后回填营养日志
//!
//! ```text
//! checkout ──▶ orders / order_items ──▶ history.prepend ──▶ cart.clear
//!                                                 │
//!                                   DeliverySimulation (BackgroundTasks)
//!                                                 │ on_status
//!                      history ◀──┬── orders.status (best effort)
//!                                 ├── broadcast OrderStatusEvent
//!                                 └── delivered: MealTracker back-fill
//! ```

use super::error::{OrderError, OrderResult};
use super::lifecycle::{self, DeliveryObserver, DeliverySimulation, Flow};
use super::money::order_total;
use crate::cart::CartManager;
use crate::catalog::CatalogService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::repository::order::{self as order_repo, NewOrder};
use crate::tracker::{MealTracker, NewEntry};
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::order::{
    CartItem, DeliveryStep, Order, OrderStatus, OrderStatusEvent, PaymentMethod, RestaurantInfo,
};
use shared::util::{now_millis, today};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Delivery settings taken from [`crate::core::Config`]
#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub delivery_fee: Decimal,
    pub estimate_minutes: i64,
    pub dwell: [Duration; 4],
}

/// Tracking view of one order
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryTracking {
    pub order_id: i64,
    pub status: OrderStatus,
    pub estimated_delivery: i64,
    /// A simulation is currently advancing this order
    pub live: bool,
    pub steps: Vec<DeliveryStep>,
}

struct LiveDelivery {
    run_id: Uuid,
    user_id: String,
    cancel: CancellationToken,
}

#[derive(Clone)]
pub struct OrderManager {
    pool: SqlitePool,
    cart: CartManager,
    catalog: CatalogService,
    tracker: MealTracker,
    tasks: BackgroundTasks,
    settings: Arc<OrderSettings>,
    /// user_id -> orders, most recent first
    history: Arc<DashMap<String, Vec<Order>>>,
    /// order_id -> running simulation
    live: Arc<DashMap<i64, LiveDelivery>>,
    events: broadcast::Sender<OrderStatusEvent>,
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("users", &self.history.len())
            .field("live_deliveries", &self.live.len())
            .finish()
    }
}

impl OrderManager {
    pub fn new(
        pool: SqlitePool,
        cart: CartManager,
        catalog: CatalogService,
        tracker: MealTracker,
        tasks: BackgroundTasks,
        settings: OrderSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            pool,
            cart,
            catalog,
            tracker,
            tasks,
            settings: Arc::new(settings),
            history: Arc::new(DashMap::new()),
            live: Arc::new(DashMap::new()),
            events,
        }
    }

    /// Status changes of every order
    pub fn subscribe(&self) -> broadcast::Receiver<OrderStatusEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Checkout
    // ========================================================================

    /// Turn the user's cart into an order
    ///
    /// Nothing is cleared unless both the order row and its items were
    /// written.
    pub async fn checkout(
        &self,
        user_id: &str,
        delivery_address: &str,
        method: PaymentMethod,
    ) -> OrderResult<Order> {
        let delivery_address = delivery_address.trim();
        if delivery_address.is_empty() {
            return Err(OrderError::AddressRequired);
        }
        if user_id.trim().is_empty() {
            return Err(OrderError::NotAuthenticated);
        }
        let cart = self.cart.get(user_id);
        if cart.is_empty() {
            return Err(OrderError::CartEmpty);
        }

        // 历史需先加载, 新订单才能插在最前
        self.orders(user_id).await?;

        let restaurant = self.restaurant_for(&cart.items).await;
        let order_date = now_millis();
        let total_price = order_total(cart.total_price, self.settings.delivery_fee);
        let payment_method = method.label();

        let order_id = order_repo::insert_order(
            &self.pool,
            &NewOrder {
                user_id,
                total_price,
                order_date,
                delivery_address,
                payment_method,
                restaurant: restaurant.as_ref(),
            },
        )
        .await
        .map_err(OrderError::Persist)?;
        if let Err(e) = order_repo::insert_items(&self.pool, order_id, &cart.items).await {
            if let Err(cleanup) = order_repo::delete_order(&self.pool, order_id).await {
                tracing::warn!(order_id, error = %cleanup, "Failed to remove incomplete order");
            }
            return Err(OrderError::Persist(e));
        }

        let order = Order {
            id: order_id,
            user_id: user_id.to_string(),
            items: cart.items,
            total_price,
            order_date,
            status: OrderStatus::Confirmed,
            delivery_address: delivery_address.to_string(),
            payment_method: payment_method.to_string(),
            estimated_delivery: order_date + self.settings.estimate_minutes * 60_000,
            restaurant,
        };

        self.history
            .entry(user_id.to_string())
            .or_default()
            .insert(0, order.clone());

        if let Err(e) = self.cart.clear(user_id) {
            // 订单已落库, 不回滚
            tracing::error!(user_id = %user_id, order_id, error = %e, "Failed to clear cart after checkout");
        }

        crate::audit_log!(
            user_id,
            "order_placed",
            format!("order:{order_id}"),
            format!("{} items, total {}", order.items.len(), total_price)
        );
        tracing::info!(order_id, user_id = %user_id, total = %total_price, "📦 Order placed");

        self.publish(&order.user_id, order_id, OrderStatus::Confirmed, None);
        self.start_delivery(&order);
        Ok(order)
    }

    /// Display info of the restaurant serving the first item
    async fn restaurant_for(&self, items: &[CartItem]) -> Option<RestaurantInfo> {
        let first = items.first()?;
        let meal = match self.catalog.find(&first.meal_id).await {
            Ok(meal) => meal,
            Err(e) => {
                tracing::warn!(meal_id = %first.meal_id, error = %e, "Restaurant lookup failed");
                None
            }
        };
        meal.and_then(|m| m.restaurant).map(|r| RestaurantInfo {
            name: r.name,
            address: r.address,
        })
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Order history, most recent first
    pub async fn orders(&self, user_id: &str) -> OrderResult<Vec<Order>> {
        if let Some(orders) = self.history.get(user_id) {
            return Ok(orders.clone());
        }
        let orders =
            order_repo::find_by_user(&self.pool, user_id, self.settings.estimate_minutes).await?;
        tracing::debug!(user_id = %user_id, count = orders.len(), "Order history loaded");
        // 并发加载时保留先到的一份
        let entry = self
            .history
            .entry(user_id.to_string())
            .or_insert(orders)
            .clone();
        Ok(entry)
    }

    pub async fn get(&self, user_id: &str, order_id: i64) -> OrderResult<Order> {
        self.orders(user_id)
            .await?
            .into_iter()
            .find(|o| o.id == order_id)
            .ok_or(OrderError::NotFound(order_id))
    }

    pub async fn tracking(&self, user_id: &str, order_id: i64) -> OrderResult<DeliveryTracking> {
        let order = self.get(user_id, order_id).await?;
        Ok(DeliveryTracking {
            order_id,
            status: order.status,
            estimated_delivery: order.estimated_delivery,
            live: self.live.contains_key(&order_id),
            steps: lifecycle::timeline(order.order_date, order.status),
        })
    }

    /// Stop all simulations of a user and drop the cached history (sign-out)
    pub fn unload(&self, user_id: &str) {
        let ids: Vec<i64> = self
            .live
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| *e.key())
            .collect();
        for id in ids {
            if let Some((_, live)) = self.live.remove(&id) {
                live.cancel.cancel();
            }
        }
        self.history.remove(user_id);
    }

    // ========================================================================
    // Delivery simulation
    // ========================================================================

    /// Pause or resume live updates for an order
    pub async fn set_live(
        &self,
        user_id: &str,
        order_id: i64,
        enabled: bool,
    ) -> OrderResult<DeliveryTracking> {
        let order = self.get(user_id, order_id).await?;
        if enabled {
            if !order.status.is_terminal() && !self.live.contains_key(&order_id) {
                self.start_delivery(&order);
            }
        } else {
            match self.live.remove(&order_id) {
                Some((_, live)) => live.cancel.cancel(),
                None => return Err(OrderError::NotTracked(order_id)),
            }
            tracing::info!(order_id, "Live delivery updates paused");
        }
        self.tracking(user_id, order_id).await
    }

    fn start_delivery(&self, order: &Order) {
        let cancel = self.tasks.child_token();
        let run_id = Uuid::new_v4();
        self.live.insert(
            order.id,
            LiveDelivery {
                run_id,
                user_id: order.user_id.clone(),
                cancel: cancel.clone(),
            },
        );

        let simulation = DeliverySimulation::resume(order.id, order.status, self.settings.dwell);
        let watch = OrderWatch {
            manager: self.clone(),
            user_id: order.user_id.clone(),
        };
        let order_id = order.id;
        self.tasks
            .spawn(format!("delivery:{order_id}"), TaskKind::Delivery, async move {
                let last = simulation.run(&watch, cancel).await;
                // 只移除自己的登记 (set_live 可能已换成新的)
                watch
                    .manager
                    .live
                    .remove_if(&order_id, |_, live| live.run_id == run_id);
                tracing::debug!(order_id, status = %last, "Delivery simulation finished");
            });
    }

    fn publish(&self, user_id: &str, order_id: i64, status: OrderStatus, message: Option<String>) {
        let event = OrderStatusEvent {
            order_id,
            user_id: user_id.to_string(),
            status,
            message: message.unwrap_or_else(|| status.notice().to_string()),
            timestamp: now_millis(),
        };
        // 没有订阅者时 send 返回 Err, 可忽略
        let _ = self.events.send(event);
    }

    /// Apply a transition; `false` when the order is no longer in memory
    async fn apply_status(&self, user_id: &str, order_id: i64, status: OrderStatus) -> bool {
        let items = {
            let Some(mut orders) = self.history.get_mut(user_id) else {
                return false;
            };
            let Some(order) = orders.iter_mut().find(|o| o.id == order_id) else {
                return false;
            };
            order.status = status;
            order.items.clone()
        };

        if let Err(e) = order_repo::update_status(&self.pool, order_id, status).await {
            tracing::warn!(order_id, status = %status, error = %e, "Failed to persist order status");
        }
        tracing::info!(order_id, status = %status, "Order status changed");
        self.publish(user_id, order_id, status, None);

        if status == OrderStatus::Delivered {
            self.backfill(user_id, order_id, &items).await;
        }
        true
    }

    /// Log every delivered unit in the nutrition tracker
    async fn backfill(&self, user_id: &str, order_id: i64, items: &[CartItem]) {
        let date = today();
        let mut failed = 0usize;
        let plan = lifecycle::backfill_plan(items);
        for (meal_id, meal_type) in &plan {
            let entry = NewEntry {
                meal_id: meal_id.clone(),
                date,
                meal_type: *meal_type,
                notes: None,
            };
            if let Err(e) = self.tracker.add_entry(user_id, entry).await {
                tracing::error!(order_id, meal_id = %meal_id, error = %e, "Failed to log delivered meal");
                failed += 1;
            }
        }

        if failed > 0 {
            self.publish(
                user_id,
                order_id,
                OrderStatus::Delivered,
                Some(format!(
                    "Your order has been delivered, but {failed} of {} meal(s) could not be added to your log",
                    plan.len()
                )),
            );
        } else {
            tracing::info!(order_id, entries = plan.len(), "Delivered meals added to log");
        }
    }
}

/// Observer bound to one order's owner
struct OrderWatch {
    manager: OrderManager,
    user_id: String,
}

#[async_trait]
impl DeliveryObserver for OrderWatch {
    async fn on_status(&self, order_id: i64, status: OrderStatus) -> Flow {
        if self
            .manager
            .apply_status(&self.user_id, order_id, status)
            .await
        {
            Flow::Continue
        } else {
            Flow::Stop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartStore;
    use crate::catalog::{RecipeApiClient, RecipeSource};
    use crate::db::DbService;
    use shared::models::{Meal, MealSource, MealType};

    const FAST: [Duration; 4] = [Duration::from_millis(10); 4];

    struct Fixture {
        orders: OrderManager,
        cart: CartManager,
        tracker: MealTracker,
        catalog: CatalogService,
        tasks: BackgroundTasks,
        pool: SqlitePool,
    }

    async fn fixture(dwell: [Duration; 4]) -> Fixture {
        let pool = DbService::in_memory().await.unwrap().pool;
        let recipes: Arc<dyn RecipeSource> = Arc::new(
            RecipeApiClient::new("http://127.0.0.1:9", None, Duration::from_secs(1), vec![])
                .unwrap(),
        );
        let catalog = CatalogService::new(pool.clone(), recipes, 6);
        let cart = CartManager::new(CartStore::open_in_memory().unwrap());
        let tracker = MealTracker::new(pool.clone(), catalog.clone());
        let tasks = BackgroundTasks::new();
        let orders = OrderManager::new(
            pool.clone(),
            cart.clone(),
            catalog.clone(),
            tracker.clone(),
            tasks.clone(),
            OrderSettings {
                delivery_fee: Decimal::new(599, 2),
                estimate_minutes: 30,
                dwell,
            },
        );
        Fixture {
            orders,
            cart,
            tracker,
            catalog,
            tasks,
            pool,
        }
    }

    fn meal(f: &Fixture, id: &str) -> Meal {
        f.catalog
            .static_catalog()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .unwrap()
    }

    async fn wait_idle(tasks: &BackgroundTasks) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while tasks.running() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_checkout_validation_leaves_cart() {
        let f = fixture(FAST).await;
        let err = f
            .orders
            .checkout("u1", "1 Main St", PaymentMethod::CreditCard)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::CartEmpty));

        f.cart.add_item("u1", &meal(&f, "m1"), 1).unwrap();
        let err = f
            .orders
            .checkout("u1", "   ", PaymentMethod::CreditCard)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::AddressRequired));
        let err = f
            .orders
            .checkout("", "1 Main St", PaymentMethod::CreditCard)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotAuthenticated));
        assert_eq!(f.cart.get("u1").items.len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_snapshots_cart_and_clears_it() {
        let f = fixture([Duration::from_secs(60); 4]).await;
        f.cart.add_item("u1", &meal(&f, "m1"), 2).unwrap();
        f.cart.add_item("u1", &meal(&f, "m2"), 1).unwrap();

        let order = f
            .orders
            .checkout("u1", " 1 Main St ", PaymentMethod::CreditCard)
            .await
            .unwrap();
        assert_eq!(order.total_price, Decimal::new(3696, 2));
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.delivery_address, "1 Main St");
        assert_eq!(order.payment_method, "Credit Card");
        assert_eq!(order.estimated_delivery, order.order_date + 30 * 60_000);
        assert_eq!(order.restaurant.as_ref().unwrap().name, "Healing Kitchen");
        assert!(f.cart.get("u1").is_empty());

        f.cart.add_item("u1", &meal(&f, "m6"), 1).unwrap();
        let second = f
            .orders
            .checkout("u1", "1 Main St", PaymentMethod::DigitalWallet)
            .await
            .unwrap();

        let history = f.orders.orders("u1").await.unwrap();
        assert_eq!(
            history.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![second.id, order.id]
        );

        // 后端中也是最新在前
        f.orders.unload("u1");
        let reloaded = f.orders.orders("u1").await.unwrap();
        assert_eq!(reloaded[0].id, second.id);
        assert_eq!(reloaded[1].items, order.items);
        f.tasks.shutdown().await;
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_cart() {
        let f = fixture(FAST).await;
        f.cart.add_item("u1", &meal(&f, "m1"), 1).unwrap();
        f.orders.orders("u1").await.unwrap();
        sqlx::query("DROP TABLE order_items")
            .execute(&f.pool)
            .await
            .unwrap();

        let err = f
            .orders
            .checkout("u1", "1 Main St", PaymentMethod::CreditCard)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Persist(_)));
        assert_eq!(f.cart.get("u1").items.len(), 1);
        assert!(f.orders.orders("u1").await.unwrap().is_empty());
        assert_eq!(f.tasks.running(), 0);
    }

    #[tokio::test]
    async fn test_delivery_runs_and_backfills_tracker() {
        let f = fixture(FAST).await;
        let mut events = f.orders.subscribe();
        f.cart.add_item("u1", &meal(&f, "m1"), 2).unwrap();
        f.cart.add_item("u1", &meal(&f, "m6"), 3).unwrap();

        let order = f
            .orders
            .checkout("u1", "1 Main St", PaymentMethod::CreditCard)
            .await
            .unwrap();

        let mut seen = vec![];
        while let Ok(Ok(event)) =
            tokio::time::timeout(Duration::from_secs(5), events.recv()).await
        {
            assert_eq!(event.order_id, order.id);
            seen.push(event.status);
            if event.status == OrderStatus::Delivered {
                break;
            }
        }
        assert_eq!(seen, OrderStatus::STAGES);

        wait_idle(&f.tasks).await;
        let tracking = f.orders.tracking("u1", order.id).await.unwrap();
        assert_eq!(tracking.status, OrderStatus::Delivered);
        assert!(tracking.steps.iter().all(|s| s.reached));
        assert!(!tracking.live);

        let log = f.tracker.get_by_date("u1", today()).await.unwrap().unwrap();
        let entries: Vec<(String, MealType)> = log
            .entries
            .iter()
            .map(|e| (e.meal_id.clone(), e.meal_type))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("m1".to_string(), MealType::Breakfast),
                ("m1".to_string(), MealType::Lunch),
                ("m6".to_string(), MealType::Dinner),
                ("m6".to_string(), MealType::Snack),
                ("m6".to_string(), MealType::Breakfast),
            ]
        );

        // 状态已写回后端
        f.orders.unload("u1");
        let reloaded = f.orders.get("u1", order.id).await.unwrap();
        assert_eq!(reloaded.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_unregistered_recipe_meal_is_backfilled() {
        let f = fixture(FAST).await;
        let mut recipe = meal(&f, "m1");
        recipe.id = "716429".into();
        recipe.source = MealSource::External;
        f.cart.add_item("u1", &recipe, 2).unwrap();

        f.orders
            .checkout("u1", "1 Main St", PaymentMethod::DigitalWallet)
            .await
            .unwrap();
        wait_idle(&f.tasks).await;

        let log = f.tracker.get_by_date("u1", today()).await.unwrap().unwrap();
        let logged: Vec<_> = log
            .entries
            .iter()
            .map(|e| (e.meal_id.as_str(), e.meal_type))
            .collect();
        assert_eq!(
            logged,
            vec![("716429", MealType::Breakfast), ("716429", MealType::Lunch)]
        );
    }

    #[tokio::test]
    async fn test_set_live_pause_and_resume() {
        let dwell = [
            Duration::from_millis(10),
            Duration::from_secs(60),
            Duration::from_millis(10),
            Duration::from_millis(10),
        ];
        let f = fixture(dwell).await;
        let mut events = f.orders.subscribe();
        f.cart.add_item("u1", &meal(&f, "m2"), 1).unwrap();
        let order = f
            .orders
            .checkout("u1", "1 Main St", PaymentMethod::CreditCard)
            .await
            .unwrap();

        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
                .await
                .unwrap()
                .unwrap();
            if event.status == OrderStatus::Preparing {
                break;
            }
        }

        let paused = f.orders.set_live("u1", order.id, false).await.unwrap();
        assert_eq!(paused.status, OrderStatus::Preparing);
        assert!(!paused.live);
        wait_idle(&f.tasks).await;
        assert!(matches!(
            f.orders.set_live("u1", order.id, false).await,
            Err(OrderError::NotTracked(_))
        ));

        let resumed = f.orders.set_live("u1", order.id, true).await.unwrap();
        assert!(resumed.live);
        assert_eq!(f.tasks.running(), 1);
        f.tasks.shutdown().await;
    }

    #[tokio::test]
    async fn test_unload_stops_simulation() {
        let f = fixture([Duration::from_millis(50); 4]).await;
        f.cart.add_item("u1", &meal(&f, "m2"), 1).unwrap();
        let order = f
            .orders
            .checkout("u1", "1 Main St", PaymentMethod::CreditCard)
            .await
            .unwrap();

        f.orders.unload("u1");
        wait_idle(&f.tasks).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        let reloaded = f.orders.get("u1", order.id).await.unwrap();
        assert_eq!(reloaded.status, OrderStatus::Confirmed);
    }
}
