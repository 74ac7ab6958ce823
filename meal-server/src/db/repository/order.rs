//! Order Repository
//!
//! Order rows are written first, item rows second. Status is the only
//! column updated afterwards.

use super::{RepoError, RepoResult};
use crate::orders::money::{to_decimal, to_f64};
use shared::models::MealSource;
use shared::order::{CartItem, Order, OrderStatus, RestaurantInfo};
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Fields of an order before persistence assigns its id
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub user_id: &'a str,
    pub total_price: rust_decimal::Decimal,
    pub order_date: i64,
    pub delivery_address: &'a str,
    pub payment_method: &'a str,
    pub restaurant: Option<&'a RestaurantInfo>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: String,
    total_price: f64,
    order_date: i64,
    status: String,
    delivery_address: String,
    payment_method: String,
    restaurant_name: Option<String>,
    restaurant_address: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    order_id: i64,
    meal_id: String,
    meal_source: String,
    quantity: i64,
    price: f64,
    restaurant_id: Option<String>,
}

impl ItemRow {
    fn into_item(self) -> CartItem {
        CartItem {
            meal_id: self.meal_id,
            quantity: u32::try_from(self.quantity).unwrap_or(1),
            price: to_decimal(self.price),
            restaurant_id: self.restaurant_id,
            source: self.meal_source.parse().unwrap_or(MealSource::Catalog),
        }
    }
}

/// Insert the order row, returning the assigned id
pub async fn insert_order(pool: &SqlitePool, order: &NewOrder<'_>) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (user_id, total_price, order_date, status, delivery_address,
            payment_method, restaurant_name, restaurant_address)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(order.user_id)
    .bind(to_f64(order.total_price))
    .bind(order.order_date)
    .bind(OrderStatus::Confirmed.as_str())
    .bind(order.delivery_address)
    .bind(order.payment_method)
    .bind(order.restaurant.map(|r| r.name.as_str()))
    .bind(order.restaurant.map(|r| r.address.as_str()))
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn insert_items(pool: &SqlitePool, order_id: i64, items: &[CartItem]) -> RepoResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_items (order_id, position, meal_id, meal_source, quantity, price,
                restaurant_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(position as i64)
        .bind(&item.meal_id)
        .bind(item.source.as_str())
        .bind(i64::from(item.quantity))
        .bind(to_f64(item.price))
        .bind(&item.restaurant_id)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Orders of a user with their items, most recent first
///
/// `estimated_delivery` is derived: order date + `estimate_minutes`.
pub async fn find_by_user(
    pool: &SqlitePool,
    user_id: &str,
    estimate_minutes: i64,
) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, user_id, total_price, order_date, status, delivery_address, payment_method,
            restaurant_name, restaurant_address
         FROM orders WHERE user_id = ? ORDER BY order_date DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let items = sqlx::query_as::<_, ItemRow>(
        "SELECT i.order_id, i.meal_id, i.meal_source, i.quantity, i.price, i.restaurant_id
         FROM order_items i JOIN orders o ON o.id = i.order_id
         WHERE o.user_id = ? ORDER BY i.order_id, i.position",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<i64, Vec<CartItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item.into_item());
    }

    rows.into_iter()
        .map(|row| -> RepoResult<Order> {
            let status = row.status.parse().map_err(RepoError::Database)?;
            let restaurant = match (row.restaurant_name, row.restaurant_address) {
                (Some(name), Some(address)) => Some(RestaurantInfo { name, address }),
                _ => None,
            };
            Ok(Order {
                items: by_order.remove(&row.id).unwrap_or_default(),
                id: row.id,
                user_id: row.user_id,
                total_price: to_decimal(row.total_price),
                order_date: row.order_date,
                status,
                delivery_address: row.delivery_address,
                payment_method: row.payment_method,
                estimated_delivery: row.order_date + estimate_minutes * 60_000,
                restaurant,
            })
        })
        .collect()
}

pub async fn update_status(pool: &SqlitePool, order_id: i64, status: OrderStatus) -> RepoResult<()> {
    let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(order_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {order_id} not found")));
    }
    Ok(())
}

/// Remove an order whose items could not be written
pub async fn delete_order(pool: &SqlitePool, order_id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(order_id)
        .execute(pool)
        .await?;
    Ok(())
}
