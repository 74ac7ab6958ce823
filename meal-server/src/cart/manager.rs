//! Cart Manager
//!
//! One cart per user. Each mutation is applied to a copy, written to the
//! [`CartStore`], and only then published in memory, so a failed write leaves
//! both the store and the in-memory cart unchanged.

use super::error::CartError;
use super::storage::CartStore;
use dashmap::DashMap;
use shared::models::Meal;
use shared::order::{Cart, CartItem, MAX_QUANTITY};
use std::sync::Arc;

pub type CartResult<T> = Result<T, CartError>;

#[derive(Clone)]
pub struct CartManager {
    store: CartStore,
    carts: Arc<DashMap<String, Cart>>,
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("cart_count", &self.carts.len())
            .finish()
    }
}

impl CartManager {
    pub fn new(store: CartStore) -> Self {
        Self {
            store,
            carts: Arc::new(DashMap::new()),
        }
    }

    /// Load every stored snapshot (startup)
    pub fn restore(&self) -> CartResult<usize> {
        let carts = self.store.load_all()?;
        let count = carts.len();
        for (user_id, mut cart) in carts {
            cart.items.retain(|i| i.quantity > 0);
            for item in &mut cart.items {
                item.quantity = item.quantity.min(MAX_QUANTITY);
            }
            cart.recompute_total();
            self.carts.insert(user_id, cart);
        }
        tracing::info!(count, "🛒 Carts restored from local storage");
        Ok(count)
    }

    /// Current cart of a user (empty if none)
    pub fn get(&self, user_id: &str) -> Cart {
        if let Some(cart) = self.carts.get(user_id) {
            return cart.clone();
        }
        match self.store.load(user_id) {
            Ok(Some(cart)) => {
                self.carts.insert(user_id.to_string(), cart.clone());
                cart
            }
            Ok(None) => Cart::default(),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to read cart snapshot, starting empty");
                Cart::default()
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of a meal at its current price
    pub fn add_item(&self, user_id: &str, meal: &Meal, quantity: i64) -> CartResult<Cart> {
        if !meal.has_usable_price() {
            return Err(CartError::MealWithoutPrice(meal.id.clone()));
        }
        let quantity = to_quantity(quantity)?;

        let item = CartItem {
            meal_id: meal.id.clone(),
            quantity,
            price: meal.price,
            restaurant_id: meal.restaurant_id().map(str::to_string),
            source: meal.source,
        };
        let cart = self.mutate(user_id, |cart| {
            let held = cart.get(&item.meal_id).map_or(0, |i| i.quantity);
            if cart.add(item) {
                Ok(())
            } else {
                Err(CartError::InvalidQuantity(i64::from(held) + i64::from(quantity)))
            }
        })?;

        tracing::debug!(user_id = %user_id, meal_id = %meal.id, quantity, "Added to cart");
        Ok(cart)
    }

    /// Remove a line; removing a missing meal is a no-op
    pub fn remove_item(&self, user_id: &str, meal_id: &str) -> CartResult<Cart> {
        self.mutate(user_id, |cart| {
            cart.remove(meal_id);
            Ok(())
        })
    }

    /// Overwrite a quantity; `quantity <= 0` removes the line
    pub fn set_quantity(&self, user_id: &str, meal_id: &str, quantity: i64) -> CartResult<Cart> {
        if quantity <= 0 {
            return self.remove_item(user_id, meal_id);
        }
        let quantity = to_quantity(quantity)?;
        self.mutate(user_id, |cart| {
            if cart.set_quantity(meal_id, quantity) {
                Ok(())
            } else {
                Err(CartError::ItemNotFound(meal_id.to_string()))
            }
        })
    }

    pub fn clear(&self, user_id: &str) -> CartResult<Cart> {
        self.mutate(user_id, |cart| {
            cart.clear();
            Ok(())
        })
    }

    /// Drop the in-memory copy (sign-out); the snapshot stays on disk
    pub fn unload(&self, user_id: &str) {
        self.carts.remove(user_id);
    }

    /// Apply `f` to a copy, persist it, then publish it
    fn mutate<F>(&self, user_id: &str, f: F) -> CartResult<Cart>
    where
        F: FnOnce(&mut Cart) -> CartResult<()>,
    {
        // 确保内存中有购物车 (可能尚未从存储加载)
        let current = self.get(user_id);
        let mut entry = self.carts.entry(user_id.to_string()).or_insert(current);

        let mut next = entry.clone();
        f(&mut next)?;
        next.recompute_total();

        self.store.save(user_id, &next)?;
        *entry = next.clone();
        Ok(next)
    }
}

/// Accepts `1..=MAX_QUANTITY`
fn to_quantity(quantity: i64) -> CartResult<u32> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| (1..=MAX_QUANTITY).contains(q))
        .ok_or(CartError::InvalidQuantity(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::data::static_meals;
    use rust_decimal::Decimal;

    fn manager() -> CartManager {
        CartManager::new(CartStore::open_in_memory().unwrap())
    }

    #[test]
    fn test_worked_example_total() {
        let carts = manager();
        let meals = static_meals();
        carts.add_item("u1", &meals[0], 1).unwrap();
        carts.add_item("u1", &meals[0], 1).unwrap();
        let cart = carts.add_item("u1", &meals[1], 1).unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.total_price, Decimal::new(3097, 2));
        assert_eq!(cart.items[0].restaurant_id.as_deref(), Some("r1"));
    }

    #[test]
    fn test_add_rejects_bad_price_and_quantity() {
        let carts = manager();
        let mut free = static_meals().remove(0);
        free.price = Decimal::ZERO;

        assert!(matches!(
            carts.add_item("u1", &free, 1),
            Err(CartError::MealWithoutPrice(_))
        ));
        assert!(matches!(
            carts.add_item("u1", &static_meals()[0], 0),
            Err(CartError::InvalidQuantity(0))
        ));
        assert!(carts.get("u1").is_empty());
    }

    #[test]
    fn test_quantity_bounded_per_line() {
        let carts = manager();
        let meal = &static_meals()[0];

        assert!(matches!(
            carts.add_item("u1", meal, i64::from(u32::MAX)),
            Err(CartError::InvalidQuantity(_))
        ));
        assert!(matches!(
            carts.add_item("u1", meal, i64::from(MAX_QUANTITY) + 1),
            Err(CartError::InvalidQuantity(_))
        ));

        carts.add_item("u1", meal, i64::from(MAX_QUANTITY)).unwrap();
        assert!(matches!(
            carts.add_item("u1", meal, 1),
            Err(CartError::InvalidQuantity(100))
        ));
        assert!(matches!(
            carts.set_quantity("u1", "m1", i64::from(MAX_QUANTITY) + 1),
            Err(CartError::InvalidQuantity(_))
        ));

        let cart = carts.get("u1");
        assert_eq!(cart.items[0].quantity, MAX_QUANTITY);
        assert_eq!(cart.total_price, Decimal::new(899 * 99, 2));
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let carts = manager();
        let meals = static_meals();
        carts.add_item("u1", &meals[0], 2).unwrap();
        carts.add_item("u1", &meals[1], 1).unwrap();

        let cart = carts.set_quantity("u1", "m2", 3).unwrap();
        assert_eq!(cart.get("m2").map(|i| i.quantity), Some(3));

        let cart = carts.set_quantity("u1", "m1", 0).unwrap();
        assert!(cart.get("m1").is_none());
        assert_eq!(cart.total_price, Decimal::new(3897, 2));

        assert!(matches!(
            carts.set_quantity("u1", "m9", 2),
            Err(CartError::ItemNotFound(_))
        ));
        // failed mutation leaves the cart as it was
        assert_eq!(carts.get("u1"), cart);

        let cart = carts.remove_item("u1", "m2").unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price, Decimal::ZERO);
    }

    #[test]
    fn test_carts_are_per_user_and_restored() {
        let store = CartStore::open_in_memory().unwrap();
        let carts = CartManager::new(store.clone());
        carts.add_item("u1", &static_meals()[2], 1).unwrap();
        carts.add_item("u2", &static_meals()[3], 2).unwrap();
        assert_eq!(carts.get("u1").items.len(), 1);

        let restored = CartManager::new(store);
        assert_eq!(restored.restore().unwrap(), 2);
        assert_eq!(restored.get("u2"), carts.get("u2"));
        assert_eq!(restored.get("u2").total_price, Decimal::new(2798, 2));

        carts.clear("u1").unwrap();
        assert!(carts.get("u1").is_empty());
    }
}
