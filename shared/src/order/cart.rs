//! Cart snapshot types

use crate::models::MealSource;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound of a single line's quantity
pub const MAX_QUANTITY: u32 = 99;

/// 购物车行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub meal_id: String,
    /// Always >= 1 once stored
    pub quantity: u32,
    /// Unit price captured when the meal was added
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub source: MealSource,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Cart: ordered line items plus the derived total
///
/// Every mutating method recomputes `total_price`, so a serialized cart
/// always carries a consistent total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, meal_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.meal_id == meal_id)
    }

    /// Increment an existing line or append a new one.
    /// Returns `false` (cart unchanged) when the line would exceed [`MAX_QUANTITY`].
    pub fn add(&mut self, item: CartItem) -> bool {
        match self.items.iter_mut().find(|i| i.meal_id == item.meal_id) {
            Some(existing) => match existing.quantity.checked_add(item.quantity) {
                Some(total) if total <= MAX_QUANTITY => existing.quantity = total,
                _ => return false,
            },
            None if item.quantity > MAX_QUANTITY => return false,
            None => self.items.push(item),
        }
        self.recompute_total();
        true
    }

    /// Returns `false` when the meal was not in the cart
    pub fn remove(&mut self, meal_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.meal_id != meal_id);
        self.recompute_total();
        self.items.len() != before
    }

    /// Overwrite a quantity; `0` removes the line
    pub fn set_quantity(&mut self, meal_id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(meal_id);
        }
        let found = match self.items.iter_mut().find(|i| i.meal_id == meal_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        };
        self.recompute_total();
        found
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute_total();
    }

    pub fn recompute_total(&mut self) {
        self.total_price = self.items.iter().map(CartItem::line_total).sum();
    }
}
