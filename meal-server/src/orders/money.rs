//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are `Decimal` in memory and `REAL` in SQLite; conversions round
//! to 2 decimal places (half away from zero).

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

/// Convert a stored f64 to a 2 dp Decimal
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    round_money(Decimal::from_f64(value).unwrap_or_default())
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Order total = cart total + delivery fee
pub fn order_total(cart_total: Decimal, delivery_fee: Decimal) -> Decimal {
    round_money(cart_total + delivery_fee)
}

/// Price of an API recipe: calories / 100 × 1.5, or 9.99 without calories
pub fn price_from_calories(calories: f64) -> Decimal {
    if !calories.is_finite() || calories <= 0.0 {
        return Decimal::new(999, 2);
    }
    let cal = Decimal::from_f64(calories).unwrap_or_default();
    round_money(cal / Decimal::ONE_HUNDRED * Decimal::new(15, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
        assert_eq!(to_decimal(8.99), Decimal::new(899, 2));
    }

    #[test]
    fn test_order_total_with_delivery_fee() {
        let cart = Decimal::new(899, 2) * Decimal::from(2) + Decimal::new(1299, 2);
        assert_eq!(cart, Decimal::new(3097, 2));
        assert_eq!(order_total(cart, Decimal::new(599, 2)), Decimal::new(3696, 2));
    }

    #[test]
    fn test_price_from_calories() {
        assert_eq!(price_from_calories(400.0), Decimal::new(600, 2));
        assert_eq!(price_from_calories(285.0), Decimal::new(428, 2));
        assert_eq!(price_from_calories(0.0), Decimal::new(999, 2));
        assert_eq!(price_from_calories(f64::NAN), Decimal::new(999, 2));
    }
}
