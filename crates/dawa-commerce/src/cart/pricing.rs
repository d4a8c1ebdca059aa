//! Delivery pricing.
//!
//! Orders below the free-delivery threshold pay a flat fee. The fee is shown
//! to the shopper but is settled on delivery, so it never enters the order
//! total sent to the API.

use crate::money::{Currency, Money};
use serde::Serialize;

/// Flat delivery fee in major units.
pub const FLAT_FEE_UNITS: i64 = 200;

/// Subtotal (major units) at or above which delivery is free.
pub const FREE_DELIVERY_THRESHOLD_UNITS: i64 = 2000;

/// Flat delivery fee.
pub const DELIVERY_FEE: Money = Money::kes(FLAT_FEE_UNITS);

/// Free-delivery threshold.
pub const FREE_DELIVERY_THRESHOLD: Money = Money::kes(FREE_DELIVERY_THRESHOLD_UNITS);

fn in_currency(units: i64, currency: Currency) -> Money {
    Money::new(units * currency.minor_per_major(), currency)
}

/// Delivery fee for a subtotal: zero at or above the threshold.
pub fn delivery_fee(subtotal: Money) -> Money {
    let threshold = in_currency(FREE_DELIVERY_THRESHOLD_UNITS, subtotal.currency);
    if subtotal.amount_cents >= threshold.amount_cents {
        Money::zero(subtotal.currency)
    } else {
        in_currency(FLAT_FEE_UNITS, subtotal.currency)
    }
}

/// Subtotal plus delivery fee. Saturates instead of overflowing.
pub fn grand_total(subtotal: Money) -> Money {
    let fee = delivery_fee(subtotal);
    Money::new(
        subtotal.amount_cents.saturating_add(fee.amount_cents),
        subtotal.currency,
    )
}

/// Everything a summary panel needs to render delivery costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeliveryPricing {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub grand_total: Money,
    /// Whether the subtotal qualifies for free delivery.
    pub free_delivery: bool,
    /// How much more must be added to qualify; zero once qualified.
    pub remaining_for_free_delivery: Money,
}

impl DeliveryPricing {
    pub fn for_subtotal(subtotal: Money) -> Self {
        let fee = delivery_fee(subtotal);
        let threshold = in_currency(FREE_DELIVERY_THRESHOLD_UNITS, subtotal.currency);
        let remaining = threshold
            .amount_cents
            .saturating_sub(subtotal.amount_cents)
            .max(0);
        Self {
            subtotal,
            delivery_fee: fee,
            grand_total: grand_total(subtotal),
            free_delivery: fee.is_zero(),
            remaining_for_free_delivery: Money::new(remaining, subtotal.currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_below_threshold() {
        assert_eq!(delivery_fee(Money::kes(1999)), DELIVERY_FEE);
        assert_eq!(delivery_fee(Money::new(199_999, Currency::KES)), DELIVERY_FEE);
        assert_eq!(delivery_fee(Money::zero(Currency::KES)), DELIVERY_FEE);
    }

    #[test]
    fn test_fee_at_threshold_is_free() {
        assert!(delivery_fee(FREE_DELIVERY_THRESHOLD).is_zero());
        assert!(delivery_fee(Money::kes(5000)).is_zero());
    }

    #[test]
    fn test_grand_total() {
        assert_eq!(grand_total(Money::kes(1800)), Money::kes(2000));
        assert_eq!(grand_total(Money::kes(2000)), Money::kes(2000));
    }

    #[test]
    fn test_delivery_pricing() {
        let pricing = DeliveryPricing::for_subtotal(Money::kes(1500));
        assert!(!pricing.free_delivery);
        assert_eq!(pricing.delivery_fee, Money::kes(200));
        assert_eq!(pricing.grand_total, Money::kes(1700));
        assert_eq!(pricing.remaining_for_free_delivery, Money::kes(500));

        let pricing = DeliveryPricing::for_subtotal(Money::kes(2900));
        assert!(pricing.free_delivery);
        assert!(pricing.remaining_for_free_delivery.is_zero());
    }

    #[test]
    fn test_fee_follows_subtotal_currency() {
        let fee = delivery_fee(Money::new(100, Currency::UGX));
        assert_eq!(fee, Money::new(200, Currency::UGX));
    }
}
