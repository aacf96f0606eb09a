//! Subtotal, discount and final total computation.
//!
//! All functions here are pure. A discount is a fixed percentage of the
//! subtotal, rounded to cents, so it can never be negative or exceed the
//! subtotal and the final total is never negative.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::Cart;
use crate::types::Money;

/// Discount rate unlocked by a valid coupon (13.2%).
pub const DISCOUNT_RATE: Decimal = Decimal::from_parts(132, 0, 0, false, 3);

/// Human-readable label for [`DISCOUNT_RATE`].
pub const DISCOUNT_LABEL: &str = "13.2%";

/// Sum of `price * quantity` across all line items. Zero for an empty cart.
#[must_use]
pub fn compute_subtotal(cart: &Cart) -> Money {
    cart.total()
}

/// Discount for a subtotal: `subtotal * DISCOUNT_RATE` when a coupon is
/// applied, otherwise zero. Rounded to cents.
#[must_use]
pub fn compute_discount(subtotal: Money, applied: bool) -> Money {
    if !applied || subtotal.is_zero() || subtotal.is_negative() {
        return Money::zero();
    }
    (subtotal * DISCOUNT_RATE).round_to_cents()
}

/// Amount left to pay, `subtotal - discount`, floored at zero.
#[must_use]
pub fn compute_final_total(subtotal: Money, discount: Money) -> Money {
    let total = subtotal - discount;
    if total.is_negative() {
        Money::zero()
    } else {
        total
    }
}

/// Every derived amount for a cart, computed in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub coupon_applied: bool,
}

impl PriceBreakdown {
    /// Price a cart with or without the coupon discount.
    #[must_use]
    pub fn for_cart(cart: &Cart, coupon_applied: bool) -> Self {
        let subtotal = compute_subtotal(cart);
        let discount = compute_discount(subtotal, coupon_applied);
        Self {
            subtotal,
            discount,
            total: compute_final_total(subtotal, discount),
            coupon_applied,
        }
    }

    /// The discount, if one was applied to this breakdown.
    #[must_use]
    pub const fn applied_discount(&self) -> Option<Money> {
        if self.coupon_applied {
            Some(self.discount)
        } else {
            None
        }
    }
}
