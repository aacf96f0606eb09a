//! Mock checkout flow.
//!
//! The flow cycles between two phases:
//!
//! ```text
//! Shopping --checkout--> ReceiptShown --continue_shopping--> Shopping
//! ```
//!
//! Checkout only snapshots the cart into a [`Receipt`]; the cart is cleared
//! when the customer continues shopping. Nothing is charged.

use std::time::Duration;

use chrono::{DateTime, Utc};
use powerlabs_core::pricing::DISCOUNT_LABEL;
use powerlabs_core::{Cart, CouponState, Money, PriceBreakdown};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::cart_store::CartStore;

/// Where the customer lands after continuing from a receipt.
pub const CATALOG_ROUTE: &str = "/";

/// Precondition failures for checkout actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Checkout was requested with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,
    /// A receipt is already shown and must be dismissed first.
    #[error("A receipt is already shown")]
    ReceiptPending,
    /// There is no receipt to continue from.
    #[error("No checkout in progress")]
    NoReceipt,
}

/// One purchased line on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Immutable record of a completed mock purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    /// Present only when a coupon was applied.
    pub discount: Option<Money>,
    pub discount_label: Option<&'static str>,
    /// "Total Paid".
    pub total: Money,
}

impl Receipt {
    /// Snapshot a cart and its price breakdown.
    #[must_use]
    pub fn from_cart(cart: &Cart, coupon_applied: bool) -> Self {
        let breakdown = PriceBreakdown::for_cart(cart, coupon_applied);
        let lines = cart
            .items()
            .iter()
            .map(|item| ReceiptLine {
                name: item.product.name.clone(),
                quantity: item.quantity,
                unit_price: item.product.price,
                line_total: item.line_total(),
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            issued_at: Utc::now(),
            lines,
            subtotal: breakdown.subtotal,
            discount: breakdown.applied_discount(),
            discount_label: breakdown.coupon_applied.then_some(DISCOUNT_LABEL),
            total: breakdown.total,
        }
    }
}

/// Current phase of the checkout flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Shopping,
    ReceiptShown(Receipt),
}

/// Result of dismissing a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContinueShopping {
    /// The receipt that was dismissed.
    pub receipt: Receipt,
    /// Route to navigate to.
    pub redirect_to: &'static str,
    /// Cosmetic pause before navigating.
    #[serde(rename = "delay_ms", serialize_with = "serialize_millis")]
    pub delay: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // signature required by serde
fn serialize_millis<S: serde::Serializer>(delay: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
}

/// The checkout state machine.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    phase: CheckoutPhase,
    continue_delay: Duration,
}

impl CheckoutFlow {
    /// Start in the shopping phase.
    #[must_use]
    pub const fn new(continue_delay: Duration) -> Self {
        Self {
            phase: CheckoutPhase::Shopping,
            continue_delay,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    /// The receipt being shown, if any.
    #[must_use]
    pub const fn receipt(&self) -> Option<&Receipt> {
        match &self.phase {
            CheckoutPhase::ReceiptShown(receipt) => Some(receipt),
            CheckoutPhase::Shopping => None,
        }
    }

    /// Whether the checkout action should be enabled for `cart`.
    #[must_use]
    pub const fn can_checkout(&self, cart: &Cart) -> bool {
        matches!(self.phase, CheckoutPhase::Shopping) && !cart.is_empty()
    }

    /// Move to `ReceiptShown` with a receipt for the current cart.
    ///
    /// The cart itself is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart and
    /// `CheckoutError::ReceiptPending` if a receipt is already shown.
    pub fn checkout(&mut self, cart: &Cart, coupon: &CouponState) -> Result<&Receipt, CheckoutError> {
        if matches!(self.phase, CheckoutPhase::ReceiptShown(_)) {
            return Err(CheckoutError::ReceiptPending);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let receipt = Receipt::from_cart(cart, coupon.is_applied());
        info!(
            receipt_id = %receipt.id,
            lines = receipt.lines.len(),
            total = %receipt.total,
            "Checkout completed"
        );
        self.phase = CheckoutPhase::ReceiptShown(receipt);

        self.receipt().ok_or(CheckoutError::NoReceipt)
    }

    /// Leave the receipt: clear the cart, reset the coupon, dismiss the
    /// receipt and return where to navigate.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NoReceipt` when no receipt is shown.
    pub fn continue_shopping(
        &mut self,
        cart: &mut CartStore,
        coupon: &mut CouponState,
    ) -> Result<ContinueShopping, CheckoutError> {
        if !matches!(self.phase, CheckoutPhase::ReceiptShown(_)) {
            return Err(CheckoutError::NoReceipt);
        }

        cart.clear();
        coupon.reset();
        let CheckoutPhase::ReceiptShown(receipt) = std::mem::take(&mut self.phase) else {
            return Err(CheckoutError::NoReceipt);
        };

        info!(receipt_id = %receipt.id, "Receipt dismissed, cart cleared");
        Ok(ContinueShopping {
            receipt,
            redirect_to: CATALOG_ROUTE,
            delay: self.continue_delay,
        })
    }
}
