//! Per-shopper session state.
//!
//! Groups the cart store, the coupon state and the checkout flow so that
//! every shopper action runs against one owned value. While a receipt is
//! shown the cart and coupon are frozen until the shopper continues.

use std::time::Duration;

use powerlabs_core::{Cart, CouponError, CouponState, PriceBreakdown, Product, ProductId};
use thiserror::Error;

use crate::cart_store::{CartStore, MutationOutcome};
use crate::checkout::{CheckoutError, CheckoutFlow, ContinueShopping, Receipt};

/// Errors from applying a coupon to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// Cart, coupon and checkout state for one shopper.
#[derive(Debug)]
pub struct ShopSession {
    cart: CartStore,
    coupon: CouponState,
    checkout: CheckoutFlow,
}

impl ShopSession {
    /// Create a session around an existing cart store.
    #[must_use]
    pub const fn new(cart: CartStore, continue_delay: Duration) -> Self {
        Self {
            cart,
            coupon: CouponState::new(),
            checkout: CheckoutFlow::new(continue_delay),
        }
    }

    /// The underlying cart store.
    #[must_use]
    pub const fn cart_store(&self) -> &CartStore {
        &self.cart
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.cart.cart()
    }

    /// Current coupon state.
    #[must_use]
    pub const fn coupon(&self) -> &CouponState {
        &self.coupon
    }

    /// Subtotal, discount and total for the current cart.
    #[must_use]
    pub fn totals(&self) -> PriceBreakdown {
        PriceBreakdown::for_cart(self.cart.cart(), self.coupon.is_applied())
    }

    /// Whether checkout is currently possible.
    #[must_use]
    pub const fn can_checkout(&self) -> bool {
        self.checkout.can_checkout(self.cart.cart())
    }

    /// Cart and coupon changes are refused while a receipt is shown.
    const fn ensure_shopping(&self) -> Result<(), CheckoutError> {
        if self.checkout.receipt().is_some() {
            return Err(CheckoutError::ReceiptPending);
        }
        Ok(())
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::ReceiptPending` while a receipt is shown.
    pub fn add_to_cart(&mut self, product: &Product) -> Result<MutationOutcome, CheckoutError> {
        self.ensure_shopping()?;
        Ok(self.cart.add_to_cart(product))
    }

    /// Remove the line item for `id`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::ReceiptPending` while a receipt is shown.
    pub fn remove_from_cart(&mut self, id: ProductId) -> Result<MutationOutcome, CheckoutError> {
        self.ensure_shopping()?;
        Ok(self.cart.remove_from_cart(id))
    }

    /// Increase the quantity of `id` by one.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::ReceiptPending` while a receipt is shown.
    pub fn increase_quantity(&mut self, id: ProductId) -> Result<MutationOutcome, CheckoutError> {
        self.ensure_shopping()?;
        Ok(self.cart.increase_quantity(id))
    }

    /// Decrease the quantity of `id` by one.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::ReceiptPending` while a receipt is shown.
    pub fn decrease_quantity(&mut self, id: ProductId) -> Result<MutationOutcome, CheckoutError> {
        self.ensure_shopping()?;
        Ok(self.cart.decrease_quantity(id))
    }

    /// Try to apply a coupon code.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Checkout` while a receipt is shown, and
    /// `SessionError::Coupon` when the code is wrong or a coupon is already
    /// applied.
    pub fn apply_coupon(&mut self, code: &str) -> Result<(), SessionError> {
        self.ensure_shopping()?;
        Ok(self.coupon.apply(code)?)
    }

    /// Check out the current cart.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::checkout`].
    pub fn checkout(&mut self) -> Result<&Receipt, CheckoutError> {
        self.checkout.checkout(self.cart.cart(), &self.coupon)
    }

    /// The receipt being shown, if any.
    #[must_use]
    pub const fn receipt(&self) -> Option<&Receipt> {
        self.checkout.receipt()
    }

    /// Dismiss the receipt and start over with an empty cart.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::continue_shopping`].
    pub fn continue_shopping(&mut self) -> Result<ContinueShopping, CheckoutError> {
        self.checkout
            .continue_shopping(&mut self.cart, &mut self.coupon)
    }
}
