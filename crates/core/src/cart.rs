//! Cart data model.
//!
//! A [`Cart`] is an ordered list of [`CartLineItem`]s in insertion order.
//! Every operation keeps two invariants:
//!
//! - every line item has a quantity of at least 1
//! - no two line items share a product id (quantities merge instead)
//!
//! The type itself does no I/O. The storefront's cart store wraps it with
//! persistence and change notification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Money, Product, ProductId};

/// Errors raised when a cart is rebuilt from untrusted data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Two line items reference the same product.
    #[error("duplicate line item for product {0}")]
    DuplicateProduct(ProductId),
    /// A line item has a quantity of zero.
    #[error("line item for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
    /// A line item carries a negative unit price.
    #[error("line item for product {0} has a negative price")]
    NegativePrice(ProductId),
    /// The cart total does not fit in a money amount.
    #[error("cart total is out of range")]
    TotalOverflow,
}

/// A product paired with a quantity.
///
/// Serialized flat, as the product fields plus `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLineItem {
    /// Line total, `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product.price * self.quantity
    }

    /// Product id of this line.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }
}

/// An ordered collection of line items with unique product ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] for duplicate product ids, zero quantities,
    /// negative prices or a total too large to represent.
    pub fn from_items(items: Vec<CartLineItem>) -> Result<Self, CartError> {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        for item in &items {
            let id = item.id();
            if item.quantity == 0 {
                return Err(CartError::ZeroQuantity(id));
            }
            if item.product.price.is_negative() {
                return Err(CartError::NegativePrice(id));
            }
            if !seen.insert(id) {
                return Err(CartError::DuplicateProduct(id));
            }
        }
        let cart = Self { items };
        if cart.checked_total().is_none() {
            return Err(CartError::TotalOverflow);
        }
        Ok(cart)
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Number of distinct line items.
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `price * quantity` over all line items. Zero when empty.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Like [`Self::total`], but `None` when the sum does not fit.
    #[must_use]
    pub fn checked_total(&self) -> Option<Money> {
        self.items.iter().try_fold(Money::zero(), |total, item| {
            total.checked_add(item.product.price.checked_mul_quantity(item.quantity)?)
        })
    }

    /// Add one unit of a product, merging into an existing line if present.
    ///
    /// Returns `false`, leaving the cart unchanged, when one more unit
    /// would push the total out of range.
    pub fn add(&mut self, product: &Product) -> bool {
        if !self.can_grow_by(product.price) {
            return false;
        }
        if let Some(item) = self.get_mut(product.id) {
            item.quantity = item.quantity.saturating_add(1);
        } else {
            self.items.push(CartLineItem {
                product: product.clone(),
                quantity: 1,
            });
        }
        true
    }

    /// Remove the line for a product. Returns whether a line was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    /// Add one unit to an existing line.
    ///
    /// Returns whether the line exists and could grow without pushing the
    /// total out of range.
    pub fn increase(&mut self, id: ProductId) -> bool {
        let Some(price) = self.get(id).map(|item| item.product.price) else {
            return false;
        };
        if !self.can_grow_by(price) {
            return false;
        }
        match self.get_mut(id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Take one unit off an existing line, removing it when it holds 1.
    ///
    /// Returns whether the line exists.
    pub fn decrease(&mut self, id: ProductId) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id() == id) else {
            return false;
        };
        match self.items.get_mut(index) {
            Some(item) if item.quantity > 1 => item.quantity -= 1,
            _ => {
                self.items.remove(index);
            }
        }
        true
    }

    /// Remove every line item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn can_grow_by(&self, price: Money) -> bool {
        self.checked_total()
            .and_then(|total| total.checked_add(price))
            .is_some()
    }

    fn get_mut(&mut self, id: ProductId) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }
}

impl TryFrom<Vec<CartLineItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<CartLineItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
