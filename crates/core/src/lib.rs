//! PowerLabs Core - Cart, pricing and coupon logic.
//!
//! This crate provides the domain model shared by the storefront binary and
//! its tests:
//! - [`types`] - Product IDs, money amounts and catalog products
//! - [`cart`] - The cart data model and its quantity invariants
//! - [`pricing`] - Subtotal, discount and final total computation
//! - [`coupon`] - Coupon validation and per-session coupon state
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! persistence, no HTTP. Persistence and presentation live in the
//! storefront crate, which drives everything through these types.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod coupon;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartError, CartLineItem};
pub use coupon::{COUPON_CODE, CouponError, CouponState, validate_coupon};
pub use pricing::{
    DISCOUNT_LABEL, DISCOUNT_RATE, PriceBreakdown, compute_discount, compute_final_total, compute_subtotal,
};
pub use types::*;
