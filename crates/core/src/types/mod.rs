//! Core types for the PowerLabs shop.
//!
//! This module provides type-safe wrappers for catalog concepts.

pub mod id;
pub mod money;
pub mod product;

pub use id::ProductId;
pub use money::Money;
pub use product::Product;
