//! PowerLabs storefront library.
//!
//! Catalog loading, the persisted cart store, coupon handling, the mock
//! checkout flow and the JSON API that exposes them. The binary in
//! `main.rs` only wires configuration, tracing and Sentry around
//! [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart_store;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod middleware;
pub mod persistence;
pub mod routes;
pub mod session;
pub mod state;
