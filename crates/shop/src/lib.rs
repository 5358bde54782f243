//! Dragonfruit Shop - cart-to-order transaction pipeline.
//!
//! This crate implements the storefront's core: a session-scoped cart kept
//! consistent with live stock, an atomic checkout that converts a cart into
//! an immutable order without overselling under concurrent checkouts, and
//! the ownership/role gate protecting order data and admin mutations.
//!
//! # Architecture
//!
//! Services are generic over store traits ([`store::ProductStore`],
//! [`store::OrderStore`], [`store::UserStore`], [`session::SessionStore`])
//! with two implementations each: `PostgreSQL` repositories in [`db`] for
//! production and [`store::MemoryStore`] / [`session::MemorySessionStore`]
//! for tests.
//!
//! Presentation concerns (HTML rendering, routing, pagination, catalog
//! browsing) live outside this crate; callers translate the typed errors
//! into whatever their transport needs.
//!
//! # Modules
//!
//! - [`cart`] - Session cart validated against live stock
//! - [`checkout`] - All-or-nothing order placement with no-oversell guarantee
//! - [`orders`] - Order access (owner-or-admin) and status updates
//! - [`catalog`] - Admin product mutations
//! - [`auth`] - Request identity and the authorization guard
//! - [`session`] - Pluggable session persistence for cart and identity
//! - [`notify`] - Best-effort order confirmation email
//! - [`db`] - `PostgreSQL` repositories and pool setup
//! - [`store`] - Store traits and the in-memory implementation

#![cfg_attr(not(test), forbid(unsafe_code))]
// Store seams are statically dispatched; callers never need to name the
// returned futures or add Send bounds at the trait level.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod db;
pub mod models;
pub mod notify;
pub mod orders;
pub mod session;
pub mod store;
