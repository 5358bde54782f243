//! Dragonfruit Core - Shared types library.
//!
//! This crate provides common types used across the Dragonfruit Market
//! components:
//! - `shop` - Cart, checkout, order, and authorization services
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. The
//! optional `postgres` feature adds sqlx encode/decode support for the
//! newtypes so they can be bound directly in queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, order
//!   statuses, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
