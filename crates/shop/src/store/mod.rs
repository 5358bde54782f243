//! Store traits: the seams between services and persistence.
//!
//! Production uses the `PostgreSQL` repositories in [`crate::db`]; tests
//! use [`MemoryStore`]. Services are generic over these traits and
//! statically dispatched.

pub mod memory;

use thiserror::Error;

use dragonfruit_core::{Email, OrderId, OrderStatus, ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::{Order, OrderDetail, OrderDraft, Product, ProductInput, User};

pub use memory::MemoryStore;

/// Read access to products plus the admin mutations.
///
/// From the pipeline's perspective this is read-only: checkout never calls
/// the mutation methods, and stock is only ever decremented through the
/// conditional write inside [`OrderStore::create_order`].
pub trait ProductStore {
    /// Fetch a product by ID.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Fetch the products for the given IDs. Missing IDs are simply absent
    /// from the result; the order of the result is unspecified.
    async fn list_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    /// Create a product (admin).
    async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError>;

    /// Replace a product's fields, including a direct stock edit (admin).
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the product does not exist.
    async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, RepositoryError>;

    /// Delete a product (admin). Existing order items keep their snapshot.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the product does not exist.
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;
}

/// Failure modes of [`OrderStore::create_order`].
#[derive(Debug, Error)]
pub enum CreateOrderError {
    /// Stock fell below the requested quantity between cart validation and
    /// the conditional decrement. Nothing was persisted.
    #[error("insufficient stock for {name:?}")]
    OutOfStock {
        product_id: ProductId,
        name: String,
        requested: u32,
    },

    /// Storage failure; the transaction was rolled back in full.
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl From<sqlx::Error> for CreateOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(RepositoryError::Database(e))
    }
}

/// Order persistence and retrieval.
pub trait OrderStore {
    /// Persist a draft as an order with its items, decrementing stock for
    /// every item, all-or-nothing.
    ///
    /// Each stock decrement is conditional on sufficient stock at write
    /// time; a failed decrement aborts the whole operation so no partial
    /// order is ever visible.
    ///
    /// # Errors
    ///
    /// [`CreateOrderError::OutOfStock`] when any decrement fails;
    /// [`CreateOrderError::Storage`] for storage failures. Either way no
    /// order, item, or stock change is persisted.
    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderDetail, CreateOrderError>;

    /// Fetch an order with its items.
    async fn get(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError>;

    /// All orders placed by `user`, newest first.
    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// All orders, newest first, optionally filtered by status (admin).
    async fn list_all(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError>;

    /// Write a new status and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the order does not exist.
    async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError>;
}

/// User lookup for authentication and identity.
pub trait UserStore {
    /// Fetch a user by ID.
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Fetch a user by login email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;
}
