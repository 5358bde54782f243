//! Product domain types.

use chrono::{DateTime, Utc};
use dragonfruit_core::{Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Current unit price.
    pub price: Price,
    /// Units in stock. Never negative; checkout decrements it only through
    /// the conditional write in the order store.
    pub stock: u32,
    /// Optional image path served by the presentation layer.
    pub image_path: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last edited, if ever.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields for creating or replacing a product (admin operations).
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub image_path: Option<String>,
}
