//! Session cart state.
//!
//! A cart is a per-session mapping of product ID to desired quantity,
//! kept in insertion order. It is plain serializable state: all stock
//! validation lives in [`crate::cart::CartService`], which owns the only
//! mutation paths that add or grow entries.

use serde::{Deserialize, Serialize};

use dragonfruit_core::{Price, ProductId};

/// One cart line: a product and the desired quantity (always >= 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The session-scoped cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Whether the cart holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Quantity currently held for `product_id` (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.entries
            .iter()
            .find(|e| e.product_id == product_id)
            .map_or(0, |e| e.quantity)
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Set the stored quantity, keeping insertion order for existing
    /// entries. Validation happens in the cart service before this is
    /// called.
    pub(crate) fn put(&mut self, product_id: ProductId, quantity: u32) {
        match self.entries.iter_mut().find(|e| e.product_id == product_id) {
            Some(entry) => entry.quantity = quantity,
            None => self.entries.push(CartEntry {
                product_id,
                quantity,
            }),
        }
    }

    /// Remove the entry for `product_id`. Idempotent: removing an absent
    /// entry is a no-op.
    pub fn remove(&mut self, product_id: ProductId) {
        self.entries.retain(|e| e.product_id != product_id);
    }

    /// Empty the whole cart. Idempotent.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A cart entry enriched with live product data for display and checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// Current unit price; frozen only at checkout.
    pub unit_price: Price,
    /// Current stock level.
    pub stock: u32,
    pub image_path: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// Line subtotal at the current price.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.put(ProductId::new(3), 1);
        cart.put(ProductId::new(1), 2);
        cart.put(ProductId::new(3), 5);

        let ids: Vec<_> = cart.entries().iter().map(|e| e.product_id).collect();
        assert_eq!(ids, [ProductId::new(3), ProductId::new(1)]);
        assert_eq!(cart.quantity_of(ProductId::new(3)), 5);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.put(ProductId::new(1), 2);
        cart.remove(ProductId::new(1));
        let after_first = cart.clone();
        cart.remove(ProductId::new(1));
        assert_eq!(cart, after_first);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = Cart::new();
        cart.put(ProductId::new(1), 2);
        cart.clear();
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unit_count() {
        let mut cart = Cart::new();
        cart.put(ProductId::new(1), 2);
        cart.put(ProductId::new(2), 3);
        assert_eq!(cart.unit_count(), 5);
    }
}
