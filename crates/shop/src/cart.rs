//! Session cart operations, validated against live stock.
//!
//! Every mutation that adds or grows a cart line re-checks the product's
//! current stock, so a cart can only drift out of sync with the catalog
//! through concurrent activity; [`CartService::validate_against_stock`]
//! reports that drift and checkout closes the remaining window with its
//! conditional decrement.

use thiserror::Error;

use dragonfruit_core::{Price, ProductId};

use crate::db::RepositoryError;
use crate::models::{Cart, CartItem};
use crate::store::ProductStore;

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product does not exist (or was deleted).
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The requested quantity exceeds current stock.
    #[error("insufficient stock for {name:?}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    /// Storage failure looking up product data.
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// One discrepancy between the cart and current stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockConflict {
    /// The product was deleted since it was added to the cart.
    Missing { product_id: ProductId },

    /// The cart wants more than is currently available.
    Insufficient {
        product_id: ProductId,
        name: String,
        requested: u32,
        /// Current stock, when known (pre-check); `None` when the conflict
        /// was detected by the atomic decrement mid-checkout.
        available: Option<u32>,
    },
}

impl std::fmt::Display for StockConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { product_id } => {
                write!(f, "Product {product_id} no longer exists")
            }
            Self::Insufficient {
                name,
                requested,
                available: Some(available),
                ..
            } => write!(
                f,
                "Insufficient stock for {name:?}: available {available}, requested {requested}"
            ),
            Self::Insufficient {
                name, requested, ..
            } => write!(f, "Insufficient stock for {name:?} (requested {requested})"),
        }
    }
}

/// Cart operations over a [`ProductStore`].
///
/// The service holds only the product store; the [`Cart`] itself is the
/// caller's session state and is passed into each call.
#[derive(Clone)]
pub struct CartService<P> {
    products: P,
}

impl<P: ProductStore> CartService<P> {
    /// Create a cart service over a product store.
    pub const fn new(products: P) -> Self {
        Self { products }
    }

    /// Add `quantity` units of a product, merging with any existing entry.
    ///
    /// # Errors
    ///
    /// [`CartError::NotFound`] if the product does not exist;
    /// [`CartError::InsufficientStock`] if the merged quantity would
    /// exceed current stock.
    pub async fn add(
        &self,
        cart: &mut Cart,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or(CartError::NotFound(product_id))?;

        let new_quantity = cart.quantity_of(product_id).saturating_add(quantity);
        if new_quantity > product.stock {
            return Err(CartError::InsufficientStock {
                name: product.name,
                requested: new_quantity,
                available: product.stock,
            });
        }

        cart.put(product_id, new_quantity);
        Ok(())
    }

    /// Replace the stored quantity for a product.
    ///
    /// A quantity of zero removes the entry (idempotent success, even for
    /// an unknown product).
    ///
    /// # Errors
    ///
    /// [`CartError::NotFound`] if the product does not exist;
    /// [`CartError::InsufficientStock`] if `quantity` exceeds current
    /// stock.
    pub async fn set_quantity(
        &self,
        cart: &mut Cart,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            cart.remove(product_id);
            return Ok(());
        }

        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or(CartError::NotFound(product_id))?;

        if quantity > product.stock {
            return Err(CartError::InsufficientStock {
                name: product.name,
                requested: quantity,
                available: product.stock,
            });
        }

        cart.put(product_id, quantity);
        Ok(())
    }

    /// The cart's entries enriched with live product data, in insertion
    /// order. Entries whose product has been deleted are silently omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the product lookup fails.
    pub async fn items(&self, cart: &Cart) -> Result<Vec<CartItem>, RepositoryError> {
        if cart.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ProductId> = cart.entries().iter().map(|e| e.product_id).collect();
        let products = self.products.list_by_ids(&ids).await?;

        let items = cart
            .entries()
            .iter()
            .filter_map(|entry| {
                let product = products.iter().find(|p| p.id == entry.product_id)?;
                Some(CartItem {
                    product_id: product.id,
                    name: product.name.clone(),
                    description: product.description.clone(),
                    unit_price: product.price,
                    stock: product.stock,
                    image_path: product.image_path.clone(),
                    quantity: entry.quantity,
                })
            })
            .collect();

        Ok(items)
    }

    /// The cart total at current prices, computed fresh on every call.
    /// Prices are only frozen at checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the product lookup fails.
    pub async fn total(&self, cart: &Cart) -> Result<Price, RepositoryError> {
        Ok(self
            .items(cart)
            .await?
            .iter()
            .map(CartItem::subtotal)
            .sum())
    }

    /// Compare the cart against current stock without mutating anything.
    ///
    /// Used as the pre-checkout gate; an empty result means every entry
    /// currently fits.
    ///
    /// # Errors
    ///
    /// Returns an error if the product lookup fails.
    pub async fn validate_against_stock(
        &self,
        cart: &Cart,
    ) -> Result<Vec<StockConflict>, RepositoryError> {
        if cart.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ProductId> = cart.entries().iter().map(|e| e.product_id).collect();
        let products = self.products.list_by_ids(&ids).await?;

        let conflicts = cart
            .entries()
            .iter()
            .filter_map(|entry| {
                let Some(product) = products.iter().find(|p| p.id == entry.product_id) else {
                    return Some(StockConflict::Missing {
                        product_id: entry.product_id,
                    });
                };
                (entry.quantity > product.stock).then(|| StockConflict::Insufficient {
                    product_id: product.id,
                    name: product.name.clone(),
                    requested: entry.quantity,
                    available: Some(product.stock),
                })
            })
            .collect();

        Ok(conflicts)
    }
}
