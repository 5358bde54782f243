//! Checkout: turn a cart into a persisted order, exactly once.
//!
//! The flow is snapshot-then-commit. Names, unit prices and the total are
//! frozen from the catalog before the transaction; the transaction itself
//! re-checks stock with a conditional decrement per item, so two shoppers
//! racing for the last unit cannot both win. Only after the order commits
//! is the cart cleared and the confirmation email attempted.

use thiserror::Error;

use dragonfruit_core::{Price, UserId};

use crate::cart::{CartService, StockConflict};
use crate::db::RepositoryError;
use crate::models::{Cart, CartItem, CustomerDetails, FieldError, OrderDetail, OrderDraft, OrderItemDraft};
use crate::notify::OrderNotifier;
use crate::store::{CreateOrderError, OrderStore, ProductStore};

/// Raw checkout form input, validated into [`CustomerDetails`].
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Why a checkout attempt was rejected.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no entries.
    #[error("your cart is empty")]
    EmptyCart,

    /// One or more form fields failed validation.
    #[error("invalid checkout details")]
    Validation(Vec<FieldError>),

    /// Stock could not cover the cart, either at the pre-check or inside
    /// the transaction. Nothing was persisted.
    #[error("{}", format_conflicts(conflicts))]
    InsufficientStock { conflicts: Vec<StockConflict> },

    /// Storage failure; the order transaction was rolled back.
    #[error("your order could not be processed, please try again")]
    Storage(#[source] RepositoryError),
}

fn format_conflicts(conflicts: &[StockConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The checkout coordinator.
///
/// Generic over the product store, order store and notifier so the whole
/// pipeline runs against in-memory fakes in tests.
#[derive(Clone)]
pub struct CheckoutService<P, O, N> {
    carts: CartService<P>,
    orders: O,
    notifier: N,
}

impl<P, O, N> CheckoutService<P, O, N>
where
    P: ProductStore,
    O: OrderStore,
    N: OrderNotifier,
{
    /// Assemble the coordinator from its collaborators.
    pub const fn new(carts: CartService<P>, orders: O, notifier: N) -> Self {
        Self { carts, orders, notifier }
    }

    /// Place an order from the cart.
    ///
    /// On success the order is persisted with status `pending`, stock is
    /// decremented, the cart is cleared, and a confirmation email is
    /// attempted (best-effort; a mail failure is only logged). On any
    /// error the cart is left untouched and nothing is persisted.
    ///
    /// `user` attributes the order to a signed-in customer; `None` places
    /// a guest order.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`], [`CheckoutError::Validation`],
    /// [`CheckoutError::InsufficientStock`], or [`CheckoutError::Storage`].
    pub async fn place_order(
        &self,
        cart: &mut Cart,
        form: &CheckoutForm,
        user: Option<UserId>,
    ) -> Result<OrderDetail, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let customer = CustomerDetails::parse(&form.name, &form.email, &form.phone, &form.address)
            .map_err(CheckoutError::Validation)?;

        // Friendly pre-check: catch conflicts with full availability detail
        // before opening a transaction. The decrement below remains the
        // authoritative check.
        let conflicts = self
            .carts
            .validate_against_stock(cart)
            .await
            .map_err(CheckoutError::Storage)?;
        if !conflicts.is_empty() {
            return Err(CheckoutError::InsufficientStock { conflicts });
        }

        let items = self.carts.items(cart).await.map_err(CheckoutError::Storage)?;
        let draft = OrderDraft {
            user_id: user,
            customer,
            total: items.iter().map(CartItem::subtotal).sum::<Price>(),
            items: items
                .iter()
                .map(|item| OrderItemDraft {
                    product_id: item.product_id,
                    product_name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
        };

        let detail = self.orders.create_order(&draft).await.map_err(|e| match e {
            CreateOrderError::OutOfStock {
                product_id,
                name,
                requested,
            } => CheckoutError::InsufficientStock {
                conflicts: vec![StockConflict::Insufficient {
                    product_id,
                    name,
                    requested,
                    available: None,
                }],
            },
            CreateOrderError::Storage(e) => CheckoutError::Storage(e),
        })?;

        cart.clear();

        tracing::info!(
            order_id = %detail.order.id,
            total = %detail.order.total,
            items = detail.items.len(),
            "order placed"
        );

        let delivered = self
            .notifier
            .order_created(&detail.order, &detail.items, &detail.order.customer.email)
            .await;
        if !delivered {
            tracing::warn!(order_id = %detail.order.id, "confirmation email not delivered");
        }

        Ok(detail)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dragonfruit_core::{OrderStatus, ProductId};

    use crate::models::ProductInput;
    use crate::notify::NullNotifier;
    use crate::store::{MemoryStore, OrderStore, ProductStore};

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "+33 1 23 45 67".to_owned(),
            address: "12 Rue des Fruits, Paris".to_owned(),
        }
    }

    async fn seed(store: &MemoryStore, name: &str, cents: i64, stock: u32) -> ProductId {
        store
            .create(&ProductInput {
                name: name.to_owned(),
                description: None,
                price: Price::from_minor_units(cents),
                stock,
                image_path: None,
            })
            .await
            .unwrap()
            .id
    }

    fn service(store: &MemoryStore) -> CheckoutService<MemoryStore, MemoryStore, NullNotifier> {
        CheckoutService::new(CartService::new(store.clone()), store.clone(), NullNotifier)
    }

    async fn stock(store: &MemoryStore, id: ProductId) -> u32 {
        ProductStore::get(store, id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_happy_path_persists_order_and_clears_cart() {
        let store = MemoryStore::new();
        let p1 = seed(&store, "Dragonfruit", 350, 10).await;
        let p2 = seed(&store, "Starfruit", 200, 5).await;
        let carts = CartService::new(store.clone());
        let checkout = service(&store);

        let mut cart = Cart::new();
        carts.add(&mut cart, p1, 2).await.unwrap();
        carts.add(&mut cart, p2, 1).await.unwrap();

        let detail = checkout.place_order(&mut cart, &form(), None).await.unwrap();

        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.order.total, Price::from_minor_units(900));
        assert_eq!(detail.items.len(), 2);
        assert!(cart.is_empty());

        // Stock came down and the order reads back intact.
        assert_eq!(stock(&store, p1).await, 8);
        assert_eq!(stock(&store, p2).await, 4);
        let read_back = OrderStore::get(&store, detail.order.id).await.unwrap().unwrap();
        assert_eq!(read_back, detail);
    }

    #[tokio::test]
    async fn test_total_is_sum_of_frozen_subtotals() {
        let store = MemoryStore::new();
        let p1 = seed(&store, "Kiwi", 199, 10).await;
        let carts = CartService::new(store.clone());
        let checkout = service(&store);

        let mut cart = Cart::new();
        carts.add(&mut cart, p1, 3).await.unwrap();
        let detail = checkout.place_order(&mut cart, &form(), None).await.unwrap();

        let items_sum: Price = detail.items.iter().map(crate::models::OrderItem::subtotal).sum();
        assert_eq!(detail.order.total, items_sum);
        assert_eq!(detail.order.total, Price::from_minor_units(597));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let store = MemoryStore::new();
        let checkout = service(&store);
        let err = checkout
            .place_order(&mut Cart::new(), &form(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_invalid_form_keeps_cart_and_stock() {
        let store = MemoryStore::new();
        let p1 = seed(&store, "Mango", 110, 5).await;
        let carts = CartService::new(store.clone());
        let checkout = service(&store);

        let mut cart = Cart::new();
        carts.add(&mut cart, p1, 2).await.unwrap();

        let bad = CheckoutForm {
            email: "not-an-email".to_owned(),
            ..form()
        };
        let err = checkout.place_order(&mut cart, &bad, None).await.unwrap_err();
        let CheckoutError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].field, "email");

        assert_eq!(cart.quantity_of(p1), 2);
        assert_eq!(stock(&store, p1).await, 5);
    }

    #[tokio::test]
    async fn test_stale_cart_is_rejected_with_conflicts() {
        let store = MemoryStore::new();
        let p1 = seed(&store, "Durian", 800, 5).await;
        let carts = CartService::new(store.clone());
        let checkout = service(&store);

        let mut cart = Cart::new();
        carts.add(&mut cart, p1, 4).await.unwrap();

        // Stock shrinks after the cart was filled.
        store
            .update(
                p1,
                &ProductInput {
                    name: "Durian".to_owned(),
                    description: None,
                    price: Price::from_minor_units(800),
                    stock: 1,
                    image_path: None,
                },
            )
            .await
            .unwrap();

        let err = checkout.place_order(&mut cart, &form(), None).await.unwrap_err();
        let CheckoutError::InsufficientStock { conflicts } = err else {
            panic!("expected stock conflict");
        };
        assert_eq!(conflicts.len(), 1);

        // Cart untouched, nothing persisted, stock unchanged.
        assert_eq!(cart.quantity_of(p1), 4);
        assert_eq!(stock(&store, p1).await, 1);
        assert!(store.list_all(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guest_and_attributed_orders() {
        let store = MemoryStore::new();
        let p1 = seed(&store, "Fig", 250, 10).await;
        let carts = CartService::new(store.clone());
        let checkout = service(&store);

        let mut cart = Cart::new();
        carts.add(&mut cart, p1, 1).await.unwrap();
        let guest = checkout.place_order(&mut cart, &form(), None).await.unwrap();
        assert_eq!(guest.order.user_id, None);

        carts.add(&mut cart, p1, 1).await.unwrap();
        let owner = UserId::new(42);
        let attributed = checkout
            .place_order(&mut cart, &form(), Some(owner))
            .await
            .unwrap();
        assert_eq!(attributed.order.user_id, Some(owner));
    }

    #[tokio::test]
    async fn test_snapshot_survives_later_product_deletion() {
        let store = MemoryStore::new();
        let p1 = seed(&store, "Lychee", 90, 3).await;
        let carts = CartService::new(store.clone());
        let checkout = service(&store);

        let mut cart = Cart::new();
        carts.add(&mut cart, p1, 2).await.unwrap();
        let detail = checkout.place_order(&mut cart, &form(), None).await.unwrap();

        store.delete(p1).await.unwrap();

        let read_back = OrderStore::get(&store, detail.order.id).await.unwrap().unwrap();
        assert_eq!(read_back.items[0].product_name, "Lychee");
        assert_eq!(read_back.items[0].unit_price, Price::from_minor_units(90));
    }
}
