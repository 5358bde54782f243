//! In-memory store for tests and local experimentation.
//!
//! A single mutex guards all tables, so `create_order` is atomic the same
//! way the `PostgreSQL` transaction is: every stock check and decrement for
//! one order happens under one critical section, and nothing is applied
//! unless every item fits. Concurrent checkouts against the same product
//! therefore contend exactly as they do against the conditional `UPDATE`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use dragonfruit_core::{Email, OrderId, OrderItemId, OrderStatus, ProductId, RoleSet, UserId};

use super::{CreateOrderError, OrderStore, ProductStore, UserStore};
use crate::db::RepositoryError;
use crate::models::{Order, OrderDetail, OrderDraft, OrderItem, Product, ProductInput, User};

#[derive(Default)]
struct Inner {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    items: BTreeMap<OrderId, Vec<OrderItem>>,
    users: BTreeMap<UserId, User>,
    next_product: i32,
    next_order: i32,
    next_item: i32,
    next_user: i32,
}

/// Shared in-memory store implementing every store trait.
///
/// Cloning is cheap and clones share state, so a test can hand the same
/// store to several services (or tasks).
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a user directly (test fixture).
    pub fn add_user(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
        roles: RoleSet,
        is_active: bool,
    ) -> User {
        let mut inner = self.lock();
        inner.next_user += 1;
        let user = User {
            id: UserId::new(inner.next_user),
            email: email.clone(),
            name: name.to_owned(),
            password_hash: password_hash.to_owned(),
            roles,
            is_active,
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        user
    }
}

impl ProductStore for MemoryStore {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.lock().products.get(&id).cloned())
    }

    async fn list_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.products.get(id).cloned())
            .collect())
    }

    async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let mut inner = self.lock();
        inner.next_product += 1;
        let product = Product {
            id: ProductId::new(inner.next_product),
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            stock: input.stock,
            image_path: input.image_path.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let mut inner = self.lock();
        let product = inner.products.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        product.name = input.name.clone();
        product.description = input.description.clone();
        product.price = input.price;
        product.stock = input.stock;
        product.image_path = input.image_path.clone();
        product.updated_at = Some(Utc::now());
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        match self.lock().products.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}

impl OrderStore for MemoryStore {
    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderDetail, CreateOrderError> {
        let mut inner = self.lock();

        // Conditional decrement per line, all-or-nothing. Decrementing as
        // we go (rather than pre-checking every line) keeps drafts with
        // repeated product lines honest: each line sees the stock left by
        // the previous ones, exactly as the per-line conditional UPDATE
        // does. A failed line undoes every decrement already applied.
        let mut applied: Vec<(ProductId, u32)> = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            let available = inner.products.get(&item.product_id).map_or(0, |p| p.stock);
            if available < item.quantity {
                for (product_id, quantity) in applied {
                    if let Some(product) = inner.products.get_mut(&product_id) {
                        product.stock += quantity;
                    }
                }
                return Err(CreateOrderError::OutOfStock {
                    product_id: item.product_id,
                    name: item.product_name.clone(),
                    requested: item.quantity,
                });
            }
            if let Some(product) = inner.products.get_mut(&item.product_id) {
                product.stock -= item.quantity;
                applied.push((item.product_id, item.quantity));
            }
        }

        inner.next_order += 1;
        let order = Order {
            id: OrderId::new(inner.next_order),
            user_id: draft.user_id,
            customer: draft.customer.clone(),
            total: draft.total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        };

        let items: Vec<OrderItem> = draft
            .items
            .iter()
            .map(|item| {
                inner.next_item += 1;
                OrderItem {
                    id: OrderItemId::new(inner.next_item),
                    order_id: order.id,
                    product_id: item.product_id,
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                }
            })
            .collect();

        inner.orders.insert(order.id, order.clone());
        inner.items.insert(order.id, items.clone());
        Ok(OrderDetail { order, items })
    }

    async fn get(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let inner = self.lock();
        Ok(inner.orders.get(&id).map(|order| OrderDetail {
            order: order.clone(),
            items: inner.items.get(&id).cloned().unwrap_or_default(),
        }))
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.lock();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.user_id == Some(user))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn list_all(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.lock();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        let order = inner.orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        order.status = status;
        order.updated_at = Some(Utc::now());
        Ok(())
    }
}

impl UserStore for MemoryStore {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dragonfruit_core::Price;

    use crate::models::{CustomerDetails, OrderItemDraft};

    async fn seed(store: &MemoryStore, name: &str, cents: i64, stock: u32) -> Product {
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
    }

    fn draft_of(lines: &[(&Product, u32)]) -> OrderDraft {
        OrderDraft {
            user_id: None,
            customer: CustomerDetails::parse(
                "Ada",
                "ada@example.com",
                "+33 1 23 45 67",
                "12 Rue des Fruits",
            )
            .unwrap(),
            total: lines
                .iter()
                .map(|(product, quantity)| product.price.times(*quantity))
                .sum(),
            items: lines
                .iter()
                .map(|(product, quantity)| OrderItemDraft {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    quantity: *quantity,
                    unit_price: product.price,
                })
                .collect(),
        }
    }

    async fn stock_of(store: &MemoryStore, id: ProductId) -> u32 {
        ProductStore::get(store, id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_repeated_lines_for_one_product_cannot_exceed_stock() {
        let store = MemoryStore::new();
        let product = seed(&store, "Dragonfruit", 350, 3).await;

        // Two lines of 2 against stock 3: the second line must fail against
        // the stock the first one left, and the whole draft is rejected.
        let err = store
            .create_order(&draft_of(&[(&product, 2), (&product, 2)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateOrderError::OutOfStock { requested: 2, .. }
        ));

        // Nothing persisted, and the first line's decrement was undone.
        assert_eq!(stock_of(&store, product.id).await, 3);
        assert!(store.list_all(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_lines_that_fit_are_applied_cumulatively() {
        let store = MemoryStore::new();
        let product = seed(&store, "Starfruit", 200, 4).await;

        let detail = store
            .create_order(&draft_of(&[(&product, 2), (&product, 2)]))
            .await
            .unwrap();
        assert_eq!(detail.items.len(), 2);
        assert_eq!(stock_of(&store, product.id).await, 0);
    }

    #[tokio::test]
    async fn test_failed_draft_restores_earlier_lines() {
        let store = MemoryStore::new();
        let plenty = seed(&store, "Passion fruit", 180, 10).await;
        let scarce = seed(&store, "Rambutan", 300, 1).await;

        let err = store
            .create_order(&draft_of(&[(&plenty, 5), (&scarce, 2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateOrderError::OutOfStock { .. }));

        assert_eq!(stock_of(&store, plenty.id).await, 10);
        assert_eq!(stock_of(&store, scarce.id).await, 1);
        assert!(store.list_all(None).await.unwrap().is_empty());
    }
}
