//! Order repository.
//!
//! `create_order` is the checkout transaction: order insert, item snapshot
//! inserts, and conditional stock decrements commit together or not at all.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use dragonfruit_core::{Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

use super::products::decrement_stock_if_available;
use super::{RepositoryError, db_count, domain_count};
use crate::models::{CustomerDetails, Order, OrderDetail, OrderDraft, OrderItem};
use crate::store::{CreateOrderError, OrderStore};

const ORDER_COLUMNS: &str = "id, user_id, customer_name, customer_email, phone, address, \
                             total, status, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, price";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<UserId>,
    customer_name: String,
    customer_email: Email,
    phone: String,
    address: String,
    total: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            customer: CustomerDetails {
                name: row.customer_name,
                email: row.customer_email,
                phone: row.phone,
                address: row.address,
            },
            total: row.total,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    price: Price,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: domain_count(row.quantity)?,
            unit_price: row.price,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderDetail, CreateOrderError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::Database)?;

        let order_row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO orders
                 (user_id, customer_name, customer_email, phone, address, total, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, 'pending', now())
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(draft.user_id)
        .bind(&draft.customer.name)
        .bind(&draft.customer.email)
        .bind(&draft.customer.phone)
        .bind(&draft.customer.address)
        .bind(draft.total)
        .fetch_one(&mut *tx)
        .await?;

        let order: Order = order_row.into();
        let mut items = Vec::with_capacity(draft.items.len());

        for item in &draft.items {
            let item_row: OrderItemRow = sqlx::query_as(&format!(
                "INSERT INTO order_items (order_id, product_id, product_name, quantity, price)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING {ITEM_COLUMNS}"
            ))
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(db_count(item.quantity)?)
            .bind(item.unit_price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(OrderItem::try_from(item_row)?);

            // Stock had fallen below the requested quantity since the cart
            // was validated (e.g. a concurrent checkout consumed it).
            if !decrement_stock_if_available(&mut *tx, item.product_id, item.quantity).await? {
                tx.rollback().await.map_err(RepositoryError::Database)?;
                return Err(CreateOrderError::OutOfStock {
                    product_id: item.product_id,
                    name: item.product_name.clone(),
                    requested: item.quantity,
                });
            }
        }

        tx.commit().await.map_err(RepositoryError::Database)?;
        Ok(OrderDetail { order, items })
    }

    async fn get(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows: Vec<OrderItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            order: row.into(),
            items: item_rows
                .into_iter()
                .map(OrderItem::try_from)
                .collect::<Result<_, _>>()?,
        }))
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn list_all(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = match status {
            Some(status) => {
                sqlx::query_as(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 \
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(status)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
