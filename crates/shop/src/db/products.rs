//! Product repository.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use dragonfruit_core::{Price, ProductId};

use super::{RepositoryError, db_count, domain_count};
use crate::models::{Product, ProductInput};
use crate::store::ProductStore;

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, image_path, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Price,
    stock: i32,
    image_path: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: domain_count(row.stock)?,
            image_path: row.image_path,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl ProductStore for ProductRepository<'_> {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }

    async fn list_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            "INSERT INTO products (name, description, price, stock, image_path, created_at)
             VALUES ($1, $2, $3, $4, $5, now())
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(db_count(input.stock)?)
        .bind(&input.image_path)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "UPDATE products
             SET name = $2, description = $3, price = $4, stock = $5, image_path = $6,
                 updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(db_count(input.stock)?)
        .bind(&input.image_path)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Atomically decrement `stock` by `quantity` only if enough remains.
///
/// This is the single arbiter against overselling: the check and the write
/// are one conditional `UPDATE`, so under concurrent checkouts only writers
/// that still observe sufficient stock succeed. Returns `false` when stock
/// had already fallen below `quantity` (zero rows affected).
///
/// Callable inside an open transaction via its executor.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn decrement_stock_if_available<'e, E: PgExecutor<'e>>(
    executor: E,
    id: ProductId,
    quantity: u32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
        .bind(id)
        .bind(db_count(quantity)?)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
