//! Catalog administration: product create, update and delete.
//!
//! All mutations require the admin role. Reads go straight through the
//! product store; browsing the catalog needs no authorization.

use thiserror::Error;

use dragonfruit_core::{ProductId, Role};

use crate::auth::{AccessError, AuthContext, require_role};
use crate::db::RepositoryError;
use crate::models::{Product, ProductInput};
use crate::store::ProductStore;

/// Why a catalog operation failed.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The caller is not allowed to perform the operation.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// No such product.
    #[error("product not found")]
    NotFound,

    /// Storage failure.
    #[error("database error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for CatalogError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

/// Admin-gated catalog mutations over a [`ProductStore`].
#[derive(Clone)]
pub struct CatalogService<P> {
    products: P,
}

impl<P: ProductStore> CatalogService<P> {
    /// Create a catalog service over a product store.
    pub const fn new(products: P) -> Self {
        Self { products }
    }

    /// Fetch a product. No authorization required.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] when no such product exists.
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products.get(id).await?.ok_or(CatalogError::NotFound)
    }

    /// Create a product. Admin only.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Access`] unless the caller is an admin.
    pub async fn create(
        &self,
        ctx: &AuthContext,
        input: &ProductInput,
    ) -> Result<Product, CatalogError> {
        require_role(ctx, Role::Admin)?;
        let product = self.products.create(input).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    /// Replace a product's fields, including a direct stock edit. Admin
    /// only.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Access`] unless the caller is an admin;
    /// [`CatalogError::NotFound`] when no such product exists.
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, CatalogError> {
        require_role(ctx, Role::Admin)?;
        let product = self.products.update(id, input).await?;
        tracing::info!(product_id = %id, "product updated");
        Ok(product)
    }

    /// Delete a product. Admin only.
    ///
    /// Existing order items keep their name and price snapshot; only the
    /// live catalog entry goes away.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Access`] unless the caller is an admin;
    /// [`CatalogError::NotFound`] when no such product exists.
    pub async fn delete(&self, ctx: &AuthContext, id: ProductId) -> Result<(), CatalogError> {
        require_role(ctx, Role::Admin)?;
        self.products.delete(id).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dragonfruit_core::{Price, RoleSet, UserId};

    use crate::store::MemoryStore;

    fn admin_ctx() -> AuthContext {
        AuthContext::user(UserId::new(9), RoleSet::admin())
    }

    fn customer_ctx() -> AuthContext {
        AuthContext::user(UserId::new(1), RoleSet::user())
    }

    fn input(name: &str, cents: i64, stock: u32) -> ProductInput {
        ProductInput {
            name: name.to_owned(),
            description: Some("fresh".to_owned()),
            price: Price::from_minor_units(cents),
            stock,
            image_path: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let service = CatalogService::new(MemoryStore::new());

        let err = service
            .create(&customer_ctx(), &input("Dragonfruit", 350, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Access(AccessError::Forbidden)));

        let err = service
            .create(&AuthContext::anonymous(), &input("Dragonfruit", 350, 10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Access(AccessError::Unauthenticated)
        ));

        let product = service
            .create(&admin_ctx(), &input("Dragonfruit", 350, 10))
            .await
            .unwrap();
        assert_eq!(product.name, "Dragonfruit");
        assert_eq!(product.stock, 10);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let service = CatalogService::new(MemoryStore::new());
        let admin = admin_ctx();
        let product = service
            .create(&admin, &input("Starfruit", 200, 5))
            .await
            .unwrap();

        let updated = service
            .update(&admin, product.id, &input("Starfruit", 250, 12))
            .await
            .unwrap();
        assert_eq!(updated.price, Price::from_minor_units(250));
        assert_eq!(updated.stock, 12);

        let err = service
            .update(&admin, ProductId::new(404), &input("X", 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_gated_and_missing() {
        let service = CatalogService::new(MemoryStore::new());
        let admin = admin_ctx();
        let product = service.create(&admin, &input("Fig", 250, 3)).await.unwrap();

        let err = service.delete(&customer_ctx(), product.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::Access(AccessError::Forbidden)));

        service.delete(&admin, product.id).await.unwrap();
        let err = service.get(product.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));

        let err = service.delete(&admin, product.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));
    }
}
