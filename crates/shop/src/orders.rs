//! Order retrieval and administration, behind the authorization guard.
//!
//! Every operation takes the caller's [`AuthContext`] and applies the
//! guard before touching storage, except the single-order fetch which
//! looks the order up first so the owner check can see who owns it. The
//! not-found and forbidden outcomes stay distinct error variants; hosts
//! that want to hide existence can collapse them at the edge.

use thiserror::Error;

use dragonfruit_core::{InvalidStatus, OrderId, OrderStatus, Role, UserId};

use crate::auth::{AccessError, AuthContext, require_authenticated, require_owner_or_role, require_role};
use crate::db::RepositoryError;
use crate::models::{Order, OrderDetail};
use crate::store::OrderStore;

/// Why an order operation failed.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The caller is not allowed to perform the operation.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// No such order.
    #[error("order not found")]
    NotFound,

    /// The submitted status is not one of the known values.
    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatus),

    /// Storage failure.
    #[error("database error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for OrderError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

/// Order queries and the admin status transition.
#[derive(Clone)]
pub struct OrderService<O> {
    orders: O,
}

impl<O: OrderStore> OrderService<O> {
    /// Create an order service over an order store.
    pub const fn new(orders: O) -> Self {
        Self { orders }
    }

    /// Fetch one order with its items.
    ///
    /// Visible to its owner and to admins. Guest orders have no owner on
    /// record, so only admins can retrieve them.
    ///
    /// # Errors
    ///
    /// [`OrderError::Access`] when the caller is anonymous or neither
    /// owner nor admin; [`OrderError::NotFound`] when no such order
    /// exists.
    pub async fn get(&self, ctx: &AuthContext, id: OrderId) -> Result<OrderDetail, OrderError> {
        require_authenticated(ctx)?;

        let detail = self.orders.get(id).await?.ok_or(OrderError::NotFound)?;
        require_owner_or_role(ctx, detail.order.user_id, Role::Admin)?;
        Ok(detail)
    }

    /// The caller's own order history, newest first.
    ///
    /// # Errors
    ///
    /// [`OrderError::Access`] when anonymous.
    pub async fn list_mine(&self, ctx: &AuthContext) -> Result<Vec<Order>, OrderError> {
        let user_id = require_authenticated(ctx)?;
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// A specific user's orders, newest first. Admin only.
    ///
    /// # Errors
    ///
    /// [`OrderError::Access`] unless the caller is an admin.
    pub async fn list_for_user(
        &self,
        ctx: &AuthContext,
        user: UserId,
    ) -> Result<Vec<Order>, OrderError> {
        require_role(ctx, Role::Admin)?;
        Ok(self.orders.list_for_user(user).await?)
    }

    /// All orders, newest first, optionally filtered by status. Admin only.
    ///
    /// # Errors
    ///
    /// [`OrderError::Access`] unless the caller is an admin.
    pub async fn list_all(
        &self,
        ctx: &AuthContext,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError> {
        require_role(ctx, Role::Admin)?;
        Ok(self.orders.list_all(status).await?)
    }

    /// Set an order's status from raw input. Admin only.
    ///
    /// Any known status may replace any other; the lifecycle deliberately
    /// allows corrections in both directions (for example back from
    /// `shipped` to `processing` after a mislabelled parcel).
    ///
    /// # Errors
    ///
    /// [`OrderError::Access`] unless the caller is an admin;
    /// [`OrderError::InvalidStatus`] for an unknown status string;
    /// [`OrderError::NotFound`] when no such order exists.
    pub async fn set_status(
        &self,
        ctx: &AuthContext,
        id: OrderId,
        status: &str,
    ) -> Result<OrderStatus, OrderError> {
        require_role(ctx, Role::Admin)?;

        let status: OrderStatus = status.parse()?;
        self.orders.set_status(id, status).await?;
        tracing::info!(order_id = %id, %status, "order status updated");
        Ok(status)
    }
}
