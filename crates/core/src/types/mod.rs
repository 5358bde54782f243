//! Shared newtype wrappers and closed enums.

pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{OrderId, OrderItemId, ProductId, UserId};
pub use price::Price;
pub use role::{Role, RoleError, RoleSet};
pub use status::{InvalidStatus, OrderStatus};
