//! Domain types.
//!
//! These are validated domain objects, separate from database row types;
//! the [`crate::db`] repositories convert at the boundary.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartEntry, CartItem};
pub use order::{
    CustomerDetails, FieldError, Order, OrderDetail, OrderDraft, OrderItem, OrderItemDraft,
};
pub use product::{Product, ProductInput};
pub use user::User;
