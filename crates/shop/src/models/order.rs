//! Order domain types.
//!
//! An order is immutable once created except for `status` and `updated_at`.
//! Its items carry the product name and unit price frozen at purchase time,
//! so later catalog edits or deletions never alter order history.

use chrono::{DateTime, Utc};

use dragonfruit_core::{Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user, or `None` for guest checkout.
    pub user_id: Option<UserId>,
    /// Contact details captured at checkout, independent of any profile.
    pub customer: CustomerDetails,
    /// Server-computed total; always equals the sum of item subtotals.
    pub total: Price,
    /// Lifecycle status; the only mutable field.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the status last changed; `None` until the first change.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A line item of a persisted order.
///
/// `product_id` is a soft reference: the product may be edited or deleted
/// later without affecting this snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub product_name: String,
    pub quantity: u32,
    /// Unit price at purchase time.
    pub unit_price: Price,
}

impl OrderItem {
    /// Line subtotal at the frozen unit price.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// An order together with its items, as read back for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Everything the order store needs to persist a new order atomically.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: Option<UserId>,
    pub customer: CustomerDetails,
    /// Computed server-side from the item snapshots, never client input.
    pub total: Price,
    pub items: Vec<OrderItemDraft>,
}

/// A cart line frozen for persistence.
#[derive(Debug, Clone)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Price,
}

/// A single failed field from customer detail validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validated customer contact details for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
}

impl CustomerDetails {
    /// Minimum accepted phone number length.
    pub const MIN_PHONE_LENGTH: usize = 8;

    /// Validate raw form input into customer details.
    ///
    /// All fields are required; the email must be structurally valid and
    /// the phone number at least [`Self::MIN_PHONE_LENGTH`] characters.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per failing field, so a form can show
    /// them all at once.
    pub fn parse(
        name: &str,
        email: &str,
        phone: &str,
        address: &str,
    ) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = name.trim();
        if name.is_empty() {
            errors.push(FieldError {
                field: "name",
                message: "Name is required".to_owned(),
            });
        }

        let email = match Email::parse(email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push(FieldError {
                    field: "email",
                    message: e.to_string(),
                });
                None
            }
        };

        let phone = phone.trim();
        if phone.len() < Self::MIN_PHONE_LENGTH {
            errors.push(FieldError {
                field: "phone",
                message: format!(
                    "Phone number must be at least {} characters",
                    Self::MIN_PHONE_LENGTH
                ),
            });
        }

        let address = address.trim();
        if address.is_empty() {
            errors.push(FieldError {
                field: "address",
                message: "Address is required".to_owned(),
            });
        }

        match email {
            Some(email) if errors.is_empty() => Ok(Self {
                name: name.to_owned(),
                email,
                phone: phone.to_owned(),
                address: address.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_details() {
        let details = CustomerDetails::parse(
            "Ada Lovelace",
            "ada@example.com",
            "+33 1 23 45 67",
            "12 Rue des Fruits, Paris",
        )
        .unwrap();
        assert_eq!(details.name, "Ada Lovelace");
        assert_eq!(details.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_parse_collects_all_failures() {
        let errors = CustomerDetails::parse("", "not-an-email", "123", "").unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "email", "phone", "address"]);
    }

    #[test]
    fn test_parse_rejects_short_phone() {
        let errors =
            CustomerDetails::parse("Ada", "ada@example.com", "1234567", "Somewhere").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "phone");
    }

    #[test]
    fn test_parse_trims_fields() {
        let details =
            CustomerDetails::parse("  Ada  ", " ada@example.com ", " 12345678 ", " Home ").unwrap();
        assert_eq!(details.name, "Ada");
        assert_eq!(details.address, "Home");
    }
}
