//! Order confirmation email, sent after the transaction commits.
//!
//! Delivery is strictly best-effort: the order exists by the time the
//! notifier runs, so a failure here is logged and reported as a boolean,
//! never propagated. Checkout must not fail because a mailserver is down.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use std::fmt::Write as _;

use dragonfruit_core::Email;

use crate::config::SmtpConfig;
use crate::models::{Order, OrderItem};

/// Sends order confirmations. Implementations must never panic and should
/// swallow their own failures; the return value is only used for logging.
pub trait OrderNotifier {
    /// Notify `to` that `order` was placed. Returns whether delivery was
    /// handed off successfully.
    async fn order_created(&self, order: &Order, items: &[OrderItem], to: &Email) -> bool;
}

/// A notifier that does nothing and reports success. Used in tests and in
/// deployments without an outbound mailserver.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl OrderNotifier for NullNotifier {
    async fn order_created(&self, _order: &Order, _items: &[OrderItem], _to: &Email) -> bool {
        true
    }
}

/// SMTP-backed notifier sending plain-text confirmations.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build a notifier from SMTP configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured host or from-address is invalid.
    pub fn new(config: &SmtpConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().to_owned(),
            ));
        }

        let from = format!("{} <{}>", config.from_name, config.from_address).parse()?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn body(order: &Order, items: &[OrderItem]) -> String {
        let mut body = format!(
            "Hi {},\n\nThank you for your order #{}.\n\n",
            order.customer.name, order.id
        );
        for item in items {
            let _ = writeln!(
                body,
                "  {} x{} @ {} = {}",
                item.product_name,
                item.quantity,
                item.unit_price,
                item.subtotal()
            );
        }
        let _ = write!(
            body,
            "\nTotal: {}\n\nWe will let you know when it ships.\n",
            order.total
        );
        body
    }
}

impl OrderNotifier for SmtpNotifier {
    async fn order_created(&self, order: &Order, items: &[OrderItem], to: &Email) -> bool {
        let to: Mailbox = match to.as_str().parse() {
            Ok(mailbox) => mailbox,
            Err(error) => {
                tracing::warn!(%error, order_id = %order.id, "unroutable recipient address");
                return false;
            }
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("Order confirmation #{}", order.id))
            .body(Self::body(order, items));

        let message = match message {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(%error, order_id = %order.id, "failed to build confirmation email");
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => true,
            Err(error) => {
                tracing::warn!(%error, order_id = %order.id, "failed to send confirmation email");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dragonfruit_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId};

    use crate::models::CustomerDetails;

    #[test]
    fn test_body_lists_items_and_total() {
        let order = Order {
            id: OrderId::new(7),
            user_id: None,
            customer: CustomerDetails::parse(
                "Ada",
                "ada@example.com",
                "+33 1 23 45 67",
                "12 Rue des Fruits",
            )
            .unwrap(),
            total: Price::from_minor_units(700),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        };
        let items = vec![OrderItem {
            id: OrderItemId::new(1),
            order_id: order.id,
            product_id: ProductId::new(3),
            product_name: "Dragonfruit".to_owned(),
            quantity: 2,
            unit_price: Price::from_minor_units(350),
        }];

        let body = SmtpNotifier::body(&order, &items);
        assert!(body.contains("order #7"));
        assert!(body.contains("Dragonfruit x2 @ 3.50 = 7.00"));
        assert!(body.contains("Total: 7.00"));
    }
}
