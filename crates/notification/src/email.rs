//! Confirmation emails over SMTP.

use domain::{Channel, NotificationError, OrderResponse};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{AsyncSmtpTransportBuilder, authentication::Credentials},
};
use store::Customer;

use crate::config::{SmtpConfig, SmtpTls};

/// Sends order confirmations through an authenticated SMTP relay.
pub struct SmtpEmailChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpEmailChannel {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let transport = transport_builder(config)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    /// Sends the confirmation for `order` to the customer's email address.
    pub async fn send(
        &self,
        customer: &Customer,
        order: &OrderResponse,
    ) -> Result<(), NotificationError> {
        let email = build_message(&self.from, &customer.email, &customer.full_name(), order)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| delivery_error(format!("SMTP send failed: {e}")))?;

        Ok(())
    }
}

fn transport_builder(
    config: &SmtpConfig,
) -> Result<AsyncSmtpTransportBuilder, NotificationError> {
    let builder = match config.tls {
        SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host),
        SmtpTls::Wrapper => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host),
    };
    builder.map_err(|e| invalid_config(format!("SMTP relay {}: {e}", config.host)))
}

/// Subject line of the confirmation email.
pub fn subject(order: &OrderResponse) -> String {
    format!("Order Confirmation - {}", order.order_number)
}

/// Plain-text body of the confirmation email.
pub fn body(customer_name: &str, order: &OrderResponse) -> String {
    format!(
        "Dear {},\n\n\
         Thank you for your order.\n\n\
         \tOrder Details:\n\
         \t- Order Number: {}\n\
         \t- Total Amount: {}\n\
         \t- Status: {}\n\
         \t- Date: {}\n",
        customer_name,
        order.order_number,
        order.total_amount,
        order.status,
        order.created_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

fn build_message(
    from: &str,
    to: &str,
    customer_name: &str,
    order: &OrderResponse,
) -> Result<Message, NotificationError> {
    Message::builder()
        .from(
            from.parse()
                .map_err(|e| invalid_config(format!("invalid from address {from}: {e}")))?,
        )
        .to(to
            .parse()
            .map_err(|e| NotificationError::Recipient(format!("invalid email {to}: {e}")))?)
        .subject(subject(order))
        .header(ContentType::TEXT_PLAIN)
        .body(body(customer_name, order))
        .map_err(|e| delivery_error(format!("failed to build email: {e}")))
}

fn invalid_config(reason: String) -> NotificationError {
    NotificationError::InvalidConfig {
        channel: Channel::Email,
        reason,
    }
}

fn delivery_error(reason: String) -> NotificationError {
    NotificationError::Delivery {
        channel: Channel::Email,
        reason,
    }
}
