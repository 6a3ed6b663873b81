//! Composition of the email and SMS channels behind `OrderNotifier`.

use async_trait::async_trait;
use domain::{Channel, NotificationError, OrderNotifier, OrderResponse};
use store::{Customer, DynCustomerDirectory};

use crate::config::{SmsConfig, SmtpConfig};
use crate::email::SmtpEmailChannel;
use crate::sms::HttpSmsChannel;

/// Looks up the customer's email and phone and sends through whichever
/// channels are configured. An absent channel reports `NotConfigured`.
pub struct ChannelNotifier {
    customers: DynCustomerDirectory,
    email: Option<SmtpEmailChannel>,
    sms: Option<HttpSmsChannel>,
}

impl ChannelNotifier {
    pub fn new(
        customers: DynCustomerDirectory,
        email: Option<SmtpEmailChannel>,
        sms: Option<HttpSmsChannel>,
    ) -> Self {
        Self {
            customers,
            email,
            sms,
        }
    }

    /// Builds the notifier from optional channel settings.
    pub fn from_config(
        customers: DynCustomerDirectory,
        smtp: Option<&SmtpConfig>,
        sms: Option<SmsConfig>,
    ) -> Result<Self, NotificationError> {
        let email = smtp.map(SmtpEmailChannel::new).transpose()?;
        let sms = sms.map(HttpSmsChannel::new).transpose()?;

        tracing::info!(
            email = email.is_some(),
            sms = sms.is_some(),
            "notification channels configured"
        );

        Ok(Self::new(customers, email, sms))
    }

    async fn recipient(&self, order: &OrderResponse) -> Result<Customer, NotificationError> {
        self.customers
            .get_customer(order.customer_id)
            .await
            .map_err(|e| {
                NotificationError::Recipient(format!(
                    "failed to get customer {}: {e}",
                    order.customer_id
                ))
            })
    }
}

#[async_trait]
impl OrderNotifier for ChannelNotifier {
    async fn send_email(&self, order: &OrderResponse) -> Result<(), NotificationError> {
        let channel = self
            .email
            .as_ref()
            .ok_or(NotificationError::NotConfigured(Channel::Email))?;
        let customer = self.recipient(order).await?;

        channel.send(&customer, order).await
    }

    async fn send_sms(&self, order: &OrderResponse) -> Result<(), NotificationError> {
        let channel = self
            .sms
            .as_ref()
            .ok_or(NotificationError::NotConfigured(Channel::Sms))?;
        let customer = self.recipient(order).await?;
        let phone = customer.phone.filter(|p| !p.trim().is_empty()).ok_or_else(|| {
            NotificationError::Recipient(format!(
                "customer {} has no phone number",
                customer.customer_id
            ))
        })?;

        channel.send(&phone, order).await
    }
}
