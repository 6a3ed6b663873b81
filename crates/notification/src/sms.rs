//! Confirmation texts through an HTTP SMS gateway.

use domain::{Channel, NotificationError, OrderResponse};
use reqwest::Client;
use serde::Serialize;

use crate::config::SmsConfig;

#[derive(Serialize)]
struct SmsForm<'a> {
    username: &'a str,
    to: &'a str,
    message: &'a str,
    from: &'a str,
}

/// Posts order confirmations to a bulk SMS gateway.
pub struct HttpSmsChannel {
    client: Client,
    config: SmsConfig,
}

impl HttpSmsChannel {
    pub fn new(config: SmsConfig) -> Result<Self, NotificationError> {
        let required = [
            ("gateway URL", &config.gateway_url),
            ("API key", &config.api_key),
            ("username", &config.username),
            ("sender ID", &config.sender_id),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(NotificationError::InvalidConfig {
                channel: Channel::Sms,
                reason: format!("{name} is required"),
            });
        }

        Ok(Self {
            client: Client::new(),
            config,
        })
    }

    /// Sends the confirmation for `order` to the phone number `to`.
    pub async fn send(&self, to: &str, order: &OrderResponse) -> Result<(), NotificationError> {
        let text = message(order);
        let form = SmsForm {
            username: &self.config.username,
            to,
            message: &text,
            from: &self.config.sender_id,
        };

        let response = self
            .client
            .post(&self.config.gateway_url)
            .header("apiKey", &self.config.api_key)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| delivery_error(format!("SMS gateway request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(delivery_error(format!(
                "SMS gateway error: {status} - {body}"
            )));
        }

        Ok(())
    }
}

/// Text of the confirmation SMS.
pub fn message(order: &OrderResponse) -> String {
    format!(
        "Order {} confirmed! Total: {}. Status: {}. Thank you for shopping with us!",
        order.order_number, order.total_amount, order.status
    )
}

fn delivery_error(reason: String) -> NotificationError {
    NotificationError::Delivery {
        channel: Channel::Sms,
        reason,
    }
}
