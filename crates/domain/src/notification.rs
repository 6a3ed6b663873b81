//! Best-effort order notifications.
//!
//! Checkout hands each completed order to a [`NotificationDispatcher`], which
//! attempts one email and one SMS. Failures are logged and counted, never
//! returned: a purchase succeeds whether or not the customer hears about it.
//! Delivery is at-most-once with no retry.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::schema::OrderResponse;

/// A delivery channel for order notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a notification channel can report.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The channel has no credentials or endpoint configured.
    #[error("{0} channel is not configured")]
    NotConfigured(Channel),

    /// The channel's configuration was rejected.
    #[error("invalid {channel} configuration: {reason}")]
    InvalidConfig { channel: Channel, reason: String },

    /// The customer's contact details could not be resolved.
    #[error("recipient unavailable: {0}")]
    Recipient(String),

    /// The provider rejected or failed the delivery.
    #[error("{channel} delivery failed: {reason}")]
    Delivery { channel: Channel, reason: String },
}

/// Sends notifications describing a completed order.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn send_email(&self, order: &OrderResponse) -> Result<(), NotificationError>;

    async fn send_sms(&self, order: &OrderResponse) -> Result<(), NotificationError>;
}

/// Whether checkout waits for notification attempts before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Attempts run on a spawned task; checkout returns immediately.
    #[default]
    Background,
    /// Attempts run before checkout returns. Failures are still swallowed.
    Inline,
}

impl std::str::FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "background" => Ok(DispatchMode::Background),
            "inline" => Ok(DispatchMode::Inline),
            other => Err(format!("unknown notification mode: {other}")),
        }
    }
}

/// Runs notification attempts for completed orders, isolating their failures.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn OrderNotifier>,
    mode: DispatchMode,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn OrderNotifier>, mode: DispatchMode) -> Self {
        Self { notifier, mode }
    }

    /// Attempts email then SMS for `order` according to the dispatch mode.
    pub async fn dispatch(&self, order: OrderResponse) {
        match self.mode {
            DispatchMode::Inline => deliver(self.notifier.as_ref(), &order).await,
            DispatchMode::Background => {
                self.spawn(order);
            }
        }
    }

    /// Spawns the attempts on the runtime and returns the task handle.
    pub fn spawn(&self, order: OrderResponse) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        tokio::spawn(async move { deliver(notifier.as_ref(), &order).await })
    }
}

async fn deliver(notifier: &dyn OrderNotifier, order: &OrderResponse) {
    record(Channel::Email, order, notifier.send_email(order).await);
    record(Channel::Sms, order, notifier.send_sms(order).await);
}

fn record(channel: Channel, order: &OrderResponse, result: Result<(), NotificationError>) {
    match result {
        Ok(()) => {
            metrics::counter!("notifications_sent_total", "channel" => channel.as_str())
                .increment(1);
            tracing::info!(
                channel = channel.as_str(),
                order_id = %order.order_id,
                order_number = %order.order_number,
                "order notification sent"
            );
        }
        Err(error) => {
            metrics::counter!("notification_failures_total", "channel" => channel.as_str())
                .increment(1);
            tracing::warn!(
                channel = channel.as_str(),
                order_id = %order.order_id,
                order_number = %order.order_number,
                %error,
                "order notification failed"
            );
        }
    }
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    emails: Vec<OrderResponse>,
    sms: Vec<OrderResponse>,
    fail_email: bool,
    fail_sms: bool,
}

/// In-memory notifier for testing. Records every successful send.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the email channel to fail.
    pub fn set_fail_email(&self, fail: bool) {
        self.state.write().unwrap().fail_email = fail;
    }

    /// Configures the SMS channel to fail.
    pub fn set_fail_sms(&self, fail: bool) {
        self.state.write().unwrap().fail_sms = fail;
    }

    pub fn emails_sent(&self) -> Vec<OrderResponse> {
        self.state.read().unwrap().emails.clone()
    }

    pub fn sms_sent(&self) -> Vec<OrderResponse> {
        self.state.read().unwrap().sms.clone()
    }
}

#[async_trait]
impl OrderNotifier for InMemoryNotifier {
    async fn send_email(&self, order: &OrderResponse) -> Result<(), NotificationError> {
        let mut state = self.state.write().unwrap();
        if state.fail_email {
            return Err(NotificationError::Delivery {
                channel: Channel::Email,
                reason: "SMTP server unreachable".to_string(),
            });
        }
        state.emails.push(order.clone());
        Ok(())
    }

    async fn send_sms(&self, order: &OrderResponse) -> Result<(), NotificationError> {
        let mut state = self.state.write().unwrap();
        if state.fail_sms {
            return Err(NotificationError::Delivery {
                channel: Channel::Sms,
                reason: "SMS gateway unreachable".to_string(),
            });
        }
        state.sms.push(order.clone());
        Ok(())
    }
}
