//! Production notification channels for confirmed orders.
//!
//! - `SmtpEmailChannel` sends a plain-text confirmation over SMTP (lettre)
//! - `HttpSmsChannel` posts a short message to an SMS gateway (reqwest)
//! - `ChannelNotifier` resolves the customer's contact details and drives both

pub mod config;
pub mod email;
pub mod notifier;
pub mod sms;

pub use config::{SmsConfig, SmtpConfig, SmtpTls};
pub use email::SmtpEmailChannel;
pub use notifier::ChannelNotifier;
pub use sms::HttpSmsChannel;
