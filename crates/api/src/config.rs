//! Application configuration loaded from environment variables.

use domain::DispatchMode;
use notification::{SmsConfig, SmtpConfig, SmtpTls};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL URL; unset runs on in-memory stores
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `NOTIFICATION_MODE`: `background` (default) or `inline`
/// - `SMTP_HOST`, `SMTP_PORT` (default `587`), `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM`
/// - `SMTP_TLS`: `starttls` or `wrapper` (default: `wrapper` on port 465, else `starttls`)
/// - `SMS_GATEWAY_URL`, `SMS_API_KEY`, `SMS_USERNAME`, `SMS_SENDER_ID`
///
/// Email is enabled when `SMTP_HOST` and `SMTP_FROM` are set; SMS when the
/// gateway URL, API key, username and sender ID are set.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub notification_mode: DispatchMode,
    pub smtp: Option<SmtpConfig>,
    pub sms: Option<SmsConfig>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let smtp = match (var("SMTP_HOST"), var("SMTP_FROM")) {
            (Some(host), Some(from)) => {
                let port = var("SMTP_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587);
                Some(SmtpConfig {
                    host,
                    port,
                    tls: var("SMTP_TLS")
                        .and_then(|t| t.parse().ok())
                        .unwrap_or_else(|| SmtpTls::for_port(port)),
                    username: var("SMTP_USERNAME").unwrap_or_default(),
                    password: var("SMTP_PASSWORD").unwrap_or_default(),
                    from,
                })
            }
            _ => None,
        };

        let sms = match (
            var("SMS_GATEWAY_URL"),
            var("SMS_API_KEY"),
            var("SMS_USERNAME"),
            var("SMS_SENDER_ID"),
        ) {
            (Some(gateway_url), Some(api_key), Some(username), Some(sender_id)) => {
                Some(SmsConfig {
                    gateway_url,
                    api_key,
                    username,
                    sender_id,
                })
            }
            _ => None,
        };

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: var("DATABASE_URL"),
            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.database_max_connections),
            notification_mode: var("NOTIFICATION_MODE")
                .and_then(|m| m.parse().ok())
                .unwrap_or(defaults.notification_mode),
            smtp,
            sms,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 5,
            notification_mode: DispatchMode::Background,
            smtp: None,
            sms: None,
        }
    }
}
