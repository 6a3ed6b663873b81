//! Channel settings.

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// Plaintext greeting upgraded with `STARTTLS` (submission port 587).
    StartTls,
    /// TLS from the first byte (port 465).
    Wrapper,
}

impl SmtpTls {
    /// The mode a server on `port` expects: implicit TLS on 465, `STARTTLS` elsewhere.
    pub fn for_port(port: u16) -> Self {
        match port {
            465 => SmtpTls::Wrapper,
            _ => SmtpTls::StartTls,
        }
    }
}

impl std::str::FromStr for SmtpTls {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "starttls" => Ok(SmtpTls::StartTls),
            "wrapper" | "tls" => Ok(SmtpTls::Wrapper),
            other => Err(format!("unknown SMTP TLS mode: {other}")),
        }
    }
}

/// SMTP relay settings for confirmation emails.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    pub username: String,
    pub password: String,
    /// Sender mailbox, e.g. `Storefront <orders@example.com>`.
    pub from: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .finish()
    }
}

/// SMS gateway settings.
///
/// The gateway accepts a form POST with `username`, `to`, `message` and
/// `from` fields, authenticated by an `apiKey` header. `sender_id` is the
/// registered short code or alphanumeric sender and must be set.
#[derive(Clone)]
pub struct SmsConfig {
    pub gateway_url: String,
    pub api_key: String,
    pub username: String,
    pub sender_id: String,
}

impl std::fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsConfig")
            .field("gateway_url", &self.gateway_url)
            .field("api_key", &"<redacted>")
            .field("username", &self.username)
            .field("sender_id", &self.sender_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_secrets() {
        let smtp = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            tls: SmtpTls::StartTls,
            username: "mailer".to_string(),
            password: "hunter2".to_string(),
            from: "orders@example.com".to_string(),
        };
        let sms = SmsConfig {
            gateway_url: "https://sms.example.com/send".to_string(),
            api_key: "secret-key".to_string(),
            username: "sandbox".to_string(),
            sender_id: "SHOP".to_string(),
        };

        let rendered = format!("{smtp:?} {sms:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("smtp.example.com"));
    }

    #[test]
    fn tls_mode_follows_the_port() {
        assert_eq!(SmtpTls::for_port(587), SmtpTls::StartTls);
        assert_eq!(SmtpTls::for_port(25), SmtpTls::StartTls);
        assert_eq!(SmtpTls::for_port(465), SmtpTls::Wrapper);
    }

    #[test]
    fn tls_mode_parses() {
        assert_eq!("STARTTLS".parse::<SmtpTls>().unwrap(), SmtpTls::StartTls);
        assert_eq!("wrapper".parse::<SmtpTls>().unwrap(), SmtpTls::Wrapper);
        assert!("none".parse::<SmtpTls>().is_err());
    }
}
