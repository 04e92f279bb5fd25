#![forbid(unsafe_code)]

//! Relay configuration from the environment.
//!
//! | Variable     | Meaning                      | Default          |
//! |--------------|------------------------------|------------------|
//! | `EMAIL_HOST` | SMTP host                    | required         |
//! | `EMAIL_PORT` | SMTP port                    | `587`            |
//! | `EMAIL_USER` | SMTP user and From address   | required         |
//! | `EMAIL_PASS` | SMTP password                | required         |
//! | `EMAIL_TO`   | Inbox that receives messages | `hello@clowe.co` |

use std::fmt;

/// Default SMTP submission port.
pub const DEFAULT_PORT: u16 = 587;

/// Port that implies implicit TLS.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Default recipient.
pub const DEFAULT_RECIPIENT: &str = "hello@clowe.co";

/// Raw relay configuration. Required values may be missing; the handler
/// checks them per request.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub to: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            user: None,
            pass: None,
            to: DEFAULT_RECIPIENT.to_owned(),
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass_set", &self.pass.is_some())
            .field("to", &self.to)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl RelayConfig {
    /// Read from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`, which maps a variable name to its value.
    ///
    /// Empty values count as missing. An unparsable port falls back to
    /// [`DEFAULT_PORT`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match non_empty(lookup("EMAIL_PORT")) {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "EMAIL_PORT is not a port number; using default");
                DEFAULT_PORT
            }),
        };
        let config = Self {
            host: non_empty(lookup("EMAIL_HOST")),
            port,
            user: non_empty(lookup("EMAIL_USER")),
            pass: non_empty(lookup("EMAIL_PASS")),
            to: non_empty(lookup("EMAIL_TO")).unwrap_or_else(|| DEFAULT_RECIPIENT.to_owned()),
        };
        tracing::debug!(
            host = config.host.as_deref().unwrap_or("<unset>"),
            port = config.port,
            user = config.user.as_deref().unwrap_or("<unset>"),
            pass_set = config.pass.is_some(),
            "relay configuration loaded"
        );
        config
    }

    /// Whether the connection uses implicit TLS.
    #[must_use]
    pub fn secure(&self) -> bool {
        self.port == IMPLICIT_TLS_PORT
    }

    /// Complete SMTP settings, or `None` if host, user, or pass is missing.
    #[must_use]
    pub fn smtp(&self) -> Option<SmtpSettings> {
        Some(SmtpSettings {
            host: self.host.clone()?,
            port: self.port,
            secure: self.secure(),
            user: self.user.clone()?,
            pass: self.pass.clone()?,
        })
    }
}

/// Everything a transport needs to connect and authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: String,
    pub pass: String,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}
