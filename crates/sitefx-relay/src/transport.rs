#![forbid(unsafe_code)]

//! The delivery seam.
//!
//! The relay never speaks SMTP itself. A deployment plugs in a
//! [`MailTransport`]; failures come back as a [`TransportError`] carrying the
//! client's error code and SMTP reply code so the handler can tell the
//! submitter what kind of failure happened.

use std::fmt;

use crate::config::SmtpSettings;
use crate::mail::OutgoingMail;

/// Coarse failure classes reported to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Credentials rejected (`EAUTH`, reply 535).
    Auth,
    /// The server refused the connection (`ECONNREFUSED`).
    ConnectionRefused,
    /// The host name did not resolve (`ENOTFOUND`, `EDNS`).
    HostNotFound,
    Other,
}

/// A failed delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// Client error code such as `EAUTH` or `ECONNREFUSED`.
    pub code: Option<String>,
    /// SMTP reply code, when the server answered.
    pub response_code: Option<u16>,
    pub message: String,
}

impl TransportError {
    /// An error with a client error code.
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            response_code: None,
            message: message.into(),
        }
    }

    /// An error carrying only an SMTP reply code.
    pub fn with_response(response_code: u16, message: impl Into<String>) -> Self {
        Self {
            code: None,
            response_code: Some(response_code),
            message: message.into(),
        }
    }

    /// An unclassified error.
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            code: None,
            response_code: None,
            message: message.into(),
        }
    }

    /// Classify by code, then reply code.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self.code.as_deref() {
            Some("EAUTH") => FailureKind::Auth,
            Some("ECONNREFUSED") => FailureKind::ConnectionRefused,
            Some("ENOTFOUND" | "EDNS") => FailureKind::HostNotFound,
            _ if self.response_code == Some(535) => FailureKind::Auth,
            _ => FailureKind::Other,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, self.response_code) {
            (Some(code), Some(reply)) => write!(f, "{code} ({reply}): {}", self.message),
            (Some(code), None) => write!(f, "{code}: {}", self.message),
            (None, Some(reply)) => write!(f, "reply {reply}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// Delivers composed mail.
pub trait MailTransport {
    fn send(&mut self, settings: &SmtpSettings, mail: &OutgoingMail) -> Result<(), TransportError>;
}

impl<T: MailTransport + ?Sized> MailTransport for Box<T> {
    fn send(&mut self, settings: &SmtpSettings, mail: &OutgoingMail) -> Result<(), TransportError> {
        (**self).send(settings, mail)
    }
}

/// Keeps every message in memory (tests and dry runs).
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Vec<OutgoingMail>,
}

impl MemoryTransport {
    /// Messages delivered so far, in order.
    #[must_use]
    pub fn sent(&self) -> &[OutgoingMail] {
        &self.sent
    }
}

impl MailTransport for MemoryTransport {
    fn send(&mut self, _settings: &SmtpSettings, mail: &OutgoingMail) -> Result<(), TransportError> {
        self.sent.push(mail.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_codes() {
        assert_eq!(TransportError::with_code("EAUTH", "x").kind(), FailureKind::Auth);
        assert_eq!(TransportError::with_response(535, "x").kind(), FailureKind::Auth);
        assert_eq!(
            TransportError::with_code("ECONNREFUSED", "x").kind(),
            FailureKind::ConnectionRefused
        );
        assert_eq!(TransportError::with_code("ENOTFOUND", "x").kind(), FailureKind::HostNotFound);
        assert_eq!(TransportError::with_code("EDNS", "x").kind(), FailureKind::HostNotFound);
        assert_eq!(TransportError::with_code("ETIMEDOUT", "x").kind(), FailureKind::Other);
        assert_eq!(TransportError::with_response(550, "x").kind(), FailureKind::Other);
    }

    #[test]
    fn display_includes_codes() {
        let err = TransportError {
            code: Some("EAUTH".into()),
            response_code: Some(535),
            message: "bad credentials".into(),
        };
        assert_eq!(err.to_string(), "EAUTH (535): bad credentials");
        assert_eq!(TransportError::other("boom").to_string(), "boom");
    }
}
