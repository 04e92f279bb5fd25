#![forbid(unsafe_code)]

//! Request handling.
//!
//! [`RelayHandler::handle`] maps one HTTP request (method plus JSON body) to
//! a status code and a user-facing message. Checks run in order: method,
//! fields, configuration, delivery.

use std::fmt;

use crate::config::RelayConfig;
use crate::mail::{ContactRequest, OutgoingMail};
use crate::transport::{FailureKind, MailTransport, TransportError};

/// Message on successful delivery.
pub const SENT_MESSAGE: &str = "Message sent successfully! I will get back to you soon.";

/// Why a request was not relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Anything other than `POST`.
    MethodNotAllowed,
    /// A field was missing, empty, or the body was not a JSON object.
    MissingFields,
    /// Host, user, or password is not configured.
    Misconfigured,
    /// The transport failed.
    Transport(TransportError),
}

impl RelayError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::MethodNotAllowed => 405,
            Self::MissingFields => 400,
            Self::Misconfigured | Self::Transport(_) => 500,
        }
    }

    /// Message safe to show the submitter.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "Only POST requests allowed",
            Self::MissingFields => "All fields are required",
            Self::Misconfigured => "Server configuration error for sending email.",
            Self::Transport(err) => match err.kind() {
                FailureKind::Auth => "Authentication failed. Please check your email credentials.",
                FailureKind::ConnectionRefused => {
                    "Connection refused. Please check your SMTP host and port."
                }
                FailureKind::HostNotFound => {
                    "Could not resolve SMTP host. Please check your EMAIL_HOST setting."
                }
                FailureKind::Other => "Failed to send message. Please try again later.",
            },
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "mail transport failed: {err}"),
            other => f.write_str(other.public_message()),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// HTTP response for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub message: String,
}

impl RelayResponse {
    fn ok() -> Self {
        Self {
            status: 200,
            message: SENT_MESSAGE.to_owned(),
        }
    }

    /// JSON body: `{"message": "..."}`.
    #[must_use]
    pub fn body(&self) -> String {
        serde_json::json!({ "message": self.message }).to_string()
    }
}

impl From<RelayError> for RelayResponse {
    fn from(err: RelayError) -> Self {
        Self {
            status: err.status(),
            message: err.public_message().to_owned(),
        }
    }
}

/// Validates submissions and hands them to a transport.
#[derive(Debug)]
pub struct RelayHandler<T: MailTransport> {
    config: RelayConfig,
    transport: T,
}

impl<T: MailTransport> RelayHandler<T> {
    #[must_use]
    pub fn new(config: RelayConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Handle one request.
    pub fn handle(&mut self, method: &str, body: &str) -> RelayResponse {
        match self.relay(method, body) {
            Ok(()) => RelayResponse::ok(),
            Err(err) => err.into(),
        }
    }

    /// Handle one request, keeping the error.
    pub fn relay(&mut self, method: &str, body: &str) -> Result<(), RelayError> {
        if method != "POST" {
            return Err(RelayError::MethodNotAllowed);
        }
        let request = ContactRequest::from_json(body).ok_or(RelayError::MissingFields)?;
        let Some(smtp) = self.config.smtp() else {
            tracing::error!(
                host_set = self.config.host.is_some(),
                user_set = self.config.user.is_some(),
                pass_set = self.config.pass.is_some(),
                "missing email configuration"
            );
            return Err(RelayError::Misconfigured);
        };

        let mail = OutgoingMail::compose(&request, &smtp.user, &self.config.to);
        match self.transport.send(&smtp, &mail) {
            Ok(()) => {
                tracing::info!(to = %mail.to, "contact message relayed");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, kind = ?err.kind(), "contact message not relayed");
                Err(RelayError::Transport(err))
            }
        }
    }

    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
