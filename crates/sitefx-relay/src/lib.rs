#![forbid(unsafe_code)]

//! Contact-form mail relay.
//!
//! The site's contact form posts four fields (`name`, `email`, `subject`,
//! `message`) as JSON. [`RelayHandler`] validates the submission, composes
//! the outgoing message, and hands it to a [`MailTransport`]. It is
//! independent of any HTTP framework or SMTP client: a deployment wires
//! `handle(method, body)` into its server and supplies the transport.
//!
//! # Example
//!
//! ```
//! use sitefx_relay::{MemoryTransport, RelayConfig, RelayHandler};
//!
//! let config = RelayConfig::from_lookup(|key| match key {
//!     "EMAIL_HOST" => Some("smtp.example.com".into()),
//!     "EMAIL_USER" => Some("relay@example.com".into()),
//!     "EMAIL_PASS" => Some("secret".into()),
//!     _ => None,
//! });
//! let mut relay = RelayHandler::new(config, MemoryTransport::default());
//! let body = r#"{"name":"Ada","email":"ada@example.com","subject":"Hi","message":"Hello"}"#;
//! let response = relay.handle("POST", body);
//! assert_eq!(response.status, 200);
//! assert_eq!(relay.transport().sent().len(), 1);
//! ```

pub mod config;
pub mod handler;
pub mod mail;
pub mod transport;

pub use config::{RelayConfig, SmtpSettings};
pub use handler::{RelayError, RelayHandler, RelayResponse};
pub use mail::{ContactRequest, OutgoingMail};
pub use transport::{FailureKind, MailTransport, MemoryTransport, TransportError};
