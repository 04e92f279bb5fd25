#![forbid(unsafe_code)]

//! Contact submissions and the message composed from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subject prefix on every relayed message.
pub const SUBJECT_PREFIX: &str = "New Contact Form Submission: ";

/// The four-field contact form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactRequest {
    /// Extract the four fields from a JSON body.
    ///
    /// Returns `None` if the body is not a JSON object or any field is
    /// missing, empty, or not a string.
    #[must_use]
    pub fn from_json(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        let field = |key: &str| -> Option<String> {
            value
                .get(key)?
                .as_str()
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Some(Self {
            name: field("name")?,
            email: field("email")?,
            subject: field("subject")?,
            message: field("message")?,
        })
    }
}

/// A fully composed message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMail {
    /// `"Display Name" <address>`.
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Escape text for an HTML body or attribute.
#[must_use]
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Display names are quoted in the From header; strip what would break it.
fn display_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '"' | '\\' | '\r' | '\n'))
        .collect()
}

/// Header values must stay on one line.
fn header_value(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

impl OutgoingMail {
    /// Compose the relayed message, sent from `sender` to `recipient`.
    #[must_use]
    pub fn compose(request: &ContactRequest, sender: &str, recipient: &str) -> Self {
        let ContactRequest {
            name,
            email,
            subject,
            message,
        } = request;

        let text = format!(
            "You have a new message from your portfolio contact form:\n\n\
             Name: {name}\n\n\
             Email: {email}\n\n\
             Subject: {subject}\n\n\
             Message:\n\n\
             {message}"
        );

        let (h_name, h_email, h_subject) =
            (html_escape(name), html_escape(email), html_escape(subject));
        let h_message = html_escape(message).replace("\r\n", "<br>").replace('\n', "<br>");
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <h2 style="color: #1a1a1a;">New Contact Form Submission</h2>
  <p><strong>Name:</strong> {h_name}</p>
  <p><strong>Email:</strong> <a href="mailto:{h_email}" style="color: #007bff;">{h_email}</a></p>
  <p><strong>Subject:</strong> {h_subject}</p>
  <p><strong>Message:</strong></p>
  <div style="padding: 15px; border-left: 4px solid #007bff; background-color: #f8f9fa; white-space: pre-wrap; font-size: 1em; margin-top: 5px;">{h_message}</div>
  <hr style="border: none; border-top: 1px solid #eee; margin: 20px 0;">
  <p style="font-size: 0.9em; color: #777;">This message was sent from your portfolio website contact form.</p>
</div>
"#
        );

        Self {
            from: format!("\"{}\" <{sender}>", display_name(name)),
            to: recipient.to_owned(),
            reply_to: header_value(email),
            subject: format!("{SUBJECT_PREFIX}{}", header_value(subject)),
            text,
            html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ContactRequest {
        ContactRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Hi".into(),
            message: "line one\nline two".into(),
        }
    }

    #[test]
    fn parses_four_string_fields() {
        let body = r#"{"name":"Ada","email":"ada@example.com","subject":"Hi","message":"yo"}"#;
        let req = ContactRequest::from_json(body).unwrap();
        assert_eq!(req.name, "Ada");
        assert_eq!(req.message, "yo");
    }

    #[test]
    fn missing_or_empty_fields_rejected() {
        assert!(ContactRequest::from_json(r#"{"name":"Ada"}"#).is_none());
        assert!(
            ContactRequest::from_json(r#"{"name":"","email":"e","subject":"s","message":"m"}"#)
                .is_none()
        );
        assert!(
            ContactRequest::from_json(r#"{"name":1,"email":"e","subject":"s","message":"m"}"#)
                .is_none()
        );
        assert!(ContactRequest::from_json("not json").is_none());
        assert!(ContactRequest::from_json("[]").is_none());
    }

    #[test]
    fn headers_follow_submission() {
        let mail = OutgoingMail::compose(&request(), "relay@example.com", "inbox@example.com");
        assert_eq!(mail.from, "\"Ada\" <relay@example.com>");
        assert_eq!(mail.to, "inbox@example.com");
        assert_eq!(mail.reply_to, "ada@example.com");
        assert_eq!(mail.subject, "New Contact Form Submission: Hi");
    }

    #[test]
    fn text_body_lists_fields() {
        let mail = OutgoingMail::compose(&request(), "r@x", "t@x");
        assert!(mail.text.starts_with("You have a new message from your portfolio contact form:"));
        assert!(mail.text.contains("Name: Ada\n"));
        assert!(mail.text.ends_with("Message:\n\nline one\nline two"));
    }

    #[test]
    fn html_body_escapes_and_breaks_lines() {
        let req = ContactRequest {
            name: "<b>Eve</b>".into(),
            message: "a & b\n<script>".into(),
            ..request()
        };
        let mail = OutgoingMail::compose(&req, "r@x", "t@x");
        assert!(mail.html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(mail.html.contains("a &amp; b<br>&lt;script&gt;"));
        assert!(!mail.html.contains("<script>"));
    }

    #[test]
    fn header_injection_is_flattened() {
        let req = ContactRequest {
            name: "Mal\"lory\r\nBcc: x@y".into(),
            subject: "S\r\nBcc: x@y".into(),
            ..request()
        };
        let mail = OutgoingMail::compose(&req, "r@x", "t@x");
        assert_eq!(mail.from, "\"MalloryBcc: x@y\" <r@x>");
        assert!(!mail.subject.contains('\n'));
    }
}
