// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use super::error::code::ErrorCode;
use super::error::TicketMailError;
use poem::error::ResponseError;
use poem::Body;
use poem::{http::StatusCode, Error, Response};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub mod auth;
pub mod error;
pub mod log;
pub mod paginated;
pub mod rustls;
pub mod signal;
pub mod timeout;

static ADDR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:(?P<name>.*)\s*)?<(?P<email>[^<>]+)>"#).expect("address regex is valid")
});

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Addr {
    /// The optional display name associated with the email address (e.g., "John Doe").
    pub name: Option<String>,
    /// The optional email address (e.g., "john.doe@example.com").
    pub address: Option<String>,
}

impl Addr {
    /// Parses `Name <user@host>`, `<user@host>` or a bare `user@host`.
    /// For a list, only the first mailbox is returned.
    pub fn parse(s: &str) -> Self {
        let first = first_mailbox(s);
        if let Some(caps) = ADDR_REGEX.captures(first) {
            let name = caps
                .name("name")
                .map(|m| m.as_str().trim().trim_matches('"').trim().to_string())
                .filter(|n| !n.is_empty());
            let address = caps
                .name("email")
                .map(|m| m.as_str().trim().to_string())
                .filter(|a| !a.is_empty());
            Addr { name, address }
        } else {
            let trimmed = first.trim();
            Addr {
                name: None,
                address: if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.into())
                },
            }
        }
    }
}

/// Cuts a header value at the first comma that is outside quotes and angle brackets.
fn first_mailbox(s: &str) -> &str {
    let mut in_quotes = false;
    let mut in_angle = false;
    for (index, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '<' if !in_quotes => in_angle = true,
            '>' if !in_quotes => in_angle = false,
            ',' if !in_quotes && !in_angle => return &s[..index],
            _ => {}
        }
    }
    s
}

impl std::fmt::Display for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.name, &self.address) {
            (Some(name), Some(address)) => write!(f, "{} <{}>", name, address),
            (None, Some(address)) => write!(f, "<{}>", address),
            (Some(name), None) => write!(f, "{}", name),
            (None, None) => write!(f, ""),
        }
    }
}

#[inline]
fn create_ticketmail_error(message: &str, code: ErrorCode) -> TicketMailError {
    TicketMailError::Generic {
        message: message.into(),
        location: snafu::Location::default(),
        code,
    }
}

#[inline]
pub fn create_api_error_response(message: &str, code: ErrorCode) -> Error {
    let error = create_ticketmail_error(message, code);
    error.into()
}

impl ResponseError for TicketMailError {
    fn status(&self) -> StatusCode {
        self.code().status()
    }

    fn as_response(&self) -> Response
    where
        Self: std::error::Error + Send + Sync + 'static,
    {
        match self {
            TicketMailError::Generic { message, code, .. } => {
                self.log_response();
                let body = Body::from_json(serde_json::json!({
                    "error": message.to_string(),
                    "code": *code as u32,
                }))
                .unwrap_or_else(|_| Body::from_string(message.to_string()));

                Response::builder().status(self.status()).body(body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Addr;

    #[test]
    fn parses_display_name_and_address() {
        let addr = Addr::parse("Jane Doe <jane@x.com>");
        assert_eq!(addr.name.as_deref(), Some("Jane Doe"));
        assert_eq!(addr.address.as_deref(), Some("jane@x.com"));
    }

    #[test]
    fn parses_quoted_name_with_comma() {
        let addr = Addr::parse("\"Doe, Jane\" <jane@x.com>, bob@y.com");
        assert_eq!(addr.name.as_deref(), Some("Doe, Jane"));
        assert_eq!(addr.address.as_deref(), Some("jane@x.com"));
    }

    #[test]
    fn parses_bare_address() {
        let addr = Addr::parse("  bob@y.com ");
        assert_eq!(addr.name, None);
        assert_eq!(addr.address.as_deref(), Some("bob@y.com"));
    }

    #[test]
    fn empty_input_has_no_address() {
        let addr = Addr::parse("");
        assert_eq!(addr.address, None);
    }
}
