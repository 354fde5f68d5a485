// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::mime::decoder::{decode_charset, decode_transfer};
use crate::modules::mime::header::ParsedHeaders;
use crate::modules::mime::part::{split_head_body, MimePart};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBody {
    /// Always present; empty when the message only carries HTML.
    pub text: String,
    pub html: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedMessage {
    pub headers: ParsedHeaders,
    pub body: ParsedBody,
    pub root: MimePart,
}

pub fn parse(raw: &str) -> ParsedMessage {
    parse_bytes(raw.as_bytes())
}

/// Best-effort parse of an RFC 822 message. Malformed structure degrades to
/// plain-text extraction instead of failing.
pub fn parse_bytes(raw: &[u8]) -> ParsedMessage {
    let (head, body) = split_head_body(raw);
    let headers = ParsedHeaders::parse(&String::from_utf8_lossy(head));
    let root = MimePart::build(&headers, body, 0);

    let body = match &root {
        MimePart::Multipart { .. } => ParsedBody {
            text: root.find_text("text/plain").unwrap_or_default(),
            html: root.find_text("text/html"),
        },
        MimePart::Leaf { content_type, .. } if content_type.is("text/html") => ParsedBody {
            text: String::new(),
            html: root.find_text("text/html"),
        },
        MimePart::Leaf { .. } => ParsedBody {
            text: leaf_as_text(&root),
            html: None,
        },
    };

    ParsedMessage {
        headers,
        body,
        root,
    }
}

/// Header-only pass; the body is never looked at.
pub fn parse_headers(raw: &[u8]) -> ParsedHeaders {
    let (head, _) = split_head_body(raw);
    ParsedHeaders::parse(&String::from_utf8_lossy(head))
}

// A single-part message is read as text whatever its declared type.
fn leaf_as_text(part: &MimePart) -> String {
    match part {
        MimePart::Leaf {
            content_type,
            encoding,
            body,
            ..
        } => {
            let decoded = decode_transfer(body, *encoding);
            decode_charset(&decoded, content_type.charset())
        }
        MimePart::Multipart { .. } => String::new(),
    }
}
