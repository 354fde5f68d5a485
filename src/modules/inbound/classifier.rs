// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::mime::header::ParsedHeaders;

const AUTO_REPLY_PATTERNS: &[&str] = &[
    "auto-reply",
    "autoreply",
    "automatic reply",
    "out of office",
    "vacation reply",
    "mailer-daemon",
    "postmaster@",
    "noreply@",
    "no-reply@",
    "undeliverable",
    "delivery status",
];

const BULK_PRECEDENCE: &[&str] = &["bulk", "junk", "list", "auto_reply"];

/// Bounce, vacation and no-reply detection on subject and sender.
pub fn is_auto_reply(subject: &str, from: &str) -> bool {
    let subject = subject.to_lowercase();
    let from = from.to_lowercase();
    AUTO_REPLY_PATTERNS
        .iter()
        .any(|pattern| subject.contains(pattern) || from.contains(pattern))
}

/// Machine-generated mail announced through headers rather than wording.
pub fn is_auto_submitted(headers: &ParsedHeaders) -> bool {
    if headers
        .get_non_empty("auto-submitted")
        .is_some_and(|value| !value.trim().eq_ignore_ascii_case("no"))
    {
        return true;
    }
    if headers.get("precedence").is_some_and(|value| {
        let value = value.trim().to_ascii_lowercase();
        BULK_PRECEDENCE.contains(&value.as_str())
    }) {
        return true;
    }
    if headers.contains("x-autoreply") || headers.contains("x-autorespond") {
        return true;
    }
    headers.content_type().is("multipart/report")
}
