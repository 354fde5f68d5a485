// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::DateTime;

use crate::modules::common::Addr;
use crate::modules::mime::header::{
    decode_encoded_words, extract_message_ids, normalize_message_id, ParsedHeaders,
};
use crate::modules::mime::parser::ParsedMessage;
use crate::{calculate_hash, utc_now};

pub mod classifier;
pub mod stripper;
#[cfg(test)]
mod tests;

/// One customer email, reduced to what the ticket pipeline stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEmail {
    pub from_email: String,
    pub from_name: Option<String>,
    pub to_email: Option<String>,
    pub subject: Option<String>,
    pub message_id: Option<String>,
    pub in_reply_to: Option<String>,
    pub references: Vec<String>,
    /// Plain-text body with quoted history and signature removed.
    pub body_text: String,
    pub body_html: Option<String>,
    /// Milliseconds since the epoch; now when the `Date` header is missing or unreadable.
    pub received_at: i64,
    pub date_header: Option<String>,
}

impl InboundEmail {
    pub fn from_parsed(message: &ParsedMessage) -> Self {
        let headers = &message.headers;
        let from = sender(headers);
        let to_email = headers
            .get_non_empty("to")
            .and_then(|to| Addr::parse(to).address)
            .map(|address| address.to_lowercase());

        InboundEmail {
            from_email: from.address.unwrap_or_default(),
            from_name: from.name,
            to_email,
            subject: subject(headers),
            message_id: headers
                .get_non_empty("message-id")
                .and_then(normalize_message_id),
            in_reply_to: headers
                .get_non_empty("in-reply-to")
                .and_then(|value| extract_message_ids(value).into_iter().next()),
            references: headers
                .get_non_empty("references")
                .map(extract_message_ids)
                .unwrap_or_default(),
            body_text: stripper::strip(&message.body.text),
            body_html: message.body.html.clone(),
            received_at: received_at(headers),
            date_header: headers.get_non_empty("date").map(str::to_string),
        }
    }

    /// `In-Reply-To` followed by `References`, without duplicates.
    pub fn reference_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.references.len() + 1);
        for id in self.in_reply_to.iter().chain(self.references.iter()) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }

    /// Nothing worth storing: no new text and no HTML alternative.
    pub fn is_empty(&self) -> bool {
        self.body_text.is_empty() && self.body_html.is_none()
    }

    /// Stable stand-in identifier for mail that arrived without a `Message-Id`.
    pub fn content_message_id(&self) -> String {
        let key = format!(
            "{}\n{}\n{}\n{}",
            self.from_email,
            self.subject.as_deref().unwrap_or_default(),
            self.date_header.as_deref().unwrap_or_default(),
            self.body_text
        );
        format!("<{:x}.content@ticketmail>", calculate_hash!(&key))
    }
}

/// Lower-cased sender address and decoded display name.
pub fn sender(headers: &ParsedHeaders) -> Addr {
    let Some(from) = headers.get_non_empty("from") else {
        return Addr {
            name: None,
            address: None,
        };
    };
    let addr = Addr::parse(from);
    Addr {
        name: addr.name.map(|name| decode_encoded_words(&name)),
        address: addr.address.map(|address| address.to_lowercase()),
    }
}

pub fn subject(headers: &ParsedHeaders) -> Option<String> {
    headers
        .get_non_empty("subject")
        .map(|value| decode_encoded_words(value).trim().to_string())
        .filter(|value| !value.is_empty())
}

fn received_at(headers: &ParsedHeaders) -> i64 {
    headers
        .get_non_empty("date")
        .and_then(|value| {
            // Drop a trailing comment such as `(UTC)`.
            let value = match value.find('(') {
                Some(index) => &value[..index],
                None => value,
            };
            DateTime::parse_from_rfc2822(value.trim()).ok()
        })
        .map(|date| date.timestamp_millis())
        .unwrap_or_else(|| utc_now!())
}
