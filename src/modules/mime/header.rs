// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use ahash::AHashMap;
use regex::Regex;
use std::sync::LazyLock;

use crate::modules::mime::decoder::{base64_bytes, decode_charset, quoted_printable_bytes};

static ENCODED_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"=\?([^?\s]+)\?([BbQq])\?([^?\s]*)\?=").expect("encoded-word regex is valid")
});

/// Header block folded into one value per lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHeaders {
    values: AHashMap<String, String>,
}

impl ParsedHeaders {
    /// Continuation lines are joined to the previous value with a single space.
    /// When a name repeats, the first occurrence is kept.
    pub fn parse(block: &str) -> Self {
        let mut values: AHashMap<String, String> = AHashMap::new();
        // Name of the header currently being folded, if it is the one kept.
        let mut current: Option<String> = None;

        for line in block.lines() {
            let line = line.trim_end_matches('\r');
            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some(value) = current.as_ref().and_then(|name| values.get_mut(name)) {
                    let continuation = line.trim();
                    if !continuation.is_empty() {
                        if !value.is_empty() {
                            value.push(' ');
                        }
                        value.push_str(continuation);
                    }
                }
                continue;
            }
            current = None;
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                continue;
            }
            let name = name.to_ascii_lowercase();
            if values.contains_key(&name) {
                continue;
            }
            values.insert(name.clone(), value.trim().to_string());
            current = Some(name);
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Header value with a blank result treated as missing.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&name.to_ascii_lowercase())
    }

    pub fn content_type(&self) -> ContentType {
        self.get("content-type")
            .map(ContentType::parse)
            .unwrap_or_default()
    }

    pub fn transfer_encoding(&self) -> TransferEncoding {
        TransferEncoding::from_header(self.get("content-transfer-encoding"))
    }

    pub fn is_attachment(&self) -> bool {
        self.get("content-disposition").is_some_and(|value| {
            value
                .split(';')
                .next()
                .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("attachment"))
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Lower-cased `type/subtype`.
    pub mime_type: String,
    /// Parameters keyed by lower-cased name, quotes removed.
    pub params: AHashMap<String, String>,
}

impl Default for ContentType {
    fn default() -> Self {
        Self {
            mime_type: "text/plain".into(),
            params: AHashMap::new(),
        }
    }
}

impl ContentType {
    pub fn text_plain() -> Self {
        Self::default()
    }

    pub fn parse(value: &str) -> Self {
        let mut segments = split_params(value).into_iter();
        let mime_type = segments
            .next()
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "text/plain".into());

        let mut params = AHashMap::new();
        for segment in segments {
            let Some((name, raw)) = segment.split_once('=') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            let raw = raw.trim();
            let unquoted = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            params
                .entry(name)
                .or_insert_with(|| unquoted.replace("\\\"", "\""));
        }
        Self { mime_type, params }
    }

    pub fn is_multipart(&self) -> bool {
        self.mime_type.starts_with("multipart/")
    }

    pub fn is(&self, mime_type: &str) -> bool {
        self.mime_type == mime_type
    }

    pub fn boundary(&self) -> Option<&str> {
        self.params
            .get("boundary")
            .map(String::as_str)
            .filter(|b| !b.is_empty())
    }

    pub fn charset(&self) -> Option<&str> {
        self.params.get("charset").map(String::as_str)
    }
}

/// Splits on `;` outside double quotes.
fn split_params(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;
    for (index, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&value[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);
    segments
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    QuotedPrintable,
    Base64,
    /// 7bit, 8bit, binary and anything unrecognized.
    #[default]
    Identity,
}

impl TransferEncoding {
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("quoted-printable") => TransferEncoding::QuotedPrintable,
            Some("base64") => TransferEncoding::Base64,
            _ => TransferEncoding::Identity,
        }
    }
}

/// Decodes RFC 2047 encoded words (`=?charset?B|Q?text?=`). Whitespace between
/// two adjacent encoded words is dropped; anything undecodable is left as is.
pub fn decode_encoded_words(value: &str) -> String {
    if !value.contains("=?") {
        return value.to_string();
    }
    let mut output = String::with_capacity(value.len());
    let mut last_end = 0;
    let mut previous_was_word = false;

    for captures in ENCODED_WORD.captures_iter(value) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let gap = &value[last_end..whole.start()];
        let decoded = decode_word(&captures[1], &captures[2], &captures[3]);
        if !(previous_was_word && gap.trim().is_empty() && decoded.is_some()) {
            output.push_str(gap);
        }
        match decoded {
            Some(text) => {
                output.push_str(&text);
                previous_was_word = true;
            }
            None => {
                output.push_str(whole.as_str());
                previous_was_word = false;
            }
        }
        last_end = whole.end();
    }
    output.push_str(&value[last_end..]);
    output
}

fn decode_word(charset: &str, encoding: &str, text: &str) -> Option<String> {
    // RFC 2231 language suffix: `utf-8*en`.
    let charset = charset.split('*').next().unwrap_or(charset);
    let bytes = if encoding.eq_ignore_ascii_case("b") {
        base64_bytes(text.as_bytes())?
    } else {
        let spaced: Vec<u8> = text
            .bytes()
            .map(|b| if b == b'_' { b' ' } else { b })
            .collect();
        quoted_printable_bytes(&spaced)
    };
    Some(decode_charset(&bytes, Some(charset)))
}

/// Canonical `<id>` form of a message identifier, or `None` if blank.
pub fn normalize_message_id(value: &str) -> Option<String> {
    let inner = value.trim().trim_start_matches('<').trim_end_matches('>').trim();
    if inner.is_empty() {
        None
    } else {
        Some(format!("<{}>", inner))
    }
}

/// Tokenizes a `References` or `In-Reply-To` value into canonical ids, in order.
pub fn extract_message_ids(value: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut rest = value;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        if let Some(id) = normalize_message_id(&rest[open..open + close + 1]) {
            ids.push(id);
        }
        rest = &rest[open + close + 1..];
    }
    if ids.is_empty() {
        // Some mailers drop the angle brackets.
        ids.extend(
            value
                .split_whitespace()
                .filter(|token| token.contains('@'))
                .filter_map(normalize_message_id),
        );
    }
    ids
}
