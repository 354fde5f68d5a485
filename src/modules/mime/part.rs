// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::mime::decoder::{decode_charset, decode_transfer};
use crate::modules::mime::header::{ContentType, ParsedHeaders, TransferEncoding};

/// Multipart nesting deeper than this is kept as an opaque leaf.
pub const MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimePart {
    Leaf {
        content_type: ContentType,
        encoding: TransferEncoding,
        attachment: bool,
        body: Vec<u8>,
    },
    Multipart {
        content_type: ContentType,
        boundary: String,
        parts: Vec<MimePart>,
    },
}

impl MimePart {
    /// Builds the part tree for one entity. Never fails: a multipart without a
    /// usable boundary becomes a single `text/plain` leaf holding the whole body.
    pub fn build(headers: &ParsedHeaders, body: &[u8], depth: usize) -> Self {
        let content_type = headers.content_type();
        let encoding = headers.transfer_encoding();

        if content_type.is_multipart() && depth < MAX_DEPTH {
            let boundary = content_type.boundary().map(str::to_string);
            if let Some(boundary) = boundary {
                if let Some(sections) = split_multipart(body, &boundary) {
                    let parts = sections
                        .into_iter()
                        .map(|section| {
                            let (head, body) = split_head_body(section);
                            let headers = ParsedHeaders::parse(&String::from_utf8_lossy(head));
                            MimePart::build(&headers, body, depth + 1)
                        })
                        .collect();
                    return MimePart::Multipart {
                        content_type,
                        boundary,
                        parts,
                    };
                }
            }
            return MimePart::Leaf {
                content_type: ContentType::text_plain(),
                encoding,
                attachment: false,
                body: body.to_vec(),
            };
        }

        MimePart::Leaf {
            content_type,
            encoding,
            attachment: headers.is_attachment(),
            body: body.to_vec(),
        }
    }

    /// Depth-first search for the first inline leaf of `mime_type`, decoded to text.
    pub fn find_text(&self, mime_type: &str) -> Option<String> {
        match self {
            MimePart::Leaf {
                content_type,
                encoding,
                attachment,
                body,
            } => {
                if *attachment || !content_type.is(mime_type) {
                    return None;
                }
                let decoded = decode_transfer(body, *encoding);
                Some(decode_charset(&decoded, content_type.charset()))
            }
            MimePart::Multipart { parts, .. } => {
                parts.iter().find_map(|part| part.find_text(mime_type))
            }
        }
    }

    pub fn content_type(&self) -> &ContentType {
        match self {
            MimePart::Leaf { content_type, .. } | MimePart::Multipart { content_type, .. } => {
                content_type
            }
        }
    }
}

/// Splits an entity at the first empty line. An entity without one is all
/// headers if its first line looks like a header, otherwise all body.
pub fn split_head_body(raw: &[u8]) -> (&[u8], &[u8]) {
    if let Some(rest) = raw.strip_prefix(b"\r\n") {
        return (&[], rest);
    }
    if let Some(rest) = raw.strip_prefix(b"\n") {
        return (&[], rest);
    }
    let crlf = find(raw, b"\r\n\r\n").map(|i| (i, 4));
    let lf = find(raw, b"\n\n").map(|i| (i, 2));
    let separator = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };
    match separator {
        Some((index, len)) => (&raw[..index], &raw[index + len..]),
        None if looks_like_header(raw) => (raw, &[]),
        None => (&[], raw),
    }
}

fn looks_like_header(raw: &[u8]) -> bool {
    let first_line = raw.split(|b| *b == b'\n').next().unwrap_or_default();
    match first_line.iter().position(|b| *b == b':') {
        Some(colon) => {
            colon > 0 && !first_line[..colon].iter().any(|b| b.is_ascii_whitespace())
        }
        None => false,
    }
}

/// Returns the sections between `--boundary` delimiter lines, with the line
/// break preceding each delimiter removed. `None` when no delimiter exists.
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Option<Vec<&'a [u8]>> {
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();

    let mut sections = Vec::new();
    let mut section_start: Option<usize> = None;
    let mut line_start = 0;
    let mut found = false;

    while line_start < body.len() {
        let line_end = body[line_start..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|i| line_start + i + 1)
            .unwrap_or(body.len());
        let line = trim_line_end(&body[line_start..line_end]);

        if let Some(after) = line.strip_prefix(delimiter) {
            let closing = after.starts_with(b"--");
            let tail = if closing { &after[2..] } else { after };
            if tail.iter().all(|b| *b == b' ' || *b == b'\t') {
                found = true;
                if let Some(start) = section_start.take() {
                    sections.push(strip_trailing_break(&body[start..line_start]));
                }
                if closing {
                    return Some(sections);
                }
                section_start = Some(line_end);
            }
        }
        line_start = line_end;
    }

    if let Some(start) = section_start {
        sections.push(strip_trailing_break(&body[start..]));
    }
    found.then_some(sections)
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn strip_trailing_break(section: &[u8]) -> &[u8] {
    if let Some(s) = section.strip_suffix(b"\r\n") {
        return s;
    }
    section.strip_suffix(b"\n").unwrap_or(section)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
