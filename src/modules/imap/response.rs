// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    No,
    Bad,
}

impl Status {
    fn parse(word: &[u8]) -> Option<Self> {
        if word.eq_ignore_ascii_case(b"OK") {
            Some(Status::Ok)
        } else if word.eq_ignore_ascii_case(b"NO") {
            Some(Status::No)
        } else if word.eq_ignore_ascii_case(b"BAD") {
            Some(Status::Bad)
        } else {
            None
        }
    }
}

/// Everything the server sent for one tagged command.
#[derive(Debug, Clone)]
pub struct ImapResponse {
    pub tag: String,
    pub status: Status,
    /// Text of the completion line after the status word.
    pub message: String,
    /// Untagged data, literals and the completion line, as received.
    pub raw: Vec<u8>,
}

impl ImapResponse {
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    /// Message count from an untagged `* <n> EXISTS`.
    pub fn exists(&self) -> Option<u32> {
        segments(&self.raw).find_map(|segment| {
            let line = std::str::from_utf8(segment.line).ok()?;
            let mut words = line.split_ascii_whitespace();
            match (words.next(), words.next(), words.next()) {
                (Some("*"), Some(count), Some(keyword)) if keyword.eq_ignore_ascii_case("EXISTS") => {
                    count.parse().ok()
                }
                _ => None,
            }
        })
    }

    /// Sequence numbers from every `* SEARCH` line, ascending and unique.
    pub fn search_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = segments(&self.raw)
            .filter_map(|segment| std::str::from_utf8(segment.line).ok())
            .filter_map(|line| {
                let mut words = line.split_ascii_whitespace();
                match (words.next(), words.next()) {
                    (Some("*"), Some(keyword)) if keyword.eq_ignore_ascii_case("SEARCH") => {
                        Some(words.filter_map(|w| w.parse::<u32>().ok()).collect::<Vec<_>>())
                    }
                    _ => None,
                }
            })
            .flatten()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Payload of the first literal inside an untagged `FETCH` response.
    pub fn fetch_literal(&self) -> Option<Vec<u8>> {
        segments(&self.raw).find_map(|segment| {
            let literal = segment.literal?;
            let line = String::from_utf8_lossy(segment.line).to_ascii_uppercase();
            (line.starts_with("* ") && line.contains("FETCH")).then(|| literal.to_vec())
        })
    }
}

pub(crate) struct Completion {
    pub status: Status,
    pub message: String,
    /// Offset just past the completion line.
    pub end: usize,
}

/// Finds the tagged completion line for `tag`, skipping literal payloads so
/// message content can never be mistaken for it. `None` means more input is needed.
pub(crate) fn find_completion(buffer: &[u8], tag: &str) -> Option<Completion> {
    let prefix = tag.as_bytes();
    segments(buffer).find_map(|segment| {
        if segment.literal.is_some() {
            return None;
        }
        let rest = segment.line.strip_prefix(prefix)?.strip_prefix(b" ")?;
        let word_end = rest.iter().position(|b| *b == b' ').unwrap_or(rest.len());
        let status = Status::parse(&rest[..word_end])?;
        let message = String::from_utf8_lossy(&rest[word_end..]).trim().to_string();
        Some(Completion {
            status,
            message,
            end: segment.end,
        })
    })
}

pub(crate) struct Segment<'a> {
    /// Line text without the trailing CRLF.
    pub line: &'a [u8],
    /// Literal announced at the end of `line`, when one was.
    pub literal: Option<&'a [u8]>,
    /// Offset just past this segment (and its literal).
    pub end: usize,
}

/// Iterates complete lines; a line announcing `{n}` carries the next n bytes.
/// Stops at the first incomplete line or literal.
pub(crate) fn segments(buffer: &[u8]) -> impl Iterator<Item = Segment<'_>> {
    let mut position = 0;
    std::iter::from_fn(move || {
        let rest = &buffer[position..];
        let newline = rest.iter().position(|b| *b == b'\n')?;
        let line_with_break = &rest[..newline];
        let line = line_with_break
            .strip_suffix(b"\r")
            .unwrap_or(line_with_break);
        let mut end = position + newline + 1;
        let literal = match literal_length(line) {
            Some(length) => {
                let literal_end = end.checked_add(length)?;
                if literal_end > buffer.len() {
                    return None;
                }
                let literal = &buffer[end..literal_end];
                end = literal_end;
                Some(literal)
            }
            None => None,
        };
        position = end;
        Some(Segment { line, literal, end })
    })
}

/// Length from a trailing `{n}` or `{n+}` literal marker.
fn literal_length(line: &[u8]) -> Option<usize> {
    let inner = line.strip_suffix(b"}")?;
    let open = inner.iter().rposition(|b| *b == b'{')?;
    let digits = &inner[open + 1..];
    let digits = digits.strip_suffix(b"+").unwrap_or(digits);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}
