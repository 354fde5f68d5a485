// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use base64::{engine::general_purpose, Engine};

use crate::get_encoding;
use crate::modules::mime::header::TransferEncoding;

/// Decodes a quoted-printable string. Malformed escapes are kept verbatim.
pub fn decode_quoted_printable(input: &str) -> String {
    if !input.contains('=') {
        return input.to_string();
    }
    String::from_utf8_lossy(&quoted_printable_bytes(input.as_bytes())).into_owned()
}

/// Decodes a base64 string, returning the input unchanged when it is not valid base64.
pub fn decode_base64(input: &str) -> String {
    match base64_bytes(input.as_bytes()) {
        Some(decoded) => String::from_utf8_lossy(&decoded).into_owned(),
        None => input.to_string(),
    }
}

pub fn quoted_printable_bytes(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let byte = input[i];
        if byte != b'=' {
            output.push(byte);
            i += 1;
            continue;
        }
        let rest = &input[i + 1..];
        // Soft line break, possibly with trailing whitespace before the newline.
        let padding = rest
            .iter()
            .take_while(|b| **b == b' ' || **b == b'\t')
            .count();
        let after_padding = &rest[padding..];
        if after_padding.starts_with(b"\r\n") {
            i += 1 + padding + 2;
            continue;
        }
        if after_padding.starts_with(b"\n") {
            i += 1 + padding + 1;
            continue;
        }
        match (rest.first(), rest.get(1)) {
            (Some(high), Some(low)) if high.is_ascii_hexdigit() && low.is_ascii_hexdigit() => {
                output.push(hex_value(*high) << 4 | hex_value(*low));
                i += 3;
            }
            _ => {
                output.push(b'=');
                i += 1;
            }
        }
    }
    output
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

pub fn base64_bytes(input: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    general_purpose::STANDARD.decode(compact).ok()
}

/// Undoes a content-transfer-encoding. Undecodable base64 is passed through.
pub fn decode_transfer(body: &[u8], encoding: TransferEncoding) -> Vec<u8> {
    match encoding {
        TransferEncoding::QuotedPrintable => quoted_printable_bytes(body),
        TransferEncoding::Base64 => base64_bytes(body).unwrap_or_else(|| body.to_vec()),
        TransferEncoding::Identity => body.to_vec(),
    }
}

/// Converts bytes in `charset` to a string; unknown charsets are read as UTF-8.
pub fn decode_charset(bytes: &[u8], charset: Option<&str>) -> String {
    if let Some(encoding) = charset.and_then(|label| get_encoding!(label)) {
        let (text, _, _) = encoding.decode(bytes);
        return text.into_owned();
    }
    String::from_utf8_lossy(bytes).into_owned()
}
