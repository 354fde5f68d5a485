// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::mime::{
    decoder::{decode_base64, decode_charset, decode_quoted_printable},
    header::{
        decode_encoded_words, extract_message_ids, normalize_message_id, ContentType,
        ParsedHeaders, TransferEncoding,
    },
    parser::{parse, parse_headers},
    part::MimePart,
};

#[test]
fn quoted_printable_leaves_plain_ascii_alone() {
    let plain = "Hello, world! Nothing to decode here.";
    assert_eq!(decode_quoted_printable(plain), plain);
    assert_eq!(
        decode_quoted_printable(&decode_quoted_printable(plain)),
        plain
    );
}

#[test]
fn quoted_printable_soft_breaks_and_escapes() {
    assert_eq!(decode_quoted_printable("caf=C3=A9"), "café");
    assert_eq!(decode_quoted_printable("long =\r\nline"), "long line");
    assert_eq!(decode_quoted_printable("long =\nline"), "long line");
    assert_eq!(decode_quoted_printable("a=3Db"), "a=b");
}

#[test]
fn quoted_printable_keeps_malformed_escapes() {
    assert_eq!(decode_quoted_printable("100=ZZ"), "100=ZZ");
    assert_eq!(decode_quoted_printable("trailing="), "trailing=");
    assert_eq!(decode_quoted_printable("x=4"), "x=4");
}

#[test]
fn base64_decodes_and_ignores_whitespace() {
    assert_eq!(decode_base64("SGVsbG8gd29ybGQ="), "Hello world");
    assert_eq!(decode_base64("SGVsbG8g\r\nd29ybGQ=\r\n"), "Hello world");
    assert_eq!(decode_base64("R3LDvMOfZQ=="), "Grüße");
}

#[test]
fn base64_failure_returns_input() {
    assert_eq!(decode_base64("not base64 at all!"), "not base64 at all!");
    assert_eq!(decode_base64("SGVsbG8"), "SGVsbG8");
}

#[test]
fn charset_conversion() {
    assert_eq!(decode_charset(b"caf\xe9", Some("iso-8859-1")), "café");
    assert_eq!(decode_charset("café".as_bytes(), Some("utf-8")), "café");
    assert_eq!(decode_charset(b"plain", Some("x-unknown")), "plain");
    assert_eq!(decode_charset(b"plain", None), "plain");
}

#[test]
fn headers_fold_and_keep_first_occurrence() {
    let headers = ParsedHeaders::parse(
        "Subject: Hello\r\n  folded world\r\nX-Custom: one\r\nx-custom: two\r\nFrom: a@x.com",
    );
    assert_eq!(headers.get("subject"), Some("Hello folded world"));
    assert_eq!(headers.get("Subject"), Some("Hello folded world"));
    assert_eq!(headers.get("x-custom"), Some("one"));
    assert_eq!(headers.get("from"), Some("a@x.com"));
    assert_eq!(headers.len(), 3);
}

#[test]
fn dropped_duplicate_does_not_absorb_continuations() {
    let headers = ParsedHeaders::parse("To: a@x.com\r\nTo: b@x.com\r\n c@x.com\r\nSubject: s");
    assert_eq!(headers.get("to"), Some("a@x.com"));
    assert_eq!(headers.get("subject"), Some("s"));
}

#[test]
fn content_type_parameters() {
    let quoted = ContentType::parse("Multipart/Alternative; boundary=\"abc; def\"; charset=UTF-8");
    assert!(quoted.is_multipart());
    assert_eq!(quoted.mime_type, "multipart/alternative");
    assert_eq!(quoted.boundary(), Some("abc; def"));
    assert_eq!(quoted.charset(), Some("UTF-8"));

    let bare = ContentType::parse("multipart/mixed; boundary=simple123");
    assert_eq!(bare.boundary(), Some("simple123"));

    assert_eq!(
        TransferEncoding::from_header(Some(" Quoted-Printable ")),
        TransferEncoding::QuotedPrintable
    );
    assert_eq!(
        TransferEncoding::from_header(Some("8bit")),
        TransferEncoding::Identity
    );
}

#[test]
fn alternative_message_yields_text_and_html() {
    let raw = "From: Jane <jane@x.com>\r\n\
               Subject: Hi\r\n\
               Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
               \r\n\
               --b1\r\n\
               Content-Type: text/plain; charset=utf-8\r\n\
               \r\n\
               Hello plain\r\n\
               --b1\r\n\
               Content-Type: text/html\r\n\
               \r\n\
               <p>Hello html</p>\r\n\
               --b1--\r\n";
    let message = parse(raw);
    assert_eq!(message.body.text, "Hello plain");
    assert_eq!(message.body.html.as_deref(), Some("<p>Hello html</p>"));
    assert!(!message.body.text.contains("--b1"));
    assert!(!message.body.html.unwrap_or_default().contains("--b1"));
    assert_eq!(message.headers.get("subject"), Some("Hi"));
}

#[test]
fn nested_multipart_decodes_each_leaf() {
    let raw = "Subject: Nested\r\n\
               Content-Type: multipart/mixed; boundary=outer\r\n\
               \r\n\
               This is a preamble.\r\n\
               --outer\r\n\
               Content-Type: multipart/alternative; boundary=\"inner\"\r\n\
               \r\n\
               --inner\r\n\
               Content-Type: text/plain\r\n\
               Content-Transfer-Encoding: base64\r\n\
               \r\n\
               SGVsbG8gZnJvbSBiYXNlNjQ=\r\n\
               --inner\r\n\
               Content-Type: text/html; charset=utf-8\r\n\
               Content-Transfer-Encoding: quoted-printable\r\n\
               \r\n\
               <p>caf=C3=A9</p>\r\n\
               --inner--\r\n\
               --outer\r\n\
               Content-Type: text/plain\r\n\
               Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
               \r\n\
               attached notes\r\n\
               --outer--\r\n";
    let message = parse(raw);
    assert_eq!(message.body.text, "Hello from base64");
    assert_eq!(message.body.html.as_deref(), Some("<p>café</p>"));
    match &message.root {
        MimePart::Multipart { parts, boundary, .. } => {
            assert_eq!(boundary, "outer");
            assert_eq!(parts.len(), 2);
            assert!(matches!(parts[0], MimePart::Multipart { .. }));
        }
        other => panic!("expected multipart root, got {:?}", other),
    }
}

#[test]
fn first_plain_part_wins_and_attachments_are_skipped() {
    let raw = "Content-Type: multipart/mixed; boundary=zz\n\
               \n\
               --zz\n\
               Content-Type: text/plain\n\
               Content-Disposition: attachment\n\
               \n\
               not the body\n\
               --zz\n\
               Content-Type: text/plain\n\
               \n\
               first body\n\
               --zz\n\
               Content-Type: text/plain\n\
               \n\
               second body\n\
               --zz--\n";
    let message = parse(raw);
    assert_eq!(message.body.text, "first body");
    assert_eq!(message.body.html, None);
}

#[test]
fn single_part_html_leaves_text_empty() {
    let raw = "Content-Type: text/html; charset=utf-8\r\n\
               Content-Transfer-Encoding: quoted-printable\r\n\
               \r\n\
               <b>Gr=C3=BC=C3=9Fe</b>";
    let message = parse(raw);
    assert_eq!(message.body.text, "");
    assert_eq!(message.body.html.as_deref(), Some("<b>Grüße</b>"));
}

#[test]
fn single_part_plain_uses_top_level_encoding() {
    let raw = "Subject: b64\r\nContent-Transfer-Encoding: base64\r\n\r\nSGVsbG8gd29ybGQ=\r\n";
    let message = parse(raw);
    assert_eq!(message.body.text, "Hello world");
    assert_eq!(message.body.html, None);
}

#[test]
fn multipart_without_boundary_falls_back_to_plain_text() {
    let raw = "Content-Type: multipart/mixed\r\n\r\njust some text";
    let message = parse(raw);
    assert_eq!(message.body.text, "just some text");
    assert_eq!(message.body.html, None);

    let raw = "Content-Type: multipart/mixed; boundary=missing\r\n\r\nno delimiters here";
    let message = parse(raw);
    assert_eq!(message.body.text, "no delimiters here");
}

#[test]
fn message_without_body_separator() {
    let message = parse("Subject: only headers");
    assert_eq!(message.headers.get("subject"), Some("only headers"));
    assert_eq!(message.body.text, "");
    assert_eq!(message.body.html, None);
}

#[test]
fn header_only_pass() {
    let headers = parse_headers(b"From: a@x.com\r\nSubject: Quick\r\n\r\nSubject: not a header");
    assert_eq!(headers.get("subject"), Some("Quick"));
}

#[test]
fn encoded_words() {
    assert_eq!(decode_encoded_words("=?UTF-8?Q?Caf=C3=A9_time?="), "Café time");
    assert_eq!(decode_encoded_words("Re: =?ISO-8859-1?Q?caf=E9?="), "Re: café");
    assert_eq!(
        decode_encoded_words("=?utf-8?B?SGVsbG8=?= =?utf-8?B?IHdvcmxk?="),
        "Hello world"
    );
    assert_eq!(decode_encoded_words("plain subject"), "plain subject");
}

#[test]
fn message_id_tokens() {
    assert_eq!(
        extract_message_ids("<a@x.com>\r\n <b@y.com>"),
        vec!["<a@x.com>".to_string(), "<b@y.com>".to_string()]
    );
    assert_eq!(extract_message_ids("a@x.com"), vec!["<a@x.com>".to_string()]);
    assert!(extract_message_ids("   ").is_empty());
    assert_eq!(normalize_message_id(" abc@x.com "), Some("<abc@x.com>".into()));
    assert_eq!(normalize_message_id("<>"), None);
}
