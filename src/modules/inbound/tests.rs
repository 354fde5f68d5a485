// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::inbound::{
    classifier::{is_auto_reply, is_auto_submitted},
    stripper::strip,
    InboundEmail,
};
use crate::modules::mime::{header::ParsedHeaders, parser::parse};

#[test]
fn strips_attribution_and_quotes() {
    assert_eq!(
        strip("Thanks!\n\nOn Mon, Jan 1 2024, Bob wrote:\n> original"),
        "Thanks!"
    );
}

#[test]
fn strips_wrapped_attribution() {
    let text = "Sounds good.\r\n\r\nOn Tue, Feb 6, 2024 at 9:12 AM Support Team <\r\nsupport@example.com> wrote:\r\n> earlier";
    assert_eq!(strip(text), "Sounds good.");
}

#[test]
fn strips_outlook_style_history() {
    let text = "See attached.\n\n-----Original Message-----\nFrom: Support <support@example.com>\nSent: Monday, March 4, 2024 10:00 AM";
    assert_eq!(strip(text), "See attached.");

    let text = "Quick note\nFrom: Support <support@example.com>\nSubject: Re: order";
    assert_eq!(strip(text), "Quick note");

    let text = "Reply here\nSent: Tuesday, 5 March 2024\nTo: someone";
    assert_eq!(strip(text), "Reply here");
}

#[test]
fn strips_signature_delimiter() {
    assert_eq!(strip("Please call me.\n-- \nJane Doe\nACME"), "Please call me.");
    assert_eq!(strip("Please call me.\n--\nJane"), "Please call me.");
}

#[test]
fn keeps_text_without_markers() {
    assert_eq!(
        strip("  First line\nSecond line - with a dash\n"),
        "First line\nSecond line - with a dash"
    );
    assert_eq!(strip("On second thought, never mind."), "On second thought, never mind.");
}

#[test]
fn fully_quoted_reply_is_empty() {
    assert_eq!(strip("> only quoted\n> content"), "");
    assert_eq!(strip(""), "");
}

#[test]
fn auto_reply_patterns() {
    assert!(is_auto_reply("Out of Office: Re: Hi", "jane@x.com"));
    assert!(!is_auto_reply("Re: My order", "jane@x.com"));
    assert!(is_auto_reply("Undeliverable: Billing question", "someone@x.com"));
    assert!(is_auto_reply("Hello", "MAILER-DAEMON@mail.example.com"));
    assert!(is_auto_reply("Hello", "NoReply@shop.example"));
    assert!(is_auto_reply("Automatic reply: vacation", "bob@x.com"));
    assert!(is_auto_reply("Delivery Status Notification (Failure)", "x@y.com"));
    assert!(!is_auto_reply("No reply yet on my ticket", "bob@x.com"));
}

#[test]
fn auto_submitted_headers() {
    let auto = ParsedHeaders::parse("Auto-Submitted: auto-replied");
    assert!(is_auto_submitted(&auto));

    let human = ParsedHeaders::parse("Auto-Submitted: no\r\nSubject: hi");
    assert!(!is_auto_submitted(&human));

    let bulk = ParsedHeaders::parse("Precedence: Bulk");
    assert!(is_auto_submitted(&bulk));

    let report = ParsedHeaders::parse("Content-Type: multipart/report; report-type=delivery-status");
    assert!(is_auto_submitted(&report));

    let vacation = ParsedHeaders::parse("X-Autoreply: yes");
    assert!(is_auto_submitted(&vacation));

    assert!(!is_auto_submitted(&ParsedHeaders::parse("Subject: Billing")));
}

#[test]
fn inbound_email_from_parsed_message() {
    let raw = "From: \"Jane Doe\" <Jane@X.com>\r\n\
               To: Support <support@example.com>\r\n\
               Subject: =?UTF-8?Q?Billing_question?=\r\n\
               Message-Id: <abc@x.com>\r\n\
               In-Reply-To: <prev@example.com>\r\n\
               References: <root@example.com> <prev@example.com>\r\n\
               Date: Mon, 01 Jan 2024 10:00:00 +0000 (UTC)\r\n\
               \r\n\
               Why was I charged twice?\r\n\r\n> quoted stuff\r\n";
    let email = InboundEmail::from_parsed(&parse(raw));
    assert_eq!(email.from_email, "jane@x.com");
    assert_eq!(email.from_name.as_deref(), Some("Jane Doe"));
    assert_eq!(email.to_email.as_deref(), Some("support@example.com"));
    assert_eq!(email.subject.as_deref(), Some("Billing question"));
    assert_eq!(email.message_id.as_deref(), Some("<abc@x.com>"));
    assert_eq!(email.body_text, "Why was I charged twice?");
    assert_eq!(email.received_at, 1_704_103_200_000);
    assert_eq!(
        email.reference_ids(),
        vec![
            "<prev@example.com>".to_string(),
            "<root@example.com>".to_string()
        ]
    );
    assert!(!email.is_empty());
}

#[test]
fn content_message_id_is_stable() {
    let raw = "From: bob@y.com\r\nSubject: No id\r\nDate: Mon, 01 Jan 2024 10:00:00 +0000\r\n\r\nhello";
    let first = InboundEmail::from_parsed(&parse(raw));
    let second = InboundEmail::from_parsed(&parse(raw));
    assert_eq!(first.message_id, None);
    assert_eq!(first.content_message_id(), second.content_message_id());
    assert!(first.content_message_id().ends_with(".content@ticketmail>"));
}
