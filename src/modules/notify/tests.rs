// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use mail_send::smtp::message::IntoMessage;

use crate::modules::notify::{
    smtp::SmtpNotifier, AutoReplyRequest, DisabledNotifier, Notifier, TicketMailNotifier,
};

fn request(subject: &str) -> AutoReplyRequest {
    AutoReplyRequest {
        to: "jane@x.com".into(),
        to_name: Some("Jane".into()),
        ticket_number: 1,
        ticket_id: 77,
        subject: subject.into(),
        in_reply_to: Some("<abc@x.com>".into()),
    }
}

#[test]
fn reply_subject_carries_the_ticket_tag() {
    assert_eq!(
        request("Billing question").reply_subject(),
        "[Ticket #1] Billing question"
    );
    assert_eq!(
        request("Re: [Ticket #1] Billing question").reply_subject(),
        "Re: [Ticket #1] Billing question"
    );
}

#[test]
fn html_body_escapes_the_subject() {
    let html = request("<script>alert(1)</script>").html_body();
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[test]
fn auto_reply_message_threads_onto_the_customer_mail() {
    let notifier = SmtpNotifier::new(
        "smtp.example.com".into(),
        465,
        "Support".into(),
        "support@example.com".into(),
    );
    let message = notifier
        .build_message(&request("Billing question"))
        .into_message()
        .unwrap();
    let raw = String::from_utf8_lossy(&message.body).to_string();
    assert!(raw.contains("[Ticket #1] Billing question"));
    assert!(raw.contains("In-Reply-To: <abc@x.com>"));
    assert!(raw.contains("References: <abc@x.com>"));
    assert!(raw.contains("Auto-Submitted: auto-replied"));
    assert!(raw.contains("jane@x.com"));
    assert!(!raw.contains("<<abc@x.com>>"));
}

#[tokio::test]
async fn unconfigured_smtp_disables_auto_replies() {
    let notifier = TicketMailNotifier::from_settings();
    assert!(matches!(notifier, TicketMailNotifier::Disabled(_)));
    notifier
        .send_auto_reply(request("Billing question"))
        .await
        .unwrap();
    DisabledNotifier
        .send_auto_reply(request("Billing question"))
        .await
        .unwrap();
}
