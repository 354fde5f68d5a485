// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::database::manager::DatabaseManager;
use crate::modules::error::code::ErrorCode;
use crate::modules::inbound::InboundEmail;
use crate::modules::ticket::{
    entity::{SenderType, TicketStatus},
    native::NativeTicketStore,
    store::{NewMessage, NewTicket, TicketStore},
    threader::{ticket_number_from_subject, TicketThreader, DEFAULT_SUBJECT},
};

fn new_ticket(subject: &str, email: &str) -> NewTicket {
    NewTicket {
        subject: subject.into(),
        user_email: email.into(),
        user_id: None,
        original_message_id: None,
    }
}

fn new_message(ticket_id: u64, message_id: Option<&str>, body: &str) -> NewMessage {
    NewMessage {
        ticket_id,
        sender_email: "jane@x.com".into(),
        sender_name: Some("Jane".into()),
        sender_type: SenderType::User,
        body: body.into(),
        body_html: None,
        message_id: message_id.map(str::to_string),
        in_reply_to: None,
        received_at: 1_704_103_200_000,
    }
}

fn inbound(subject: Option<&str>, in_reply_to: Option<&str>) -> InboundEmail {
    InboundEmail {
        from_email: "jane@x.com".into(),
        from_name: Some("Jane".into()),
        to_email: Some("support@example.com".into()),
        subject: subject.map(str::to_string),
        message_id: Some("<new@x.com>".into()),
        in_reply_to: in_reply_to.map(str::to_string),
        references: vec![],
        body_text: "hello".into(),
        body_html: None,
        received_at: 0,
        date_header: None,
    }
}

#[test]
fn subject_tag_extraction() {
    assert_eq!(ticket_number_from_subject("Re: [Ticket #42] Help"), Some(42));
    assert_eq!(ticket_number_from_subject("re: [TICKET #7]"), Some(7));
    assert_eq!(ticket_number_from_subject("Ticket #42 without brackets"), None);
    assert_eq!(ticket_number_from_subject("[Ticket #]"), None);
}

#[test]
fn user_reply_transitions() {
    assert_eq!(TicketStatus::Open.after_user_reply(), TicketStatus::Open);
    assert_eq!(
        TicketStatus::AwaitingSupport.after_user_reply(),
        TicketStatus::AwaitingSupport
    );
    assert_eq!(
        TicketStatus::AwaitingUser.after_user_reply(),
        TicketStatus::AwaitingSupport
    );
    assert_eq!(
        TicketStatus::Closed.after_user_reply(),
        TicketStatus::AwaitingSupport
    );
}

#[tokio::test]
async fn ticket_numbers_are_sequential() {
    let store = NativeTicketStore::in_memory().unwrap();
    let first = store.create_ticket(new_ticket("A", "a@x.com")).await.unwrap();
    let second = store.create_ticket(new_ticket("B", "b@x.com")).await.unwrap();
    assert_eq!(first.ticket_number, 1);
    assert_eq!(second.ticket_number, 2);
    assert_ne!(first.id, second.id);

    let ticket = store.get_ticket_by_number(2).await.unwrap().unwrap();
    assert_eq!(ticket.subject, "B");
    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.closed_at, None);

    let listed = store.list_tickets().await.unwrap();
    assert_eq!(
        listed.iter().map(|t| t.ticket_number).collect::<Vec<_>>(),
        vec![2, 1]
    );
}

#[tokio::test]
async fn message_id_is_unique() {
    let store = NativeTicketStore::in_memory().unwrap();
    let ticket = store.create_ticket(new_ticket("A", "a@x.com")).await.unwrap();

    store
        .insert_message(new_message(ticket.id, Some("<abc@x.com>"), "first"))
        .await
        .unwrap();
    assert!(store.message_exists("<abc@x.com>").await.unwrap());
    assert!(!store.message_exists("<other@x.com>").await.unwrap());

    let error = store
        .insert_message(new_message(ticket.id, Some("<abc@x.com>"), "again"))
        .await
        .unwrap_err();
    assert_eq!(error.code(), ErrorCode::DuplicateMessage);

    // Messages without an id are never considered duplicates.
    store
        .insert_message(new_message(ticket.id, None, "no id 1"))
        .await
        .unwrap();
    store
        .insert_message(new_message(ticket.id, None, "no id 2"))
        .await
        .unwrap();

    let messages = store.list_messages(ticket.id).await.unwrap();
    assert_eq!(
        messages.iter().map(|m| m.body.as_str()).collect::<Vec<_>>(),
        vec!["first", "no id 1", "no id 2"]
    );
}

#[tokio::test]
async fn message_reference_lookup() {
    let store = NativeTicketStore::in_memory().unwrap();
    let ticket = store.create_ticket(new_ticket("A", "a@x.com")).await.unwrap();
    store
        .insert_message(new_message(ticket.id, Some("<root@x.com>"), "root"))
        .await
        .unwrap();

    let found = store
        .find_ticket_by_message_ref(&["<unknown@x.com>".into(), "<root@x.com>".into()])
        .await
        .unwrap();
    assert_eq!(found, Some(ticket));
    assert_eq!(
        store
            .find_ticket_by_message_ref(&["<unknown@x.com>".into()])
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn user_reply_reopens_waiting_and_closed_tickets() {
    let store = NativeTicketStore::in_memory().unwrap();
    let ticket = store.create_ticket(new_ticket("A", "a@x.com")).await.unwrap();

    store.record_user_reply(ticket.id).await.unwrap();
    let current = store.get_ticket_by_number(1).await.unwrap().unwrap();
    assert_eq!(current.status, TicketStatus::Open);

    let closed = store.set_status(ticket.id, TicketStatus::Closed).await.unwrap();
    assert_eq!(closed.status, TicketStatus::Closed);
    assert!(closed.closed_at.is_some());

    store.record_user_reply(ticket.id).await.unwrap();
    let reopened = store.get_ticket_by_number(1).await.unwrap().unwrap();
    assert_eq!(reopened.status, TicketStatus::AwaitingSupport);
    assert_eq!(reopened.closed_at, None);

    store
        .set_status(ticket.id, TicketStatus::AwaitingUser)
        .await
        .unwrap();
    store.record_user_reply(ticket.id).await.unwrap();
    let current = store.get_ticket_by_number(1).await.unwrap().unwrap();
    assert_eq!(current.status, TicketStatus::AwaitingSupport);

    let error = store.record_user_reply(404).await.unwrap_err();
    assert_eq!(error.code(), ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn duplicate_user_profile_is_rejected() {
    let store = NativeTicketStore::in_memory().unwrap();
    let user = store
        .register_user("Jane@X.com".into(), Some("Jane".into()))
        .await
        .unwrap();
    assert_eq!(user.email, "jane@x.com");
    assert_eq!(
        store.find_user_id_by_email("jane@x.com").await.unwrap(),
        Some(user.id)
    );
    let error = store
        .register_user("jane@x.com".into(), None)
        .await
        .unwrap_err();
    assert_eq!(error.code(), ErrorCode::AlreadyExists);
}

#[tokio::test]
async fn subject_tag_resolves_existing_ticket() {
    let store = NativeTicketStore::in_memory().unwrap();
    for n in 1..=42 {
        store
            .create_ticket(new_ticket(&format!("T{n}"), "a@x.com"))
            .await
            .unwrap();
    }
    let threader = TicketThreader::new(&store);
    let resolution = threader
        .resolve(&inbound(Some("Re: [Ticket #42] Help"), None))
        .await
        .unwrap();
    assert_eq!(resolution.ticket_number, 42);
    assert!(!resolution.is_new);
}

#[tokio::test]
async fn reply_headers_beat_subject_tag() {
    let store = NativeTicketStore::in_memory().unwrap();
    let mut seventh = None;
    for n in 1..=42 {
        let ticket = store
            .create_ticket(new_ticket(&format!("T{n}"), "a@x.com"))
            .await
            .unwrap();
        if n == 7 {
            seventh = Some(ticket);
        }
    }
    let seventh = seventh.unwrap();
    store
        .insert_message(new_message(seventh.id, Some("<admin-reply@support>"), "answer"))
        .await
        .unwrap();

    let threader = TicketThreader::new(&store);
    let resolution = threader
        .resolve(&inbound(
            Some("Re: [Ticket #42] Help"),
            Some("<admin-reply@support>"),
        ))
        .await
        .unwrap();
    assert_eq!(resolution.ticket_number, 7);
    assert_eq!(resolution.ticket_id, seventh.id);
    assert!(!resolution.is_new);
}

#[tokio::test]
async fn unknown_tag_and_no_subject_create_a_ticket() {
    let store = NativeTicketStore::in_memory().unwrap();
    let user = store.register_user("jane@x.com".into(), None).await.unwrap();
    let threader = TicketThreader::new(&store);

    let resolution = threader
        .resolve(&inbound(Some("[Ticket #99] where is it"), None))
        .await
        .unwrap();
    assert!(resolution.is_new);
    assert_eq!(resolution.ticket_number, 1);

    let resolution = threader.resolve(&inbound(None, None)).await.unwrap();
    assert!(resolution.is_new);
    let ticket = store
        .get_ticket_by_number(resolution.ticket_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ticket.subject, DEFAULT_SUBJECT);
    assert_eq!(ticket.user_email, "jane@x.com");
    assert_eq!(ticket.user_id, Some(user.id));
    assert_eq!(ticket.original_message_id.as_deref(), Some("<new@x.com>"));
}

#[tokio::test]
async fn on_disk_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tickets.db");
    {
        let store = NativeTicketStore::new(DatabaseManager::on_disk(&path).unwrap());
        store
            .create_ticket(new_ticket("Persisted", "a@x.com"))
            .await
            .unwrap();
    }
    let store = NativeTicketStore::new(DatabaseManager::on_disk(&path).unwrap());
    let ticket = store.get_ticket_by_number(1).await.unwrap().unwrap();
    assert_eq!(ticket.subject, "Persisted");
}
