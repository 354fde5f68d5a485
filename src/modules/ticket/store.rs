// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::future::Future;

use crate::modules::error::TicketMailResult;
use crate::modules::ticket::entity::SenderType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketRef {
    pub id: u64,
    pub ticket_number: u64,
}

/// Ticket opened from an inbound email; it always starts `open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub subject: String,
    pub user_email: String,
    pub user_id: Option<u64>,
    pub original_message_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub ticket_id: u64,
    pub sender_email: String,
    pub sender_name: Option<String>,
    pub sender_type: SenderType,
    pub body: String,
    pub body_html: Option<String>,
    pub message_id: Option<String>,
    pub in_reply_to: Option<String>,
    /// Milliseconds since the epoch, from the `Date` header.
    pub received_at: i64,
}

/// Persistence the ingestion pipeline depends on.
pub trait TicketStore: Send + Sync {
    /// Ticket owning a message whose `message_id` is one of `references`.
    fn find_ticket_by_message_ref(
        &self,
        references: &[String],
    ) -> impl Future<Output = TicketMailResult<Option<TicketRef>>> + Send;

    fn find_ticket_by_number(
        &self,
        ticket_number: u64,
    ) -> impl Future<Output = TicketMailResult<Option<TicketRef>>> + Send;

    fn find_user_id_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = TicketMailResult<Option<u64>>> + Send;

    fn create_ticket(
        &self,
        ticket: NewTicket,
    ) -> impl Future<Output = TicketMailResult<TicketRef>> + Send;

    fn message_exists(&self, message_id: &str)
        -> impl Future<Output = TicketMailResult<bool>> + Send;

    /// Fails with `DuplicateMessage` when `message_id` is already stored.
    fn insert_message(
        &self,
        message: NewMessage,
    ) -> impl Future<Output = TicketMailResult<()>> + Send;

    /// Moves a ticket waiting on the customer (or closed) back to support.
    fn record_user_reply(&self, ticket_id: u64)
        -> impl Future<Output = TicketMailResult<()>> + Send;
}
