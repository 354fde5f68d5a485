// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Enum)]
#[oai(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    AwaitingSupport,
    AwaitingUser,
    Closed,
}

impl TicketStatus {
    /// Status after the customer writes in again.
    pub fn after_user_reply(self) -> Self {
        match self {
            TicketStatus::AwaitingUser | TicketStatus::Closed => TicketStatus::AwaitingSupport,
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Enum)]
#[oai(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    #[default]
    User,
    Admin,
}

/// A support conversation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct Ticket {
    #[primary_key]
    pub id: u64,
    /// Human-facing sequential number, as used in `[Ticket #N]` subjects.
    #[secondary_key(unique)]
    pub ticket_number: u64,
    pub subject: String,
    #[secondary_key]
    pub user_email: String,
    pub user_id: Option<u64>,
    pub status: TicketStatus,
    /// `Message-Id` of the email that opened the ticket.
    pub original_message_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub closed_at: Option<i64>,
}

/// One inbound or outbound email on a ticket. Ids are assigned in insertion
/// order, so sorting by id gives the conversation order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct TicketMessage {
    #[primary_key]
    pub id: u64,
    #[secondary_key]
    pub ticket_id: u64,
    pub sender_email: String,
    pub sender_name: Option<String>,
    pub sender_type: SenderType,
    pub body: String,
    pub body_html: Option<String>,
    /// Unique across the store; the deduplication key.
    #[secondary_key(unique, optional)]
    pub message_id: Option<String>,
    pub in_reply_to: Option<String>,
    pub is_internal_note: bool,
    /// When the sender's client dated the email.
    pub received_at: i64,
    /// When ticketmail stored it.
    pub created_at: i64,
}

/// Registered customer, used to attach `user_id` to new tickets.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct UserProfile {
    #[primary_key]
    pub id: u64,
    #[secondary_key(unique)]
    pub email: String,
    pub name: Option<String>,
    pub created_at: i64,
}
