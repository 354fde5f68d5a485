// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::modules::error::TicketMailResult;
use crate::modules::inbound::InboundEmail;
use crate::modules::ticket::store::{NewTicket, TicketRef, TicketStore};

pub const DEFAULT_SUBJECT: &str = "No Subject";

static TICKET_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[ticket #(\d+)\]").expect("ticket tag regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub ticket_id: u64,
    pub ticket_number: u64,
    pub is_new: bool,
}

impl Resolution {
    fn existing(ticket: TicketRef) -> Self {
        Self {
            ticket_id: ticket.id,
            ticket_number: ticket.ticket_number,
            is_new: false,
        }
    }
}

/// `N` from a `[Ticket #N]` tag anywhere in the subject.
pub fn ticket_number_from_subject(subject: &str) -> Option<u64> {
    TICKET_TAG
        .captures(subject)
        .and_then(|captures| captures.get(1))
        .and_then(|number| number.as_str().parse().ok())
}

/// Maps an inbound email onto a ticket: reply headers first, then the subject
/// tag, otherwise a new ticket.
pub struct TicketThreader<'a, S> {
    store: &'a S,
}

impl<'a, S: TicketStore> TicketThreader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, email: &InboundEmail) -> TicketMailResult<Resolution> {
        let references = email.reference_ids();
        if !references.is_empty() {
            if let Some(ticket) = self.store.find_ticket_by_message_ref(&references).await? {
                debug!(
                    "Threaded {:?} onto ticket #{} by reply headers",
                    email.message_id, ticket.ticket_number
                );
                return Ok(Resolution::existing(ticket));
            }
        }

        if let Some(number) = email.subject.as_deref().and_then(ticket_number_from_subject) {
            if let Some(ticket) = self.store.find_ticket_by_number(number).await? {
                debug!(
                    "Threaded {:?} onto ticket #{} by subject tag",
                    email.message_id, ticket.ticket_number
                );
                return Ok(Resolution::existing(ticket));
            }
            debug!("Subject names ticket #{number}, which does not exist");
        }

        let user_id = self.store.find_user_id_by_email(&email.from_email).await?;
        let ticket = self
            .store
            .create_ticket(NewTicket {
                subject: email
                    .subject
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
                user_email: email.from_email.clone(),
                user_id,
                original_message_id: email.message_id.clone(),
            })
            .await?;
        Ok(Resolution {
            ticket_id: ticket.id,
            ticket_number: ticket.ticket_number,
            is_new: true,
        })
    }
}
