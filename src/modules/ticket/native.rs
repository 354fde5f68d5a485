// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use native_db::Database;
use tracing::info;

use crate::modules::database::manager::DatabaseManager;
use crate::modules::database::{
    async_find_impl, filter_by_secondary_key_impl, list_all_impl, secondary_find_impl,
    update_impl, write_impl,
};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::{TicketMailError, TicketMailResult};
use crate::modules::ticket::entity::{
    Ticket, TicketKey, TicketMessage, TicketMessageKey, TicketStatus, UserProfile,
    UserProfileKey,
};
use crate::modules::ticket::store::{NewMessage, NewTicket, TicketRef, TicketStore};
use crate::{id, raise_error, utc_now};

impl From<&Ticket> for TicketRef {
    fn from(ticket: &Ticket) -> Self {
        TicketRef {
            id: ticket.id,
            ticket_number: ticket.ticket_number,
        }
    }
}

/// Ticket store on the embedded `native_db` database.
#[derive(Clone)]
pub struct NativeTicketStore {
    db: Arc<Database<'static>>,
}

fn store_error(error: native_db::db_type::Error) -> TicketMailError {
    match error {
        native_db::db_type::Error::DuplicateKey { key_name } => raise_error!(
            format!("Duplicate value for unique key {key_name}"),
            ErrorCode::DuplicateMessage
        ),
        other => raise_error!(format!("{:#?}", other), ErrorCode::StoreWriteFailed),
    }
}

impl NativeTicketStore {
    pub fn new(db: Arc<Database<'static>>) -> Self {
        Self { db }
    }

    pub fn in_memory() -> TicketMailResult<Self> {
        Ok(Self::new(DatabaseManager::in_memory()?))
    }

    pub async fn get_ticket_by_number(&self, ticket_number: u64) -> TicketMailResult<Option<Ticket>> {
        secondary_find_impl::<Ticket>(&self.db, TicketKey::ticket_number, ticket_number).await
    }

    /// Newest first.
    pub async fn list_tickets(&self) -> TicketMailResult<Vec<Ticket>> {
        let mut tickets = list_all_impl::<Ticket>(&self.db).await?;
        tickets.sort_by(|a, b| b.ticket_number.cmp(&a.ticket_number));
        Ok(tickets)
    }

    /// Conversation order.
    pub async fn list_messages(&self, ticket_id: u64) -> TicketMailResult<Vec<TicketMessage>> {
        let mut messages = filter_by_secondary_key_impl::<TicketMessage>(
            &self.db,
            TicketMessageKey::ticket_id,
            ticket_id,
        )
        .await?;
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }

    pub async fn register_user(
        &self,
        email: String,
        name: Option<String>,
    ) -> TicketMailResult<UserProfile> {
        let email = email.trim().to_lowercase();
        write_impl(&self.db, move |rw| {
            let existing: Option<UserProfile> = rw
                .get()
                .secondary(UserProfileKey::email, email.clone())
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
            if existing.is_some() {
                return Err(raise_error!(
                    format!("A user profile for {email} already exists"),
                    ErrorCode::AlreadyExists
                ));
            }
            let profile = UserProfile {
                id: id!(64),
                email,
                name,
                created_at: utc_now!(),
            };
            rw.insert(profile.clone()).map_err(store_error)?;
            Ok(profile)
        })
        .await
    }

    /// Admin-side status change; closing stamps `closed_at`.
    pub async fn set_status(&self, ticket_id: u64, status: TicketStatus) -> TicketMailResult<Ticket> {
        let previous = update_impl(
            &self.db,
            move |rw| {
                rw.get()
                    .primary::<Ticket>(ticket_id)
                    .map_err(store_error)?
                    .ok_or_else(|| {
                        raise_error!(
                            format!("Ticket {ticket_id} not found"),
                            ErrorCode::ResourceNotFound
                        )
                    })
            },
            move |current| {
                if current.status == status {
                    return Ok(None);
                }
                let now = utc_now!();
                let mut updated = current.clone();
                updated.status = status;
                updated.updated_at = now;
                updated.closed_at = (status == TicketStatus::Closed).then_some(now);
                Ok(Some(updated))
            },
        )
        .await?;
        async_find_impl::<Ticket>(&self.db, previous.id)
            .await?
            .ok_or_else(|| {
                raise_error!(
                    format!("Ticket {ticket_id} not found"),
                    ErrorCode::ResourceNotFound
                )
            })
    }

    pub async fn find_user_by_email(&self, email: &str) -> TicketMailResult<Option<UserProfile>> {
        secondary_find_impl::<UserProfile>(&self.db, UserProfileKey::email, email.to_lowercase())
            .await
    }
}

impl TicketStore for NativeTicketStore {
    async fn find_ticket_by_message_ref(
        &self,
        references: &[String],
    ) -> TicketMailResult<Option<TicketRef>> {
        for reference in references {
            let message = secondary_find_impl::<TicketMessage>(
                &self.db,
                TicketMessageKey::message_id,
                Some(reference.clone()),
            )
            .await?;
            let Some(message) = message else {
                continue;
            };
            if let Some(ticket) = async_find_impl::<Ticket>(&self.db, message.ticket_id).await? {
                return Ok(Some(TicketRef::from(&ticket)));
            }
        }
        Ok(None)
    }

    async fn find_ticket_by_number(&self, ticket_number: u64) -> TicketMailResult<Option<TicketRef>> {
        Ok(self
            .get_ticket_by_number(ticket_number)
            .await?
            .as_ref()
            .map(TicketRef::from))
    }

    async fn find_user_id_by_email(&self, email: &str) -> TicketMailResult<Option<u64>> {
        Ok(self.find_user_by_email(email).await?.map(|user| user.id))
    }

    async fn create_ticket(&self, ticket: NewTicket) -> TicketMailResult<TicketRef> {
        let created = write_impl(&self.db, move |rw| {
            // Numbering happens inside the write transaction, so two creators never share one.
            let ticket_number = {
                let scan = rw
                    .scan()
                    .secondary::<Ticket>(TicketKey::ticket_number)
                    .map_err(store_error)?;
                let last = scan.all().map_err(store_error)?.rev().next();
                match last {
                    Some(last) => last.map_err(store_error)?.ticket_number + 1,
                    None => 1,
                }
            };
            let now = utc_now!();
            let entity = Ticket {
                id: id!(64),
                ticket_number,
                subject: ticket.subject,
                user_email: ticket.user_email,
                user_id: ticket.user_id,
                status: TicketStatus::Open,
                original_message_id: ticket.original_message_id,
                created_at: now,
                updated_at: now,
                closed_at: None,
            };
            rw.insert(entity.clone()).map_err(store_error)?;
            Ok(entity)
        })
        .await?;
        info!(
            "Created ticket #{} for {}",
            created.ticket_number, created.user_email
        );
        Ok(TicketRef::from(&created))
    }

    async fn message_exists(&self, message_id: &str) -> TicketMailResult<bool> {
        let message = secondary_find_impl::<TicketMessage>(
            &self.db,
            TicketMessageKey::message_id,
            Some(message_id.to_string()),
        )
        .await?;
        Ok(message.is_some())
    }

    async fn insert_message(&self, message: NewMessage) -> TicketMailResult<()> {
        write_impl(&self.db, move |rw| {
            if let Some(message_id) = &message.message_id {
                let existing: Option<TicketMessage> = rw
                    .get()
                    .secondary(TicketMessageKey::message_id, Some(message_id.clone()))
                    .map_err(store_error)?;
                if existing.is_some() {
                    return Err(raise_error!(
                        format!("Message {message_id} is already stored"),
                        ErrorCode::DuplicateMessage
                    ));
                }
            }
            let id = {
                let scan = rw.scan().primary::<TicketMessage>().map_err(store_error)?;
                let last = scan.all().map_err(store_error)?.rev().next();
                match last {
                    Some(last) => last.map_err(store_error)?.id + 1,
                    None => 1,
                }
            };
            let entity = TicketMessage {
                id,
                ticket_id: message.ticket_id,
                sender_email: message.sender_email,
                sender_name: message.sender_name,
                sender_type: message.sender_type,
                body: message.body,
                body_html: message.body_html,
                message_id: message.message_id,
                in_reply_to: message.in_reply_to,
                is_internal_note: false,
                received_at: message.received_at,
                created_at: utc_now!(),
            };
            rw.insert(entity).map_err(store_error)?;
            Ok(())
        })
        .await
    }

    async fn record_user_reply(&self, ticket_id: u64) -> TicketMailResult<()> {
        update_impl(
            &self.db,
            move |rw| {
                rw.get()
                    .primary::<Ticket>(ticket_id)
                    .map_err(store_error)?
                    .ok_or_else(|| {
                        raise_error!(
                            format!("Ticket {ticket_id} not found"),
                            ErrorCode::ResourceNotFound
                        )
                    })
            },
            |current| {
                let status = current.status.after_user_reply();
                if status == current.status {
                    return Ok(None);
                }
                let mut updated = current.clone();
                updated.status = status;
                updated.closed_at = None;
                updated.updated_at = utc_now!();
                Ok(Some(updated))
            },
        )
        .await?;
        Ok(())
    }
}
