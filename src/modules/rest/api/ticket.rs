// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::param::{Path, Query};
use poem_openapi::payload::Json;
use poem_openapi::{Object, OpenApi};
use serde::{Deserialize, Serialize};

use crate::modules::common::paginated::paginate_vec;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::TicketMailResult;
use crate::modules::poller::runner::PollRunner;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::DataPage;
use crate::modules::rest::ApiResult;
use crate::modules::ticket::entity::{Ticket, TicketMessage, TicketStatus, UserProfile};
use crate::modules::ticket::native::NativeTicketStore;
use crate::{raise_error, validate_email};

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct StatusChange {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct NewUserProfile {
    /// Matched case-insensitively against the sender of inbound mail.
    pub email: String,
    pub name: Option<String>,
}

fn store() -> TicketMailResult<&'static NativeTicketStore> {
    Ok(PollRunner::get()?.store())
}

async fn ticket_by_number(ticket_number: u64) -> TicketMailResult<Ticket> {
    store()?
        .get_ticket_by_number(ticket_number)
        .await?
        .ok_or_else(|| {
            raise_error!(
                format!("Ticket #{ticket_number} not found"),
                ErrorCode::ResourceNotFound
            )
        })
}

pub struct TicketApi;

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Ticket")]
impl TicketApi {
    /// Lists tickets, newest first.
    #[oai(method = "get", path = "/tickets", operation_id = "list_tickets")]
    async fn list_tickets(
        &self,
        /// Optional. The page number to retrieve (starting from 1).
        page: Query<Option<u64>>,
        /// Optional. The number of items per page.
        page_size: Query<Option<u64>>,
    ) -> ApiResult<Json<DataPage<Ticket>>> {
        let tickets = store()?.list_tickets().await?;
        let page = paginate_vec(&tickets, page.0, page_size.0)?;
        Ok(Json(DataPage::from(page)))
    }

    #[oai(
        method = "get",
        path = "/tickets/:ticket_number",
        operation_id = "get_ticket"
    )]
    async fn get_ticket(&self, ticket_number: Path<u64>) -> ApiResult<Json<Ticket>> {
        Ok(Json(ticket_by_number(ticket_number.0).await?))
    }

    /// Messages of one ticket in arrival order.
    #[oai(
        method = "get",
        path = "/tickets/:ticket_number/messages",
        operation_id = "list_ticket_messages"
    )]
    async fn list_ticket_messages(
        &self,
        ticket_number: Path<u64>,
    ) -> ApiResult<Json<Vec<TicketMessage>>> {
        let ticket = ticket_by_number(ticket_number.0).await?;
        Ok(Json(store()?.list_messages(ticket.id).await?))
    }

    /// Changes a ticket's status. Closing stamps `closed_at`; any other status clears it.
    #[oai(
        method = "post",
        path = "/tickets/:ticket_number/status",
        operation_id = "set_ticket_status"
    )]
    async fn set_ticket_status(
        &self,
        ticket_number: Path<u64>,
        request: Json<StatusChange>,
    ) -> ApiResult<Json<Ticket>> {
        let ticket = ticket_by_number(ticket_number.0).await?;
        Ok(Json(store()?.set_status(ticket.id, request.0.status).await?))
    }

    /// Registers a customer so that tickets from their address carry a `user_id`.
    #[oai(method = "post", path = "/users", operation_id = "register_user")]
    async fn register_user(&self, request: Json<NewUserProfile>) -> ApiResult<Json<UserProfile>> {
        let request = request.0;
        validate_email!(&request.email)?;
        Ok(Json(
            store()?.register_user(request.email, request.name).await?,
        ))
    }
}
