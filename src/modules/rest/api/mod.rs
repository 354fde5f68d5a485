// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::{OpenApiService, Tags};
use poll::PollApi;
use ticket::TicketApi;

use crate::ticketmail_version;

pub mod poll;
pub mod ticket;

#[derive(Tags)]
pub enum ApiTags {
    Poll,
    Ticket,
}

type TicketMailOpenApi = (PollApi, TicketApi);

pub fn create_openapi_service() -> OpenApiService<TicketMailOpenApi, ()> {
    OpenApiService::new((PollApi, TicketApi), "TicketMailApi", ticketmail_version!())
}
