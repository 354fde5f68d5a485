// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::auth::ApiGuard;
use crate::modules::common::error::ErrorCapture;
use crate::modules::common::log::Tracing;
use crate::modules::common::signal::SIGNAL_MANAGER;
use crate::modules::common::timeout::{Timeout, TIMEOUT_HEADER};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::handler::error_handler;
use crate::modules::error::{ApiErrorResponse, TicketMailResult};
use crate::modules::rest::public::status::get_status;
use crate::modules::settings::cli::SETTINGS;
use crate::raise_error;
use api::create_openapi_service;
use poem::get;
use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Cors};
use poem::{EndpointExt, Route, Server};
use std::time::Duration;
use tracing::info;

pub mod api;
pub mod public;
pub mod response;

pub type ApiResult<T, E = ApiErrorResponse> = std::result::Result<T, E>;

const DESCRIPTION: &str = r#"
    ticketmail polls a support mailbox over IMAP and threads inbound mail into helpdesk tickets.

    - Replies are matched to tickets by their reply headers or a `[Ticket #N]` subject tag.
    - Quoted history, signatures and automated mail are filtered out before anything is stored.
"#;

pub async fn start_http_server() -> TicketMailResult<()> {
    let listener = TcpListener::bind((
        SETTINGS.ticketmail_bind_ip.clone(),
        SETTINGS.ticketmail_http_port,
    ));

    let api_service = create_openapi_service()
        .description(DESCRIPTION)
        .summary("Inbound email to support ticket pipeline");

    let swagger = api_service.swagger_ui();
    let spec_json = api_service.spec_endpoint();

    let open_api_route = Route::new()
        .nest_no_strip("/api/v1", api_service)
        .with(ApiGuard)
        .with(ErrorCapture)
        .with(Timeout)
        .with(Tracing);

    let cors = Cors::new()
        .allow_methods(vec!["GET", "POST", "OPTIONS", "HEAD"])
        .allow_headers(vec!["Content-Type", "Authorization", TIMEOUT_HEADER]);

    let route = Route::new()
        .nest("/api-docs/swagger", swagger)
        .nest("/api-docs/spec.json", spec_json)
        .nest("/api/status", get(get_status))
        .nest_no_strip("/api/v1", open_api_route)
        .with(cors)
        .with(CatchPanic::new());

    let server = Server::new(listener)
        .name("ticketmail API Service")
        .idle_timeout(Duration::from_secs(60))
        .run_with_graceful_shutdown(
            route.catch_all_error(error_handler),
            SIGNAL_MANAGER.wait_for_shutdown(),
            Some(Duration::from_secs(5)),
        );
    info!(
        "ticketmail API Service is now running on {}:{}.",
        SETTINGS.ticketmail_bind_ip, SETTINGS.ticketmail_http_port
    );
    server
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}
