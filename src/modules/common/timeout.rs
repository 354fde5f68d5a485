// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::{Endpoint, Middleware, Request, Result};
use std::time::Duration;
use tracing::error;

use crate::modules::{error::code::ErrorCode, settings::cli::SETTINGS};

use super::create_api_error_response;

pub const TIMEOUT_HEADER: &str = "X-TicketMail-Timeout-Seconds";
const MAX_TIMEOUT_SECS: u64 = 900;

pub struct Timeout;

impl<E: Endpoint> Middleware<E> for Timeout {
    type Output = TimeoutEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        TimeoutEndpoint { ep }
    }
}

pub struct TimeoutEndpoint<E> {
    ep: E,
}

#[inline]
fn extract_timeout(req: &Request) -> Option<u64> {
    req.header(TIMEOUT_HEADER)
        .and_then(|v| v.parse::<u64>().ok())
}

impl<E: Endpoint> Endpoint for TimeoutEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let seconds = extract_timeout(&req)
            .unwrap_or(SETTINGS.ticketmail_http_timeout_secs)
            .min(MAX_TIMEOUT_SECS);
        match tokio::time::timeout(Duration::from_secs(seconds), self.ep.call(req)).await {
            Ok(result) => result,
            Err(_) => {
                error!("Request timed out after {} seconds", seconds);
                Err(create_api_error_response(
                    &format!(
                        "Request timed out after {} seconds (timeout set via {} header, max allowed: {} seconds)",
                        seconds, TIMEOUT_HEADER, MAX_TIMEOUT_SECS
                    ),
                    ErrorCode::RequestTimeout,
                ))
            }
        }
    }
}
