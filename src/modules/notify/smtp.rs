// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;
use std::time::Duration;

use mail_send::mail_builder::headers::address::Address;
use mail_send::mail_builder::headers::raw::Raw as XRaw;
use mail_send::mail_builder::headers::HeaderType;
use mail_send::mail_builder::MessageBuilder;
use mail_send::SmtpClientBuilder;
use tracing::{debug, info};

use crate::modules::error::code::ErrorCode;
use crate::modules::error::TicketMailResult;
use crate::modules::notify::{AutoReplyRequest, Notifier};
use crate::modules::settings::cli::Settings;
use crate::{id, raise_error, utc_now};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends ticket acknowledgements through one SMTP relay over implicit TLS.
/// A connection is opened per message; new tickets are rare enough.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    from_name: String,
    from_address: String,
}

/// Header form expected by the message builder: no angle brackets.
fn bare_message_id(message_id: &str) -> String {
    message_id
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}

pub fn generate_message_id() -> String {
    format!("{}.{:x}@ticketmail", utc_now!(), id!(64))
}

impl SmtpNotifier {
    /// `None` unless a host is configured. The sender falls back to the SMTP
    /// login, then to the polled mailbox address.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let host = settings.ticketmail_smtp_host.clone()?;
        let credentials = match (
            &settings.ticketmail_smtp_username,
            &settings.ticketmail_smtp_password,
        ) {
            (Some(username), Some(password)) => Some((username.clone(), password.clone())),
            _ => None,
        };
        let from_address = settings
            .ticketmail_smtp_from_address
            .clone()
            .or_else(|| settings.ticketmail_smtp_username.clone())
            .unwrap_or_else(|| settings.ticketmail_imap_username.clone());
        let notifier = Self::new(
            host,
            settings.ticketmail_smtp_port,
            settings.ticketmail_smtp_from_name.clone(),
            from_address,
        );
        Some(match credentials {
            Some(credentials) => notifier.with_credentials(credentials),
            None => notifier,
        })
    }

    pub fn new(host: String, port: u16, from_name: String, from_address: String) -> Self {
        Self {
            host,
            port,
            credentials: None,
            from_name,
            from_address,
        }
    }

    pub fn with_credentials(mut self, credentials: (String, String)) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn build_message(&self, request: &AutoReplyRequest) -> MessageBuilder<'static> {
        let to = Address::new_address(
            request.to_name.clone().map(Cow::Owned),
            Cow::Owned(request.to.clone()),
        );
        let mut builder = MessageBuilder::new()
            .from((self.from_name.clone(), self.from_address.clone()))
            .to(to)
            .subject(request.reply_subject())
            .message_id(generate_message_id())
            .header(
                "Auto-Submitted",
                HeaderType::Raw(XRaw::new("auto-replied")),
            )
            .text_body(request.text_body())
            .html_body(request.html_body());
        if let Some(in_reply_to) = &request.in_reply_to {
            let message_id = bare_message_id(in_reply_to);
            builder = builder
                .in_reply_to(message_id.clone())
                .references(vec![message_id]);
        }
        builder
    }
}

impl Notifier for SmtpNotifier {
    async fn send_auto_reply(&self, request: AutoReplyRequest) -> TicketMailResult<()> {
        let message = self.build_message(&request);
        let mut builder = SmtpClientBuilder::new(self.host.clone(), self.port)
            .implicit_tls(true)
            .timeout(SMTP_TIMEOUT);
        if let Some(credentials) = &self.credentials {
            builder = builder.credentials(credentials.clone());
        }
        debug!("Connecting to SMTP server {}:{}", self.host, self.port);
        let mut client = builder
            .connect()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::SmtpConnectionFailed))?;
        client
            .send(message)
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::SmtpCommandFailed))?;
        let _ = client.quit().await;
        info!(
            "Sent auto-reply for ticket #{} to {}",
            request.ticket_number, request.to
        );
        Ok(())
    }
}
