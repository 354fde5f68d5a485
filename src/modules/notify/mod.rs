// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::future::Future;

use tracing::info;

use crate::modules::error::TicketMailResult;
use crate::modules::settings::cli::SETTINGS;
use crate::modules::ticket::threader::ticket_number_from_subject;

pub mod smtp;
#[cfg(test)]
mod tests;

use smtp::SmtpNotifier;

/// Acknowledgement for a freshly opened ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoReplyRequest {
    pub to: String,
    pub to_name: Option<String>,
    pub ticket_number: u64,
    pub ticket_id: u64,
    pub subject: String,
    /// `Message-Id` of the customer's email, echoed as `In-Reply-To`.
    pub in_reply_to: Option<String>,
}

impl AutoReplyRequest {
    /// `[Ticket #N] subject`, so replies thread by subject too.
    pub fn reply_subject(&self) -> String {
        if ticket_number_from_subject(&self.subject) == Some(self.ticket_number) {
            return self.subject.clone();
        }
        format!("[Ticket #{}] {}", self.ticket_number, self.subject)
    }

    pub fn text_body(&self) -> String {
        format!(
            "Thank you for contacting us.\n\n\
             Your request has been received and ticket #{} has been opened.\n\
             Please keep \"[Ticket #{}]\" in the subject when you reply.\n",
            self.ticket_number, self.ticket_number
        )
    }

    pub fn html_body(&self) -> String {
        format!(
            "<p>Thank you for contacting us.</p>\
             <p>Your request <b>{}</b> has been received and ticket #{} has been opened.</p>\
             <p>Please keep &quot;[Ticket #{}]&quot; in the subject when you reply.</p>",
            html_escape::encode_text(&self.subject),
            self.ticket_number,
            self.ticket_number
        )
    }
}

pub trait Notifier: Send + Sync {
    fn send_auto_reply(
        &self,
        request: AutoReplyRequest,
    ) -> impl Future<Output = TicketMailResult<()>> + Send;
}

/// Stand-in when no SMTP server is configured.
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    async fn send_auto_reply(&self, request: AutoReplyRequest) -> TicketMailResult<()> {
        info!(
            "SMTP is not configured; skipping auto-reply for ticket #{} to {}",
            request.ticket_number, request.to
        );
        Ok(())
    }
}

pub enum TicketMailNotifier {
    Smtp(SmtpNotifier),
    Disabled(DisabledNotifier),
}

impl TicketMailNotifier {
    pub fn from_settings() -> Self {
        match SmtpNotifier::from_settings(&SETTINGS) {
            Some(notifier) => TicketMailNotifier::Smtp(notifier),
            None => TicketMailNotifier::Disabled(DisabledNotifier),
        }
    }
}

impl Notifier for TicketMailNotifier {
    async fn send_auto_reply(&self, request: AutoReplyRequest) -> TicketMailResult<()> {
        match self {
            TicketMailNotifier::Smtp(notifier) => notifier.send_auto_reply(request).await,
            TicketMailNotifier::Disabled(notifier) => notifier.send_auto_reply(request).await,
        }
    }
}
