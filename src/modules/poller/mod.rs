// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::modules::error::TicketMailResult;
use crate::modules::imap::mailbox::Mailbox;
use crate::modules::inbound::classifier::{is_auto_reply, is_auto_submitted};
use crate::modules::inbound::{subject, InboundEmail};
use crate::modules::mime::parser::{parse_bytes, parse_headers};
use crate::modules::notify::{AutoReplyRequest, Notifier};
use crate::modules::settings::cli::{ScanMode, Settings};
use crate::modules::ticket::entity::SenderType;
use crate::modules::ticket::store::{NewMessage, TicketStore};
use crate::modules::ticket::threader::{TicketThreader, DEFAULT_SUBJECT};

pub mod runner;
pub mod summary;

use summary::{Outcome, PollSummary};

#[derive(Debug, Clone)]
pub struct PollOptions {
    pub username: String,
    pub password: String,
    pub mailbox: String,
    pub scan_mode: ScanMode,
    pub scan_window: u32,
    pub budget: Duration,
    pub content_hash_dedup: bool,
}

impl PollOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            username: settings.ticketmail_imap_username.clone(),
            password: settings.ticketmail_imap_password.clone(),
            mailbox: settings.ticketmail_imap_mailbox.clone(),
            scan_mode: settings.ticketmail_scan_mode,
            scan_window: settings.ticketmail_scan_window,
            budget: Duration::from_secs(settings.ticketmail_poll_budget_secs),
            content_hash_dedup: settings.ticketmail_content_hash_dedup,
        }
    }
}

/// Sequence numbers of the last `window` messages of a mailbox holding `exists`.
pub fn trailing_window(exists: u32, window: u32) -> Vec<u32> {
    if exists == 0 || window == 0 {
        return Vec::new();
    }
    let first = exists.saturating_sub(window) + 1;
    (first..=exists).collect()
}

/// One bounded batch: mailbox in, ticket messages out.
pub struct MailboxPoller<'a, S, N> {
    store: &'a S,
    notifier: &'a N,
    options: &'a PollOptions,
}

impl<'a, S: TicketStore, N: Notifier> MailboxPoller<'a, S, N> {
    pub fn new(store: &'a S, notifier: &'a N, options: &'a PollOptions) -> Self {
        Self {
            store,
            notifier,
            options,
        }
    }

    /// Logs out whatever happens; only mailbox failures are returned as errors.
    pub async fn poll<M: Mailbox>(&self, mailbox: &mut M) -> TicketMailResult<PollSummary> {
        let result = self.run(mailbox).await;
        mailbox.logout().await;
        result
    }

    async fn run<M: Mailbox>(&self, mailbox: &mut M) -> TicketMailResult<PollSummary> {
        let started = Instant::now();
        mailbox
            .login(&self.options.username, &self.options.password)
            .await?;
        let exists = mailbox.select(&self.options.mailbox).await?;
        let work_set = match self.options.scan_mode {
            ScanMode::Unseen => mailbox.search_unseen().await?,
            ScanMode::Window => trailing_window(exists, self.options.scan_window),
        };
        debug!(
            "Mailbox {} holds {} messages, {} to examine ({} mode)",
            self.options.mailbox,
            exists,
            work_set.len(),
            self.options.scan_mode
        );

        let mut summary = PollSummary::default();
        for (index, sequence) in work_set.iter().copied().enumerate() {
            if started.elapsed() >= self.options.budget {
                summary.deferred = (work_set.len() - index) as u32;
                warn!(
                    "Poll budget of {}s exhausted; {} messages left for the next run",
                    self.options.budget.as_secs(),
                    summary.deferred
                );
                break;
            }
            let outcome = self.process(mailbox, sequence).await?;
            summary.record(outcome);
        }
        info!(
            "Poll finished: processed={}, skipped={}, errors={}, deferred={}",
            summary.processed, summary.skipped, summary.errors, summary.deferred
        );
        Ok(summary)
    }

    async fn process<M: Mailbox>(&self, mailbox: &mut M, sequence: u32) -> TicketMailResult<Outcome> {
        let Some(raw) = mailbox.fetch_raw(sequence).await? else {
            warn!("Message {sequence} could not be fetched; it stays unseen");
            return Ok(Outcome::Failed);
        };

        let headers = parse_headers(&raw);
        let header_subject = subject(&headers).unwrap_or_default();
        let from = headers.get("from").unwrap_or_default();
        if is_auto_reply(&header_subject, from) || is_auto_submitted(&headers) {
            debug!("Message {sequence} from {from:?} is automated mail; skipping");
            mailbox.mark_seen(sequence).await?;
            return Ok(Outcome::Skipped);
        }

        let email = InboundEmail::from_parsed(&parse_bytes(&raw));
        if email.from_email.is_empty() {
            warn!("Message {sequence} has no usable sender; skipping");
            mailbox.mark_seen(sequence).await?;
            return Ok(Outcome::Skipped);
        }
        if email.is_empty() {
            debug!("Message {sequence} has no new content after stripping; skipping");
            mailbox.mark_seen(sequence).await?;
            return Ok(Outcome::Skipped);
        }

        // Window mode re-reads seen mail every run, so id-less mail always gets a content id there.
        let content_ids =
            self.options.content_hash_dedup || self.options.scan_mode == ScanMode::Window;
        let message_id = email
            .message_id
            .clone()
            .or_else(|| content_ids.then(|| email.content_message_id()));
        if let Some(message_id) = &message_id {
            match self.store.message_exists(message_id).await {
                Ok(true) => {
                    debug!("Message {sequence} ({message_id}) is already stored; skipping");
                    mailbox.mark_seen(sequence).await?;
                    return Ok(Outcome::Skipped);
                }
                Ok(false) => {}
                Err(e) => {
                    error!("Duplicate check for message {sequence} failed: {:#?}", e);
                    return Ok(Outcome::Failed);
                }
            }
        }

        let resolution = match TicketThreader::new(self.store).resolve(&email).await {
            Ok(resolution) => resolution,
            Err(e) => {
                error!("Could not resolve a ticket for message {sequence}: {:#?}", e);
                return Ok(Outcome::Failed);
            }
        };

        let stored = self
            .store
            .insert_message(NewMessage {
                ticket_id: resolution.ticket_id,
                sender_email: email.from_email.clone(),
                sender_name: email.from_name.clone(),
                sender_type: SenderType::User,
                body: email.body_text.clone(),
                body_html: email.body_html.clone(),
                message_id,
                in_reply_to: email.in_reply_to.clone(),
                received_at: email.received_at,
            })
            .await;
        if let Err(e) = stored {
            error!(
                "Storing message {sequence} on ticket #{} failed: {:#?}",
                resolution.ticket_number, e
            );
            return Ok(Outcome::Failed);
        }

        if !resolution.is_new {
            if let Err(e) = self.store.record_user_reply(resolution.ticket_id).await {
                warn!(
                    "Status update for ticket #{} failed: {:#?}",
                    resolution.ticket_number, e
                );
            }
        }

        mailbox.mark_seen(sequence).await?;

        if resolution.is_new {
            let request = AutoReplyRequest {
                to: email.from_email.clone(),
                to_name: email.from_name.clone(),
                ticket_number: resolution.ticket_number,
                ticket_id: resolution.ticket_id,
                subject: email
                    .subject
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
                in_reply_to: email.message_id.clone(),
            };
            if let Err(e) = self.notifier.send_auto_reply(request).await {
                warn!(
                    "Auto-reply for ticket #{} failed: {:#?}",
                    resolution.ticket_number, e
                );
            }
        }
        Ok(Outcome::Processed)
    }
}
