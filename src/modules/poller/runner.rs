// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::OnceLock;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info};

use crate::modules::context::Initialize;
use crate::modules::database::manager::DatabaseManager;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::TicketMailResult;
use crate::modules::imap::client::ImapSession;
use crate::modules::imap::mailbox::Mailbox;
use crate::modules::notify::TicketMailNotifier;
use crate::modules::poller::summary::PollSummary;
use crate::modules::poller::{MailboxPoller, PollOptions};
use crate::modules::settings::cli::SETTINGS;
use crate::modules::ticket::native::NativeTicketStore;
use crate::raise_error;

static POLL_RUNNER: OnceLock<PollRunner> = OnceLock::new();

/// Process-wide entry point for polls, shared by the HTTP trigger and the
/// periodic task. At most one poll runs at a time.
pub struct PollRunner {
    store: NativeTicketStore,
    notifier: TicketMailNotifier,
    options: PollOptions,
    running: Mutex<()>,
}

impl Initialize for PollRunner {
    async fn initialize() -> TicketMailResult<()> {
        let database = DatabaseManager::open()?;
        let runner = PollRunner::new(
            NativeTicketStore::new(database.ticket_db().clone()),
            TicketMailNotifier::from_settings(),
            PollOptions::from_settings(&SETTINGS),
        );
        let _ = POLL_RUNNER.set(runner);
        Ok(())
    }
}

impl PollRunner {
    pub fn new(store: NativeTicketStore, notifier: TicketMailNotifier, options: PollOptions) -> Self {
        Self {
            store,
            notifier,
            options,
            running: Mutex::new(()),
        }
    }

    pub fn get() -> TicketMailResult<&'static PollRunner> {
        POLL_RUNNER.get().ok_or_else(|| {
            raise_error!("PollRunner not initialized".into(), ErrorCode::InternalError)
        })
    }

    pub fn store(&self) -> &NativeTicketStore {
        &self.store
    }

    pub(crate) fn lock(&self) -> TicketMailResult<MutexGuard<'_, ()>> {
        self.running.try_lock().map_err(|_| {
            raise_error!(
                "A poll is already running for this mailbox".into(),
                ErrorCode::PollInProgress
            )
        })
    }

    /// Connects to the configured IMAP server and runs one poll.
    pub async fn run_once(&self) -> TicketMailResult<PollSummary> {
        let _guard = self.lock()?;
        let mut session = ImapSession::connect(
            &SETTINGS.ticketmail_imap_host,
            SETTINGS.ticketmail_imap_port,
            Duration::from_secs(SETTINGS.ticketmail_imap_command_timeout_secs),
        )
        .await
        .inspect_err(|e| {
            error!(
                "Connecting to {}:{} failed: {:#?}",
                SETTINGS.ticketmail_imap_host, SETTINGS.ticketmail_imap_port, e
            )
        })?;
        self.poll(&mut session).await
    }

    /// Runs one poll on an already connected mailbox. Callers hold [`Self::lock`].
    pub(crate) async fn poll<M: Mailbox>(&self, mailbox: &mut M) -> TicketMailResult<PollSummary> {
        info!("Polling mailbox {}", self.options.mailbox);
        MailboxPoller::new(&self.store, &self.notifier, &self.options)
            .poll(mailbox)
            .await
            .inspect_err(|e| error!("Poll of {} failed: {:#?}", self.options.mailbox, e))
    }
}
