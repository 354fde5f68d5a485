// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use tracing::info;

use crate::modules::context::TicketMailTask;
use crate::modules::poller::runner::PollRunner;
use crate::modules::settings::cli::SETTINGS;
use periodic::PeriodicTask;

pub mod periodic;
#[cfg(test)]
mod tests;

/// Background trigger for the same poll `POST /api/v1/poll` runs.
pub struct MailboxPollTask;

impl TicketMailTask for MailboxPollTask {
    fn start() {
        let Some(interval) = SETTINGS.ticketmail_poll_interval_secs else {
            info!("No poll interval configured; polls only run on request");
            return;
        };
        let periodic_task = PeriodicTask::new("mailbox-poller");

        let task = move || {
            Box::pin(async move {
                PollRunner::get()?.run_once().await?;
                Ok(())
            })
        };

        // The handle is dropped; the task runs until shutdown.
        let _ = periodic_task.start(task, Duration::from_secs(interval), true);
    }
}

pub struct PeriodicTasks;

impl PeriodicTasks {
    pub fn start_background_tasks() {
        MailboxPollTask::start();
    }
}
