// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Counters for one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Object)]
pub struct PollSummary {
    /// Messages stored on a ticket.
    pub processed: u32,
    /// Auto-replies, empty replies and duplicates; all marked seen.
    pub skipped: u32,
    /// Messages that could not be fetched or stored; left unseen for the next run.
    pub errors: u32,
    /// Messages not looked at because the poll ran out of time.
    pub deferred: u32,
}

/// What happened to a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Processed,
    Skipped,
    Failed,
}

impl PollSummary {
    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Processed => self.processed += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.errors += 1,
        }
    }
}
