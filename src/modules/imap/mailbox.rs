// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::future::Future;

use crate::modules::error::TicketMailResult;

/// Mailbox operations a poll needs. Every error returned here is fatal for the
/// current poll; per-message trouble is reported through the `Ok` values.
pub trait Mailbox: Send {
    fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = TicketMailResult<()>> + Send;

    /// Selects `mailbox` and returns its `EXISTS` count.
    fn select(&mut self, mailbox: &str) -> impl Future<Output = TicketMailResult<u32>> + Send;

    /// Sequence numbers of unseen messages, ascending.
    fn search_unseen(&mut self) -> impl Future<Output = TicketMailResult<Vec<u32>>> + Send;

    /// Raw message without touching `\Seen`; `None` when the server refused it.
    fn fetch_raw(
        &mut self,
        sequence: u32,
    ) -> impl Future<Output = TicketMailResult<Option<Vec<u8>>>> + Send;

    fn mark_seen(&mut self, sequence: u32) -> impl Future<Output = TicketMailResult<()>> + Send;

    /// Best effort; never fails.
    fn logout(&mut self) -> impl Future<Output = ()> + Send;
}
