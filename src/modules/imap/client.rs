// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::modules::error::code::ErrorCode;
use crate::modules::error::TicketMailResult;
use crate::modules::imap::mailbox::Mailbox;
use crate::modules::imap::response::{find_completion, ImapResponse, Status};
use crate::modules::imap::session::SessionStream;
use crate::modules::utils::net::{establish_tls_connection, resolve_to_socket_addr};
use crate::raise_error;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
const READ_CHUNK: usize = 16 * 1024;

fn alpn(port: u16) -> &'static [&'static str] {
    if port == 993 {
        &[]
    } else {
        &["imap"]
    }
}

/// Sequential tag-based IMAP client. Tags (`A1`, `A2`, ...) are unique per session.
#[derive(Debug)]
pub struct ImapSession<S: SessionStream> {
    stream: S,
    buffer: Vec<u8>,
    next_tag: u32,
    command_timeout: Duration,
    /// Set once the stream state is unknown (timeout, I/O error, logout).
    broken: bool,
}

impl ImapSession<Box<dyn SessionStream>> {
    /// Implicit TLS connection; the greeting is read and discarded.
    pub async fn connect(host: &str, port: u16, command_timeout: Duration) -> TicketMailResult<Self> {
        let address = resolve_to_socket_addr(host, port)?;
        debug!("Attempting IMAP connection to {host} ({address}).");
        let tls_stream = establish_tls_connection(address, host, alpn(port)).await?;
        let stream: Box<dyn SessionStream> = Box::new(BufWriter::new(tls_stream));
        Self::handshake(stream, command_timeout).await
    }
}

impl<S: SessionStream> ImapSession<S> {
    pub async fn handshake(stream: S, command_timeout: Duration) -> TicketMailResult<Self> {
        let mut session = Self {
            stream,
            buffer: Vec::with_capacity(READ_CHUNK),
            next_tag: 1,
            command_timeout,
            broken: false,
        };
        session.read_greeting().await?;
        Ok(session)
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    async fn read_greeting(&mut self) -> TicketMailResult<()> {
        let greeting = match timeout(self.command_timeout, self.read_line()).await {
            Ok(line) => line?,
            Err(_) => {
                self.broken = true;
                return Err(raise_error!(
                    format!(
                        "No IMAP greeting within {}s",
                        self.command_timeout.as_secs()
                    ),
                    ErrorCode::ConnectionTimeout
                ));
            }
        };
        let upper = greeting.to_ascii_uppercase();
        if upper.starts_with("* OK") || upper.starts_with("* PREAUTH") {
            debug!("IMAP greeting: {greeting}");
            return Ok(());
        }
        self.broken = true;
        if upper.starts_with("* BYE") {
            return Err(raise_error!(
                format!("IMAP server refused the connection: {greeting}"),
                ErrorCode::NetworkError
            ));
        }
        Err(raise_error!(
            format!("Unexpected IMAP greeting: {greeting}"),
            ErrorCode::ImapUnexpectedResult
        ))
    }

    async fn read_line(&mut self) -> TicketMailResult<String> {
        loop {
            if let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = self.buffer.drain(..=newline).collect();
                return Ok(String::from_utf8_lossy(&line).trim_end().to_string());
            }
            self.fill().await?;
        }
    }

    async fn fill(&mut self) -> TicketMailResult<()> {
        self.buffer.reserve(READ_CHUNK);
        let read = self.stream.read_buf(&mut self.buffer).await.map_err(|e| {
            self.broken = true;
            raise_error!(format!("IMAP read failed: {e}"), ErrorCode::NetworkError)
        })?;
        if read == 0 {
            self.broken = true;
            return Err(raise_error!(
                "IMAP server closed the connection".into(),
                ErrorCode::NetworkError
            ));
        }
        Ok(())
    }

    /// Sends one command and waits for its tagged completion. A timeout leaves
    /// the protocol state undefined, so the session becomes unusable.
    pub async fn command(&mut self, text: &str) -> TicketMailResult<ImapResponse> {
        if self.broken {
            return Err(raise_error!(
                "IMAP session is no longer usable".into(),
                ErrorCode::NetworkError
            ));
        }
        let tag = format!("A{}", self.next_tag);
        self.next_tag += 1;
        let verb = text.split_whitespace().next().unwrap_or_default().to_string();

        match timeout(self.command_timeout, self.exchange(&tag, text)).await {
            Ok(Ok(response)) => {
                debug!("IMAP {tag} {verb} -> {:?}", response.status);
                Ok(response)
            }
            Ok(Err(e)) => {
                self.broken = true;
                Err(e)
            }
            Err(_) => {
                self.broken = true;
                Err(raise_error!(
                    format!(
                        "IMAP {} ({}) not completed within {}s",
                        verb,
                        tag,
                        self.command_timeout.as_secs()
                    ),
                    ErrorCode::ConnectionTimeout
                ))
            }
        }
    }

    async fn exchange(&mut self, tag: &str, text: &str) -> TicketMailResult<ImapResponse> {
        let line = format!("{tag} {text}\r\n");
        self.stream
            .write_all(line.as_bytes())
            .await
            .map_err(|e| raise_error!(format!("IMAP write failed: {e}"), ErrorCode::NetworkError))?;
        self.stream
            .flush()
            .await
            .map_err(|e| raise_error!(format!("IMAP write failed: {e}"), ErrorCode::NetworkError))?;

        loop {
            if let Some(completion) = find_completion(&self.buffer, tag) {
                let raw: Vec<u8> = self.buffer.drain(..completion.end).collect();
                return Ok(ImapResponse {
                    tag: tag.to_string(),
                    status: completion.status,
                    message: completion.message,
                    raw,
                });
            }
            self.fill().await?;
        }
    }
}

impl<S: SessionStream> Mailbox for ImapSession<S> {
    async fn login(&mut self, username: &str, password: &str) -> TicketMailResult<()> {
        let response = self
            .command(&format!("LOGIN {} {}", quote(username), quote(password)))
            .await?;
        match response.status {
            Status::Ok => Ok(()),
            Status::No => Err(raise_error!(
                format!("IMAP login rejected for {username}: {}", response.message),
                ErrorCode::ImapAuthenticationFailed
            )),
            Status::Bad => Err(raise_error!(
                format!("IMAP LOGIN failed: {}", response.message),
                ErrorCode::ImapCommandFailed
            )),
        }
    }

    async fn select(&mut self, mailbox: &str) -> TicketMailResult<u32> {
        let response = self.command(&format!("SELECT {}", quote(mailbox))).await?;
        if !response.is_ok() {
            return Err(raise_error!(
                format!("IMAP SELECT {mailbox} failed: {}", response.message),
                ErrorCode::ImapCommandFailed
            ));
        }
        match response.exists() {
            Some(exists) => Ok(exists),
            None => {
                warn!("SELECT {mailbox} returned no EXISTS count; assuming an empty mailbox");
                Ok(0)
            }
        }
    }

    async fn search_unseen(&mut self) -> TicketMailResult<Vec<u32>> {
        let response = self.command("SEARCH UNSEEN").await?;
        if !response.is_ok() {
            return Err(raise_error!(
                format!("IMAP SEARCH failed: {}", response.message),
                ErrorCode::ImapCommandFailed
            ));
        }
        Ok(response.search_ids())
    }

    async fn fetch_raw(&mut self, sequence: u32) -> TicketMailResult<Option<Vec<u8>>> {
        let response = self.command(&format!("FETCH {sequence} BODY.PEEK[]")).await?;
        if !response.is_ok() {
            warn!(
                "IMAP FETCH {sequence} returned {:?}: {}",
                response.status, response.message
            );
            return Ok(None);
        }
        let literal = response.fetch_literal();
        if literal.is_none() {
            warn!("IMAP FETCH {sequence} carried no message literal");
        }
        Ok(literal)
    }

    async fn mark_seen(&mut self, sequence: u32) -> TicketMailResult<()> {
        let response = self
            .command(&format!("STORE {sequence} +FLAGS (\\Seen)"))
            .await?;
        if !response.is_ok() {
            warn!(
                "IMAP STORE {sequence} +FLAGS (\\Seen) returned {:?}: {}",
                response.status, response.message
            );
        }
        Ok(())
    }

    async fn logout(&mut self) {
        if self.broken {
            return;
        }
        if let Err(e) = self.command("LOGOUT").await {
            debug!("IMAP LOGOUT failed: {e}");
        }
        if let Err(e) = self.stream.shutdown().await {
            debug!("IMAP stream shutdown failed: {e}");
        }
        self.broken = true;
    }
}

/// IMAP quoted string.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
