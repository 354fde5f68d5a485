// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

use crate::modules::error::code::ErrorCode;
use crate::modules::imap::{
    client::ImapSession,
    mailbox::Mailbox,
    response::{find_completion, ImapResponse, Status},
};

/// Server side of a scripted IMAP conversation.
struct Peer {
    io: BufReader<DuplexStream>,
}

impl Peer {
    fn new(stream: DuplexStream) -> Self {
        Self {
            io: BufReader::new(stream),
        }
    }

    async fn send(&mut self, data: &[u8]) {
        self.io.write_all(data).await.unwrap();
        self.io.flush().await.unwrap();
    }

    /// Reads one command line, checks its text and returns its tag.
    async fn expect(&mut self, command: &str) -> String {
        let mut line = String::new();
        self.io.read_line(&mut line).await.unwrap();
        let (tag, text) = line.trim_end().split_once(' ').unwrap();
        assert_eq!(text, command);
        tag.to_string()
    }
}

fn response(raw: &str) -> ImapResponse {
    ImapResponse {
        tag: "A1".into(),
        status: Status::Ok,
        message: String::new(),
        raw: raw.as_bytes().to_vec(),
    }
}

#[tokio::test]
async fn login_select_and_search() {
    let (client, server) = duplex(64 * 1024);
    let server = tokio::spawn(async move {
        let mut peer = Peer::new(server);
        peer.send(b"* OK IMAP4rev1 ready\r\n").await;
        let tag = peer.expect(r#"LOGIN "support@example.com" "p\"w""#).await;
        assert_eq!(tag, "A1");
        peer.send(format!("{tag} OK LOGIN completed\r\n").as_bytes())
            .await;
        let tag = peer.expect(r#"SELECT "INBOX""#).await;
        assert_eq!(tag, "A2");
        peer.send(
            format!(
                "* FLAGS (\\Seen \\Answered)\r\n* 17 EXISTS\r\n* 0 RECENT\r\n{tag} OK [READ-WRITE] SELECT completed\r\n"
            )
            .as_bytes(),
        )
        .await;
        let tag = peer.expect("SEARCH UNSEEN").await;
        assert_eq!(tag, "A3");
        peer.send(format!("* SEARCH 15 3 12\r\n{tag} OK SEARCH completed\r\n").as_bytes())
            .await;
    });

    let mut session = ImapSession::handshake(client, Duration::from_secs(5))
        .await
        .unwrap();
    session.login("support@example.com", "p\"w").await.unwrap();
    assert_eq!(session.select("INBOX").await.unwrap(), 17);
    assert_eq!(session.search_unseen().await.unwrap(), vec![3, 12, 15]);
    server.await.unwrap();
}

#[tokio::test]
async fn fetch_reads_literal_split_across_writes() {
    let message = "Subject: tricky\r\n\r\nA2 OK this line lives inside the body\r\nreal content\r\n";
    let (client, server) = duplex(64 * 1024);
    let server = tokio::spawn(async move {
        let mut peer = Peer::new(server);
        peer.send(b"* OK ready\r\n").await;
        let tag = peer.expect("LOGIN \"u\" \"p\"").await;
        peer.send(format!("{tag} OK\r\n").as_bytes()).await;
        let tag = peer.expect("FETCH 4 BODY.PEEK[]").await;
        assert_eq!(tag, "A2");
        let (head, tail) = message.split_at(30);
        peer.send(format!("* 4 FETCH (BODY[] {{{}}}\r\n{}", message.len(), head).as_bytes())
            .await;
        tokio::task::yield_now().await;
        peer.send(format!("{tail})\r\n{tag} OK FETCH completed\r\n").as_bytes())
            .await;
    });

    let mut session = ImapSession::handshake(client, Duration::from_secs(5))
        .await
        .unwrap();
    session.login("u", "p").await.unwrap();
    let raw = session.fetch_raw(4).await.unwrap();
    assert_eq!(raw.as_deref(), Some(message.as_bytes()));
    server.await.unwrap();
}

#[tokio::test]
async fn per_message_refusals_are_not_fatal() {
    let (client, server) = duplex(64 * 1024);
    let server = tokio::spawn(async move {
        let mut peer = Peer::new(server);
        peer.send(b"* OK ready\r\n").await;
        let tag = peer.expect("FETCH 9 BODY.PEEK[]").await;
        peer.send(format!("{tag} NO message expunged\r\n").as_bytes())
            .await;
        let tag = peer.expect("STORE 9 +FLAGS (\\Seen)").await;
        peer.send(format!("{tag} NO read-only mailbox\r\n").as_bytes())
            .await;
        let tag = peer.expect("LOGOUT").await;
        peer.send(format!("* BYE logging out\r\n{tag} OK LOGOUT completed\r\n").as_bytes())
            .await;
    });

    let mut session = ImapSession::handshake(client, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(session.fetch_raw(9).await.unwrap(), None);
    session.mark_seen(9).await.unwrap();
    assert!(!session.is_broken());
    session.logout().await;
    assert!(session.is_broken());
    server.await.unwrap();
}

#[tokio::test]
async fn rejected_login_is_an_authentication_error() {
    let (client, server) = duplex(64 * 1024);
    let server = tokio::spawn(async move {
        let mut peer = Peer::new(server);
        peer.send(b"* OK ready\r\n").await;
        let tag = peer.expect("LOGIN \"u\" \"wrong\"").await;
        peer.send(format!("{tag} NO [AUTHENTICATIONFAILED] Invalid credentials\r\n").as_bytes())
            .await;
    });

    let mut session = ImapSession::handshake(client, Duration::from_secs(5))
        .await
        .unwrap();
    let error = session.login("u", "wrong").await.unwrap_err();
    assert_eq!(error.code(), ErrorCode::ImapAuthenticationFailed);
    server.await.unwrap();
}

#[tokio::test]
async fn bye_greeting_fails_to_connect() {
    let (client, server) = duplex(1024);
    let server = tokio::spawn(async move {
        let mut peer = Peer::new(server);
        peer.send(b"* BYE too many connections\r\n").await;
    });
    let error = ImapSession::handshake(client, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(error.code(), ErrorCode::NetworkError);
    server.await.unwrap();
}

#[tokio::test]
async fn missing_completion_times_out_and_breaks_the_session() {
    let (client, server) = duplex(1024);
    let server = tokio::spawn(async move {
        let mut peer = Peer::new(server);
        peer.send(b"* OK ready\r\n").await;
        peer.expect("SEARCH UNSEEN").await;
        peer.send(b"* SEARCH 1 2\r\n").await;
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let mut session = ImapSession::handshake(client, Duration::from_millis(100))
        .await
        .unwrap();
    let error = session.search_unseen().await.unwrap_err();
    assert_eq!(error.code(), ErrorCode::ConnectionTimeout);
    assert!(session.is_broken());

    let error = session.select("INBOX").await.unwrap_err();
    assert_eq!(error.code(), ErrorCode::NetworkError);
    // Logout on a broken session returns without touching the stream.
    session.logout().await;
    server.abort();
}

#[tokio::test]
async fn closed_connection_is_a_network_error() {
    let (client, server) = duplex(1024);
    let server = tokio::spawn(async move {
        let mut peer = Peer::new(server);
        peer.send(b"* OK ready\r\n").await;
        peer.expect("SELECT \"INBOX\"").await;
    });

    let mut session = ImapSession::handshake(client, Duration::from_secs(5))
        .await
        .unwrap();
    let error = session.select("INBOX").await.unwrap_err();
    assert_eq!(error.code(), ErrorCode::NetworkError);
    assert!(session.is_broken());
    server.await.unwrap();
}

#[test]
fn completion_waits_for_literal_bytes() {
    let partial = b"* 1 FETCH (BODY[] {20}\r\nA7 OK inside\r\n";
    assert!(find_completion(partial, "A7").is_none());

    let full = b"* 1 FETCH (BODY[] {16}\r\nA7 OK inside\r\n\r\n)\r\nA7 OK done\r\n";
    let completion = find_completion(full, "A7").unwrap();
    assert_eq!(completion.status, Status::Ok);
    assert_eq!(completion.message, "done");
    assert_eq!(completion.end, full.len());
}

#[test]
fn completion_requires_exact_tag() {
    let buffer = b"A10 OK other command\r\nA1 BAD syntax error\r\n";
    let completion = find_completion(buffer, "A1").unwrap();
    assert_eq!(completion.status, Status::Bad);
    assert_eq!(completion.message, "syntax error");
}

#[test]
fn untagged_data_parsing() {
    let select = response("* 3 EXISTS\r\n* 1 RECENT\r\nA1 OK done\r\n");
    assert_eq!(select.exists(), Some(3));

    let search = response("* SEARCH\r\nA1 OK done\r\n");
    assert!(search.search_ids().is_empty());

    let search = response("* search 8 2 8\r\nA1 OK done\r\n");
    assert_eq!(search.search_ids(), vec![2, 8]);

    let fetch = response("* 2 FETCH (FLAGS (\\Seen))\r\nA1 OK done\r\n");
    assert_eq!(fetch.fetch_literal(), None);
}
