// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{builder::ValueParser, ArgAction, Parser, ValueEnum};
use std::{fmt, sync::LazyLock};

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new_for_test);

#[derive(Debug, Parser)]
#[clap(
    name = "ticketmail",
    about = "Polls a support mailbox over IMAP and threads inbound mail into helpdesk tickets.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// ticketmail log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for ticketmail"
    )]
    pub ticketmail_log_level: String,

    /// Enable ANSI logs (default: true)
    #[clap(
        long,
        default_value = "true",
        env,
        action = ArgAction::Set,
        help = "Enable ANSI formatted logs"
    )]
    pub ticketmail_ansi_logs: bool,

    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub ticketmail_log_to_file: bool,

    #[clap(
        long,
        default_value = "5",
        env,
        help = "Maximum number of rotated server log files to keep"
    )]
    pub ticketmail_max_server_log_files: usize,

    /// Directory holding the ticket database and log files.
    #[clap(long, env, help = "Set the root directory for ticketmail data")]
    pub ticketmail_root_dir: String,

    #[clap(
        long,
        env,
        default_value = "false",
        help = "Keep the ticket store in memory only (data is lost on restart)"
    )]
    pub ticketmail_memory_mode_enabled: bool,

    #[clap(
        long,
        default_value = "15730",
        env,
        help = "Set the HTTP port for ticketmail"
    )]
    pub ticketmail_http_port: u16,

    #[clap(
        long,
        env,
        default_value = "0.0.0.0",
        help = "The IPv4 address the HTTP server binds to",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub ticketmail_bind_ip: String,

    #[clap(
        long,
        default_value = "300",
        env,
        help = "Default HTTP request timeout in seconds",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub ticketmail_http_timeout_secs: u64,

    /// When set, every `/api/v1` request must carry this bearer token.
    #[clap(long, env, help = "Bearer token required by the HTTP API")]
    pub ticketmail_access_token: Option<String>,

    #[clap(long, env, help = "IMAP server host name")]
    pub ticketmail_imap_host: String,

    #[clap(
        long,
        default_value = "993",
        env,
        help = "IMAP server port (implicit TLS)"
    )]
    pub ticketmail_imap_port: u16,

    #[clap(long, env, help = "IMAP login user name")]
    pub ticketmail_imap_username: String,

    #[clap(long, env, help = "IMAP login password")]
    pub ticketmail_imap_password: String,

    #[clap(
        long,
        default_value = "INBOX",
        env,
        help = "Mailbox selected for polling"
    )]
    pub ticketmail_imap_mailbox: String,

    #[clap(
        long,
        default_value = "30",
        env,
        help = "Seconds to wait for the tagged completion of a single IMAP command",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub ticketmail_imap_command_timeout_secs: u64,

    #[clap(
        long,
        default_value = "unseen",
        env,
        help = "How the work set is built: 'unseen' (SEARCH UNSEEN) or 'window' (last N messages)"
    )]
    pub ticketmail_scan_mode: ScanMode,

    #[clap(
        long,
        default_value = "30",
        env,
        help = "Number of most recent messages scanned in 'window' mode",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub ticketmail_scan_window: u32,

    /// Without an interval, polling only happens through `POST /api/v1/poll`.
    #[clap(
        long,
        env,
        help = "Run a poll every N seconds in the background",
        value_parser = clap::value_parser!(u64).range(10..)
    )]
    pub ticketmail_poll_interval_secs: Option<u64>,

    #[clap(
        long,
        default_value = "120",
        env,
        help = "Wall-clock budget for one poll; remaining messages wait for the next run",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub ticketmail_poll_budget_secs: u64,

    #[clap(
        long,
        default_value = "false",
        env,
        help = "Derive a content hash key for messages without a Message-Id header"
    )]
    pub ticketmail_content_hash_dedup: bool,

    #[clap(long, env, help = "SMTP host used for ticket auto-replies")]
    pub ticketmail_smtp_host: Option<String>,

    #[clap(
        long,
        default_value = "465",
        env,
        help = "SMTP port (implicit TLS)"
    )]
    pub ticketmail_smtp_port: u16,

    #[clap(long, env, help = "SMTP login user name")]
    pub ticketmail_smtp_username: Option<String>,

    #[clap(long, env, help = "SMTP login password")]
    pub ticketmail_smtp_password: Option<String>,

    #[clap(long, env, help = "Sender address for auto-replies")]
    pub ticketmail_smtp_from_address: Option<String>,

    #[clap(
        long,
        default_value = "Support",
        env,
        help = "Sender display name for auto-replies"
    )]
    pub ticketmail_smtp_from_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScanMode {
    #[clap(name = "unseen")]
    Unseen,
    #[clap(name = "window")]
    Window,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Unseen => write!(f, "unseen"),
            ScanMode::Window => write!(f, "window"),
        }
    }
}

impl Settings {
    #[cfg(test)]
    fn new_for_test() -> Self {
        Self {
            ticketmail_log_level: "info".to_string(),
            ticketmail_ansi_logs: false,
            ticketmail_log_to_file: false,
            ticketmail_max_server_log_files: 5,
            ticketmail_root_dir: std::env::temp_dir()
                .join("ticketmail_test_data")
                .to_string_lossy()
                .into_owned(),
            ticketmail_memory_mode_enabled: true,
            ticketmail_http_port: 15730,
            ticketmail_bind_ip: "127.0.0.1".into(),
            ticketmail_http_timeout_secs: 300,
            ticketmail_access_token: None,
            ticketmail_imap_host: "imap.example.com".into(),
            ticketmail_imap_port: 993,
            ticketmail_imap_username: "support@example.com".into(),
            ticketmail_imap_password: "secret".into(),
            ticketmail_imap_mailbox: "INBOX".into(),
            ticketmail_imap_command_timeout_secs: 30,
            ticketmail_scan_mode: ScanMode::Unseen,
            ticketmail_scan_window: 30,
            ticketmail_poll_interval_secs: None,
            ticketmail_poll_budget_secs: 120,
            ticketmail_content_hash_dedup: false,
            ticketmail_smtp_host: None,
            ticketmail_smtp_port: 465,
            ticketmail_smtp_username: None,
            ticketmail_smtp_password: None,
            ticketmail_smtp_from_address: None,
            ticketmail_smtp_from_name: "Support".into(),
        }
    }
}
