use chrono::Local;
use poem_openapi::Object;
use serde::Deserialize;
use serde::Serialize;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use timeago::Formatter;

use crate::modules::settings::cli::SETTINGS;

static STARTED_AT: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Marks the process start; called once from `main`.
pub fn mark_started() {
    LazyLock::force(&STARTED_AT);
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Object)]
pub struct ServiceStatus {
    /// The service uptime in milliseconds since it started.
    pub uptime_ms: i64,
    /// A human-readable string indicating the time elapsed since the service started.
    pub timeago: String,
    /// The timezone in which the service is operating.
    pub timezone: String,
    /// The version of the service currently running.
    pub version: String,
    /// The IMAP host this instance polls.
    pub mailbox_host: String,
}

impl ServiceStatus {
    pub fn get() -> Self {
        let uptime = STARTED_AT.elapsed();
        Self {
            uptime_ms: uptime.as_millis() as i64,
            timeago: Formatter::new().convert(Duration::from_millis(uptime.as_millis() as u64)),
            timezone: Local::now().offset().to_string(),
            version: env!("CARGO_PKG_VERSION").into(),
            mailbox_host: SETTINGS.ticketmail_imap_host.clone(),
        }
    }
}
