// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::logger::LocalTimer;
use crate::modules::settings::cli::SETTINGS;
use crate::modules::settings::dir::DATA_DIR_MANAGER;
use std::process;
use std::sync::OnceLock;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;

pub static LOG_WORKER_GUARD: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

pub fn setup_file_logger(level: Level) -> Result<(), tracing::dispatcher::SetGlobalDefaultError> {
    let (server_nonb, server_guard) = server_log_writer();
    // A second call keeps the first guard alive; nothing to flush twice.
    let _ = LOG_WORKER_GUARD.set(vec![server_guard]);

    let server_layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_ansi(SETTINGS.ticketmail_ansi_logs)
        .with_level(true)
        .with_writer(server_nonb)
        .with_target(true);

    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(server_layer);

    tracing::subscriber::set_global_default(subscriber)
}

fn server_log_writer() -> (NonBlocking, WorkerGuard) {
    if let Err(e) = std::fs::create_dir_all(&DATA_DIR_MANAGER.log_dir) {
        eprintln!(
            "Failed to create log directory {}: {e}",
            DATA_DIR_MANAGER.log_dir.display()
        );
        process::exit(1);
    }
    let rolling = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("server")
        .max_log_files(SETTINGS.ticketmail_max_server_log_files)
        .build(DATA_DIR_MANAGER.log_dir.clone())
    {
        Ok(rolling) => rolling,
        Err(e) => {
            eprintln!("Failed to initialize rolling file appender: {e}");
            process::exit(1);
        }
    };
    tracing_appender::non_blocking(rolling)
}
