// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::context::Initialize;
use crate::modules::settings::cli::SETTINGS;
use crate::{
    modules::error::{code::ErrorCode, TicketMailResult},
    raise_error,
};
use std::path::PathBuf;
use std::sync::LazyLock;

pub const TICKET_FILE: &str = "tickets.db";
const LOG_DIR: &str = "logs";

pub static DATA_DIR_MANAGER: LazyLock<DataDirManager> =
    LazyLock::new(|| DataDirManager::new(PathBuf::from(&SETTINGS.ticketmail_root_dir)));

#[derive(Debug)]
pub struct DataDirManager {
    pub root_dir: PathBuf,
    pub ticket_db: PathBuf,
    pub log_dir: PathBuf,
}

impl Initialize for DataDirManager {
    async fn initialize() -> TicketMailResult<()> {
        for dir in [&DATA_DIR_MANAGER.root_dir, &DATA_DIR_MANAGER.log_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                raise_error!(
                    format!("Failed to create directory {}: {:#?}", dir.display(), e),
                    ErrorCode::InternalError
                )
            })?;
        }
        Ok(())
    }
}

impl DataDirManager {
    pub fn new(root_dir: PathBuf) -> Self {
        Self {
            ticket_db: root_dir.join(TICKET_FILE),
            log_dir: root_dir.join(LOG_DIR),
            root_dir,
        }
    }
}
