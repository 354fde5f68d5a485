// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::database::TICKET_MODELS;
use crate::modules::error::{code::ErrorCode, TicketMailError, TicketMailResult};
use crate::modules::settings::cli::SETTINGS;
use crate::modules::settings::dir::DATA_DIR_MANAGER;
use crate::raise_error;
use native_db::{Builder, Database};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub struct DatabaseManager {
    ticket_db: Arc<Database<'static>>,
}

impl DatabaseManager {
    /// Opens the ticket database selected by the settings.
    pub fn open() -> TicketMailResult<Self> {
        let ticket_db = if SETTINGS.ticketmail_memory_mode_enabled {
            warn!("Ticket store runs in memory mode; data is lost on restart");
            Self::in_memory()?
        } else {
            Self::on_disk(&DATA_DIR_MANAGER.ticket_db)?
        };
        Ok(Self { ticket_db })
    }

    pub fn ticket_db(&self) -> &Arc<Database<'static>> {
        &self.ticket_db
    }

    pub fn in_memory() -> TicketMailResult<Arc<Database<'static>>> {
        let database = Builder::new()
            .create_in_memory(&TICKET_MODELS)
            .map_err(Self::handle_database_error)?;
        Ok(Arc::new(database))
    }

    pub fn on_disk(path: &Path) -> TicketMailResult<Arc<Database<'static>>> {
        info!("Initializing ticket database at: {:?}", path);
        let mut database = Builder::new()
            .create(&TICKET_MODELS, path)
            .map_err(Self::handle_database_error)?;
        database
            .compact()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        Ok(Arc::new(database))
    }

    fn handle_database_error(error: native_db::db_type::Error) -> TicketMailError {
        match error {
            native_db::db_type::Error::RedbDatabaseError(database_error) => match database_error {
                redb::DatabaseError::DatabaseAlreadyOpen => {
                    raise_error!(
                        "Database is already open by another instance".into(),
                        ErrorCode::InternalError
                    )
                }
                other => {
                    raise_error!(
                        format!("Database error: {:?}", other),
                        ErrorCode::InternalError
                    )
                }
            },
            other => {
                raise_error!(
                    format!("Failed to create database: {:?}", other),
                    ErrorCode::InternalError
                )
            }
        }
    }
}
