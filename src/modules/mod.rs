// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod common;
pub mod context;
pub mod database;
pub mod error;
pub mod imap;
pub mod inbound;
pub mod logger;
pub mod mime;
pub mod notify;
pub mod poller;
pub mod rest;
pub mod scheduler;
pub mod settings;
pub mod ticket;
pub mod utils;
