// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod client;
pub mod mailbox;
pub mod response;
pub mod session;
#[cfg(test)]
mod tests;
