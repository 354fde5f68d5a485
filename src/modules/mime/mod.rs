// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod decoder;
pub mod header;
pub mod parser;
pub mod part;
#[cfg(test)]
mod tests;
