// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::http::StatusCode;
use poem_openapi::Enum;

#[derive(Copy, Clone, Debug, Enum, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCode {
    // Client-side errors (10000–10999)
    InvalidParameter = 10000,
    MissingConfiguration = 10020,
    RequestTimeout = 10080,
    MethodNotAllowed = 10090,

    // Authentication and authorization errors (20000–20999)
    PermissionDenied = 20000,

    // Resource errors (30000–30999)
    ResourceNotFound = 30000,
    AlreadyExists = 30010,
    PollInProgress = 30030,

    // Network connection errors (40000–40999)
    NetworkError = 40000,
    ConnectionTimeout = 40010,

    // Mail service errors (50000–50999)
    ImapCommandFailed = 50000,
    ImapAuthenticationFailed = 50010,
    ImapUnexpectedResult = 50020,
    SmtpCommandFailed = 50030,
    SmtpConnectionFailed = 50040,

    // Ticket store errors (60000–60999)
    StoreWriteFailed = 60000,
    DuplicateMessage = 60010,

    // Internal system errors (70000–70999)
    InternalError = 70000,
    UnhandledPoemError = 70010,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidParameter | ErrorCode::MissingConfiguration => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::PermissionDenied => StatusCode::UNAUTHORIZED,
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ErrorCode::AlreadyExists | ErrorCode::PollInProgress | ErrorCode::DuplicateMessage => {
                StatusCode::CONFLICT
            }
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::NetworkError
            | ErrorCode::ConnectionTimeout
            | ErrorCode::ImapCommandFailed
            | ErrorCode::ImapAuthenticationFailed
            | ErrorCode::ImapUnexpectedResult
            | ErrorCode::SmtpCommandFailed
            | ErrorCode::SmtpConnectionFailed
            | ErrorCode::StoreWriteFailed
            | ErrorCode::InternalError
            | ErrorCode::UnhandledPoemError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
