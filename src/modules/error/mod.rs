// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Formatter;

use code::ErrorCode;
use poem::http::StatusCode;
use poem_openapi::{payload::Json, ApiResponse, Object};
use snafu::{Location, Snafu};

pub mod code;
pub mod handler;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TicketMailError {
    #[snafu(display("{message}"))]
    Generic {
        message: String,
        #[snafu(implicit)]
        location: Location,
        code: ErrorCode,
    },
}

pub type TicketMailResult<T, E = TicketMailError> = std::result::Result<T, E>;

impl TicketMailError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TicketMailError::Generic { code, .. } => *code,
        }
    }

    /// Logs an error that is about to reach an HTTP client. Contention and
    /// re-delivered mail are routine; only server-side failures log at error.
    pub fn log_response(&self) {
        let TicketMailError::Generic {
            message,
            location,
            code,
        } = self;
        match code {
            ErrorCode::PollInProgress => {
                tracing::info!("Poll trigger rejected: {}", message)
            }
            ErrorCode::DuplicateMessage => {
                tracing::warn!("Message already stored: {} at {:?}", message, location)
            }
            _ if code.status().is_server_error() => tracing::error!(
                error_code = *code as u32,
                error_message = %message,
                error_location = ?location
            ),
            _ => tracing::debug!("Request rejected [{:?}]: {}", code, message),
        }
    }
}

/// Error body returned by the HTTP surface.
#[derive(Debug, Clone, Object)]
pub struct ApiError {
    pub error: String,
    pub code: u32,
}

impl From<TicketMailError> for ApiErrorResponse {
    fn from(error: TicketMailError) -> Self {
        error.log_response();
        match error {
            TicketMailError::Generic { message, code, .. } => {
                let api_error = ApiError {
                    error: message,
                    code: code as u32,
                };
                ApiErrorResponse::Generic(code.status(), Json(api_error))
            }
        }
    }
}

impl ApiError {
    pub fn new(error: String, code: u32) -> Self {
        Self { error, code }
    }

    pub fn new_with_error_code<ErrorType: std::fmt::Display>(
        error: ErrorType,
        code: u32,
    ) -> ApiError {
        Self::new(format!("{:#}", error), code)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error({}): {}", self.code, self.error)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, ApiResponse)]
pub enum ApiErrorResponse {
    Generic(StatusCode, Json<ApiError>),
}
