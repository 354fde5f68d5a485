// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::{code::ErrorCode, ApiError, ApiErrorResponse, TicketMailError};
use poem::error::ResponseError;
use poem::{IntoResponse, Response};
use poem_openapi::payload::Json;

/// Code for a rejection raised by poem itself rather than by a ticketmail handler.
fn framework_error_code(error: &poem::Error) -> Option<ErrorCode> {
    if error.is::<poem::error::NotFoundError>() {
        return Some(ErrorCode::ResourceNotFound);
    }
    if error.is::<poem::error::ParsePathError>()
        || error.is::<poem::error::ParseQueryError>()
        || error.is::<poem::error::ParseJsonError>()
        || error.is::<poem_openapi::error::ParseRequestPayloadError>()
        || error.is::<poem_openapi::error::ContentTypeError>()
        || error.is::<poem_openapi::error::ParseParamError>()
        || error.is::<poem_openapi::error::ParsePathError>()
    {
        return Some(ErrorCode::InvalidParameter);
    }
    if error.is::<poem::error::MethodNotAllowedError>() {
        return Some(ErrorCode::MethodNotAllowed);
    }
    if error.is::<poem_openapi::error::AuthorizationError>() {
        return Some(ErrorCode::PermissionDenied);
    }
    None
}

/// Renders every error as `{ error, code }`. Poll contention (409) and
/// duplicate deliveries keep their own codes so clients can retry or ignore them.
pub async fn error_handler(error: poem::Error) -> Response {
    if let Some(error) = error.downcast_ref::<TicketMailError>() {
        return error.as_response();
    }

    if let Some(code) = framework_error_code(&error) {
        let api_error = ApiError::new_with_error_code(error.to_string(), code as u32);
        let mut response = ApiErrorResponse::Generic(code.status(), Json(api_error)).into_response();
        response.set_status(error.status());
        return response;
    }

    if error.has_source() {
        let api_error =
            ApiError::new_with_error_code(error.to_string(), ErrorCode::UnhandledPoemError as u32);
        let mut response =
            ApiErrorResponse::Generic(ErrorCode::UnhandledPoemError.status(), Json(api_error))
                .into_response();
        response.set_status(error.status());
        response
    } else {
        error.into_response()
    }
}
