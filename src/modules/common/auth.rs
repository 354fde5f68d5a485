// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::{error::code::ErrorCode, settings::cli::SETTINGS};
use poem::{
    web::headers::{authorization::Bearer, Authorization, HeaderMapExt},
    Endpoint, Middleware, Request, Result,
};
use serde::Deserialize;

use super::create_api_error_response;

/// Requires `Authorization: Bearer <token>` (or `?access_token=`) when an
/// access token is configured. Without one, the API is open.
pub struct ApiGuard;

pub struct ApiGuardEndpoint<E> {
    ep: E,
}

impl<E: Endpoint> Middleware<E> for ApiGuard {
    type Output = ApiGuardEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        ApiGuardEndpoint { ep }
    }
}

#[derive(Deserialize)]
struct Param {
    access_token: String,
}

impl<E: Endpoint> Endpoint for ApiGuardEndpoint<E> {
    type Output = E::Output;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        if let Some(expected) = SETTINGS.ticketmail_access_token.as_deref() {
            let presented = req
                .headers()
                .typed_get::<Authorization<Bearer>>()
                .map(|auth| auth.0.token().to_string())
                .or_else(|| req.params::<Param>().ok().map(|param| param.access_token));
            match presented {
                Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => {}
                Some(_) => {
                    return Err(create_api_error_response(
                        "Invalid access token",
                        ErrorCode::PermissionDenied,
                    ))
                }
                None => {
                    return Err(create_api_error_response(
                        "Valid access token not found",
                        ErrorCode::PermissionDenied,
                    ))
                }
            }
        }
        self.ep.call(req).await
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::constant_time_eq;

    #[test]
    fn token_comparison() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret2"));
    }
}
