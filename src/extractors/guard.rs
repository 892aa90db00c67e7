use axum::extract::FromRequestParts;
use axum::http::{header::COOKIE, request::Parts, HeaderMap};

use crate::auth::csrf::verify_csrf_token;
use crate::error::ApiError;

pub const DEVICE_ID_HEADER: &str = "x-device-id";
pub const CSRF_HEADER: &str = "x-csrf-token";
pub const CSRF_COOKIE: &str = "csrf_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Pull one cookie value out of the `Cookie` header(s).
///
/// Segments without an `=` and non-UTF-8 headers are skipped, not fatal;
/// other software on the domain may set cookies we cannot parse.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == name {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

/// Requires a non-empty `X-Device-ID` header on every auth-sensitive request.
#[derive(Debug, Clone)]
pub struct DeviceId(pub String);

impl<S> FromRequestParts<S> for DeviceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let device_id = parts
            .headers
            .get(DEVICE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::MissingHeader)?;

        Ok(DeviceId(device_id.to_string()))
    }
}

/// Double-submit CSRF check: the `csrf_token` cookie and the `X-CSRF-Token`
/// header must both be present and byte-identical. Stateless; runs before
/// any handler touches the ledger.
#[derive(Debug, Clone, Copy)]
pub struct CsrfGuard;

impl<S> FromRequestParts<S> for CsrfGuard
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::CsrfMismatch)?;

        let cookie = cookie_value(&parts.headers, CSRF_COOKIE).ok_or(ApiError::CsrfMismatch)?;

        if !verify_csrf_token(&cookie, header) {
            return Err(ApiError::CsrfMismatch);
        }

        Ok(CsrfGuard)
    }
}

/// The refresh token presented in the `refresh_token` cookie.
#[derive(Debug, Clone)]
pub struct RefreshToken(pub String);

impl<S> FromRequestParts<S> for RefreshToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        cookie_value(&parts.headers, REFRESH_COOKIE)
            .filter(|v| !v.is_empty())
            .map(RefreshToken)
            .ok_or(ApiError::NoRefreshToken)
    }
}
