use axum::extract::State;
use axum::http::{header::SET_COOKIE, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::generate_csrf_token;
use crate::error::ApiError;
use crate::extractors::guard::{CSRF_COOKIE, CSRF_HEADER, REFRESH_COOKIE};
use crate::extractors::{CsrfGuard, CurrentUser, DeviceId, Json, RefreshToken};
use crate::response::LogoutResponse;

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserCreds {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessToken {
    pub token_scheme: &'static str,
    pub access_token: String,
}

impl AccessToken {
    fn bearer(access_token: String) -> Self {
        AccessToken {
            token_scheme: "Bearer",
            access_token,
        }
    }
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/logout_all", post(logout_all))
}

// ── Cookie helpers ──

fn set_cookie(name: &str, value: &str, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Strict");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie value: {}", e)))
}

fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie value: {}", e)))
}

// ── Handlers ──

/// Login with username and password.
///
/// Returns the access token in the body; the refresh token and a CSRF token
/// travel as HttpOnly strict-same-site cookies, with the CSRF token echoed in
/// the `X-CSRF-Token` response header for the double-submit pattern.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = UserCreds,
    responses(
        (status = 200, description = "Login successful", body = AccessToken),
        (status = 400, description = "Missing device-id header"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    DeviceId(device_id): DeviceId,
    Json(creds): Json<UserCreds>,
) -> Result<Response, ApiError> {
    let tokens = state
        .auth
        .login(&creds.username, &creds.password, &device_id)
        .await?;

    let csrf_token = generate_csrf_token();
    let secure = state.config.cookie_secure;

    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, set_cookie(CSRF_COOKIE, &csrf_token, secure)?);
    headers.append(
        SET_COOKIE,
        set_cookie(REFRESH_COOKIE, &tokens.refresh_token, secure)?,
    );
    headers.insert(
        HeaderName::from_static(CSRF_HEADER),
        HeaderValue::from_str(&csrf_token)
            .map_err(|e| ApiError::Internal(format!("Invalid CSRF header value: {}", e)))?,
    );

    Ok((headers, Json(AccessToken::bearer(tokens.access_token))).into_response())
}

/// Exchange the refresh-token cookie for a new token pair.
///
/// The used refresh token is revoked and the cookie rotated in one step.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 201, description = "Token pair rotated", body = AccessToken),
        (status = 400, description = "Missing device-id header or CSRF mismatch"),
        (status = 401, description = "Missing, expired, revoked or invalid refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    DeviceId(device_id): DeviceId,
    RefreshToken(refresh_token): RefreshToken,
    _csrf: CsrfGuard,
) -> Result<Response, ApiError> {
    let tokens = state.auth.refresh(&refresh_token, &device_id).await?;

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        set_cookie(REFRESH_COOKIE, &tokens.refresh_token, state.config.cookie_secure)?,
    );

    Ok((
        StatusCode::CREATED,
        headers,
        Json(AccessToken::bearer(tokens.access_token)),
    )
        .into_response())
}

/// Logout from the device named by `X-Device-ID`.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse),
        (status = 400, description = "Missing device-id header or CSRF mismatch"),
        (status = 401, description = "Invalid access token")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    DeviceId(device_id): DeviceId,
    _csrf: CsrfGuard,
    CurrentUser(user): CurrentUser,
) -> Result<Response, ApiError> {
    let tokens_revoked = state.auth.logout(&user.email, &device_id).await?;

    let secure = state.config.cookie_secure;
    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, clear_cookie(REFRESH_COOKIE, secure)?);
    headers.append(SET_COOKIE, clear_cookie(CSRF_COOKIE, secure)?);

    Ok((
        headers,
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
            tokens_revoked,
        }),
    )
        .into_response())
}

/// Logout from all devices.
#[utoipa::path(
    post,
    path = "/api/auth/logout_all",
    responses(
        (status = 200, description = "Logged out everywhere", body = LogoutResponse),
        (status = 400, description = "Missing device-id header or CSRF mismatch"),
        (status = 401, description = "Invalid access token")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn logout_all(
    State(state): State<AppState>,
    DeviceId(_device_id): DeviceId,
    _csrf: CsrfGuard,
    CurrentUser(user): CurrentUser,
) -> Result<Response, ApiError> {
    let tokens_revoked = state.auth.logout_all(&user.email).await?;

    let secure = state.config.cookie_secure;
    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, clear_cookie(REFRESH_COOKIE, secure)?);
    headers.append(SET_COOKIE, clear_cookie(CSRF_COOKIE, secure)?);

    Ok((
        headers,
        Json(LogoutResponse {
            message: "Logged out from all devices".to_string(),
            tokens_revoked,
        }),
    )
        .into_response())
}
