use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::auth::TokenType;
use crate::controllers::AppState;
use crate::error::ApiError;
use crate::models::user::{self, Entity as User};

/// Extractor that validates the bearer access token and loads the
/// authenticated user.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn my_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     // user.email is the authenticated subject
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::MalformedAuthorizationHeader(
                    "No Authorization header received".to_string(),
                )
            })?;

        let (scheme, token) = header.rsplit_once(' ').ok_or_else(|| {
            ApiError::MalformedAuthorizationHeader(
                "Check if Bearer is included in Authorization header".to_string(),
            )
        })?;

        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(ApiError::MalformedAuthorizationHeader(
                "Check if Bearer is included in Authorization header".to_string(),
            ));
        }

        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::MalformedAuthorizationHeader(
                "No authorization token received".to_string(),
            ));
        }

        // Access tokens are expiry-only: no ledger lookup, no revocation.
        let claims = state
            .auth
            .verify_token_and_type(token, TokenType::Access, true)?;

        let db_user = User::find()
            .filter(user::Column::Email.eq(&claims.sub))
            .one(&state.db)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        Ok(CurrentUser(db_user))
    }
}
