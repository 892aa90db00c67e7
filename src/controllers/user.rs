use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::hash_password;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Json};
use crate::models::user::{self, Entity as User, RegisterResponse, UserResponse};

use super::AppState;

// ── Request types ──

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/complete_profile", put(complete_profile))
        .route("/about_me", get(about_me))
}

// ── Handlers ──

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 409, description = "Email or username already taken"),
        (status = 422, description = "Invalid payload")
    ),
    tag = "user"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let existing = User::find()
        .filter(
            user::Column::Email
                .eq(&payload.email)
                .or(user::Column::Username.eq(&payload.username)),
        )
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(ApiError::UserAlreadyExists {
            username: payload.username,
            email: payload.email,
        });
    }

    let hashed_password = hash_password(&payload.password)?;

    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        username: Set(payload.username),
        first_name: Set(None),
        last_name: Set(None),
        hashed_password: Set(hashed_password),
    };

    let user_model = new_user.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(user_model))).into_response())
}

/// Fill in the profile of the authenticated user.
#[utoipa::path(
    put,
    path = "/api/user/complete_profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "User not found")
    ),
    tag = "user",
    security(("bearer_auth" = []))
)]
pub async fn complete_profile(
    State(state): State<AppState>,
    CurrentUser(db_user): CurrentUser,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut active: user::ActiveModel = db_user.into();
    active.first_name = Set(Some(payload.first_name));
    active.last_name = Set(Some(payload.last_name));
    let updated = active.update(&state.db).await?;

    Ok(Json(UserResponse::from(updated)))
}

/// Get info about the authenticated user.
#[utoipa::path(
    get,
    path = "/api/user/about_me",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "User not found")
    ),
    tag = "user",
    security(("bearer_auth" = []))
)]
pub async fn about_me(CurrentUser(db_user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(db_user))
}
