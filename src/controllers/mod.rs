use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;

use crate::auth::AuthService;
use crate::config::Config;
use crate::currency::RateClient;

/// Shared application state available in all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub rates: RateClient,
}

pub mod auth;
pub mod currency;
pub mod user;

/// Build all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::routes())
        .nest("/api/user", user::routes())
        .nest("/api/currency", currency::routes())
}
