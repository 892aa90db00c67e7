use utoipa::OpenApi;

use crate::controllers::auth::{AccessToken, UserCreds};
use crate::controllers::currency::{ConvertRatesResponse, ConvertRequest, CurrencyListResponse};
use crate::controllers::user::{ProfileUpdateRequest, RegisterRequest};
use crate::currency::CurrencyInfo;
use crate::models::user::{RegisterResponse, UserResponse};
use crate::response::LogoutResponse;

/// OpenAPI documentation for the coinvert API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "coinvert API",
        version = "0.1.0",
        description = "Currency-conversion API with JWT session management"
    ),
    paths(
        crate::controllers::auth::login,
        crate::controllers::auth::refresh,
        crate::controllers::auth::logout,
        crate::controllers::auth::logout_all,
        crate::controllers::user::register,
        crate::controllers::user::complete_profile,
        crate::controllers::user::about_me,
        crate::controllers::currency::list,
        crate::controllers::currency::convert,
    ),
    components(
        schemas(
            UserCreds,
            AccessToken,
            LogoutResponse,
            RegisterRequest,
            RegisterResponse,
            ProfileUpdateRequest,
            UserResponse,
            CurrencyInfo,
            CurrencyListResponse,
            ConvertRequest,
            ConvertRatesResponse,
        )
    ),
    tags(
        (name = "auth", description = "Login, token refresh and logout"),
        (name = "user", description = "Registration and profile"),
        (name = "currency", description = "Currency listings and conversion")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
