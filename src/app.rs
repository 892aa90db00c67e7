use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::auth::{AuthService, JwtCodec};
use crate::config::Config;
use crate::controllers::{self, AppState};
use crate::currency::RateClient;
use crate::migrations::Migrator;
use crate::openapi::ApiDoc;

/// The assembled application: configuration, database and shared state.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
    state: AppState,
}

impl App {
    /// Create the application from environment configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_config(Config::from_env()).await
    }

    /// Create the application with a given config.
    pub async fn with_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::db::connect(&config).await?;

        tracing::info!("Running pending database migrations...");
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations complete.");

        let codec = JwtCodec::new(&config)?;

        let state = AppState {
            db: db.clone(),
            config: Arc::new(config.clone()),
            auth: AuthService::new(db.clone(), codec),
            rates: RateClient::new(&config),
        };

        Ok(App { config, db, state })
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let is_dev = self.config.is_dev();
        let openapi_spec = ApiDoc::openapi();
        let openapi_spec_clone = openapi_spec.clone();

        let mut router = Router::new()
            .merge(controllers::routes().with_state(self.state.clone()))
            .merge(Scalar::with_url("/api-docs", openapi_spec))
            .route(
                "/api-docs/openapi.json",
                get(move || {
                    let spec = openapi_spec_clone.clone();
                    async move { axum::Json(spec) }
                }),
            )
            .layer(CorsLayer::permissive());

        // Request tracing and request-id propagation only in development.
        if is_dev {
            use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse};
            use tower_http::LatencyUnit;

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Run the application server until ctrl-c.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("coinvert server running on http://{addr} (docs at /api-docs)");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down coinvert server...");
}
