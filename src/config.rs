use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// Built once at startup and passed explicitly into constructors —
/// business logic never reads the environment on its own.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://coinvert.db, postgres://...)
    pub database_url: String,

    /// JWT signing secret (shared HMAC key)
    pub jwt_secret: String,

    /// JWT signing algorithm: HS256 (default), HS384 or HS512
    pub jwt_algorithm: String,

    /// Access token lifetime in minutes (default: 15)
    pub access_token_expiry_minutes: i64,

    /// Refresh token lifetime in days (default: 30)
    pub refresh_token_expiry_days: i64,

    /// Base URL of the currency-rate provider
    pub currency_api_url: String,

    /// Whether auth cookies carry the `Secure` attribute (default: off,
    /// enable behind TLS)
    pub cookie_secure: bool,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 8000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://coinvert.db?mode=rwc".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "coinvert-dev-secret-change-me".to_string()),
            jwt_algorithm: std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_string()),
            access_token_expiry_minutes: std::env::var("JWT_ACCESS_TOKEN_EXPIRES_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
            refresh_token_expiry_days: std::env::var("JWT_REFRESH_TOKEN_EXPIRES_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            currency_api_url: std::env::var("CURRENCY_API_URL")
                .unwrap_or_else(|_| "https://api.coinlore.net/api".to_string()),
            cookie_secure: matches!(
                std::env::var("COOKIE_SECURE")
                    .unwrap_or_default()
                    .to_lowercase()
                    .as_str(),
                "true" | "1" | "yes"
            ),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
