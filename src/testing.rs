//! Integration-test harness.
//!
//! Spins up the full application against an in-memory SQLite database on a
//! random local port, and provides a thin HTTP client that does NOT keep a
//! cookie jar — tests manage cookies by hand so they can replay, drop, or
//! tamper with them.

use axum::http::HeaderMap;
use sea_orm::DatabaseConnection;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::extractors::{CSRF_COOKIE, CSRF_HEADER, DEVICE_ID_HEADER, REFRESH_COOKIE};

/// A running test instance of the application.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_register() {
///     let app = TestApp::new().await;
///     let res = app
///         .client
///         .post(
///             &app.url("/api/user/register"),
///             r#"{"email":"a@b.com","username":"bob","password":"secret123"}"#,
///         )
///         .await;
///     assert_eq!(res.status, 201);
/// }
/// ```
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub db: DatabaseConnection,
    pub config: Config,
}

/// Everything the login endpoint hands back, captured for manual replay.
pub struct LoginSession {
    pub access_token: String,
    pub csrf_token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Create a new test app with an in-memory SQLite database.
    pub async fn new() -> Self {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret-key-for-testing".to_string(),
            jwt_algorithm: "HS256".to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 30,
            currency_api_url: "http://127.0.0.1:9".to_string(),
            cookie_secure: false,
            server_host: "127.0.0.1".to_string(),
            server_port: 0, // OS assigns a random port
            environment: "test".to_string(),
        };

        Self::with_config(config).await
    }

    /// Create a new test app with a custom config.
    pub async fn with_config(config: Config) -> Self {
        let app = crate::App::with_config(config)
            .await
            .expect("Failed to create test app");

        let router = app.router();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = TestClient::new(addr);

        TestApp {
            addr,
            client,
            db: app.db,
            config: app.config,
        }
    }

    /// Get the full URL for a path on the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Register a user and return the response JSON.
    pub async fn register_user(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> serde_json::Value {
        let body = serde_json::json!({
            "email": email,
            "username": username,
            "password": password,
        });

        let res = self
            .client
            .post(&self.url("/api/user/register"), &body.to_string())
            .await;

        assert_eq!(
            res.status, 201,
            "Registration failed with status {}: {}",
            res.status, res.body
        );

        res.json()
    }

    /// Log in from the given device and capture the full session material.
    pub async fn login(&self, username: &str, password: &str, device_id: &str) -> LoginSession {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let res = self
            .client
            .post_with_headers(
                &self.url("/api/auth/login"),
                &body.to_string(),
                &[(DEVICE_ID_HEADER, device_id)],
            )
            .await;

        assert_eq!(res.status, 200, "Login failed: {}", res.body);

        let access_token = res.json()["access_token"]
            .as_str()
            .expect("login response missing access_token")
            .to_string();
        let csrf_token = res
            .cookie(CSRF_COOKIE)
            .expect("login response missing csrf_token cookie");
        let refresh_token = res
            .cookie(REFRESH_COOKIE)
            .expect("login response missing refresh_token cookie");

        LoginSession {
            access_token,
            csrf_token,
            refresh_token,
        }
    }
}

impl LoginSession {
    /// Headers for a CSRF-guarded request from this session: the device id,
    /// the double-submit header, and both auth cookies.
    pub fn guarded_headers(&self, device_id: &str) -> Vec<(String, String)> {
        vec![
            (DEVICE_ID_HEADER.to_string(), device_id.to_string()),
            (CSRF_HEADER.to_string(), self.csrf_token.clone()),
            (
                "cookie".to_string(),
                format!(
                    "{}={}; {}={}",
                    CSRF_COOKIE, self.csrf_token, REFRESH_COOKIE, self.refresh_token
                ),
            ),
            (
                "authorization".to_string(),
                format!("Bearer {}", self.access_token),
            ),
        ]
    }
}

/// A simple HTTP test client with helper methods. No cookie store.
#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
    base_addr: SocketAddr,
}

impl TestClient {
    pub fn new(addr: SocketAddr) -> Self {
        TestClient {
            inner: reqwest::Client::new(),
            base_addr: addr,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str) -> TestResponse {
        let res = self.inner.get(url).send().await.expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, url: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut req = self.inner.get(url);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let res = req.send().await.expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with a bearer token.
    pub async fn get_with_auth(&self, url: &str, token: &str) -> TestResponse {
        self.get_with_headers(url, &[("authorization", &format!("Bearer {token}"))])
            .await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, url: &str, body: &str) -> TestResponse {
        self.post_with_headers(url, body, &[]).await
    }

    /// Send a POST request with a JSON body and extra headers.
    pub async fn post_with_headers(
        &self,
        url: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut req = self
            .inner
            .post(url)
            .header("content-type", "application/json")
            .body(body.to_string());
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let res = req.send().await.expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with a bearer token and JSON body.
    pub async fn post_with_auth(&self, url: &str, token: &str, body: &str) -> TestResponse {
        self.post_with_headers(url, body, &[("authorization", &format!("Bearer {token}"))])
            .await
    }

    /// Send a PUT request with a JSON body and extra headers.
    pub async fn put_with_headers(
        &self,
        url: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut req = self
            .inner
            .put(url)
            .header("content-type", "application/json")
            .body(body.to_string());
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let res = req.send().await.expect("PUT request failed");
        TestResponse::from_response(res).await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.base_addr)
    }
}

/// A captured HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub body: String,
    pub headers: HeaderMap,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res.text().await.unwrap_or_default();
        TestResponse {
            status,
            body,
            headers,
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }

    /// The `detail` message of an error body.
    pub fn detail(&self) -> String {
        self.json()["detail"].as_str().unwrap_or_default().to_string()
    }

    /// Get a response header value as a string.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Extract a cookie value from the `Set-Cookie` headers, if present.
    pub fn cookie(&self, name: &str) -> Option<String> {
        for value in self.headers.get_all("set-cookie") {
            let raw = value.to_str().ok()?;
            let pair = raw.split(';').next().unwrap_or(raw).trim();
            if let Some((k, v)) = pair.split_once('=') {
                if k == name {
                    return Some(v.to_string());
                }
            }
        }
        None
    }
}
