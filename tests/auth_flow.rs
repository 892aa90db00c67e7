//! End-to-end tests for the auth surface: registration, login, token
//! rotation, revocation and the CSRF/device guards.
//!
//! The harness client keeps no cookie jar, so every test wires cookies and
//! headers by hand — that is the point: we need to replay, drop and tamper
//! with them.

use coinvert::extractors::{CSRF_COOKIE, CSRF_HEADER, DEVICE_ID_HEADER, REFRESH_COOKIE};
use coinvert::testing::{LoginSession, TestApp};

const EMAIL: &str = "alice@example.com";
const USERNAME: &str = "alice";
const PASSWORD: &str = "correct-horse-battery";
const DEVICE: &str = "laptop";

async fn app_with_user() -> TestApp {
    let app = TestApp::new().await;
    app.register_user(EMAIL, USERNAME, PASSWORD).await;
    app
}

fn refresh_headers<'a>(
    session: &'a LoginSession,
    device_id: &'a str,
    cookie: &'a str,
) -> Vec<(&'a str, &'a str)> {
    vec![
        (DEVICE_ID_HEADER, device_id),
        (CSRF_HEADER, session.csrf_token.as_str()),
        ("cookie", cookie),
    ]
}

fn session_cookie(session: &LoginSession) -> String {
    format!(
        "{}={}; {}={}",
        CSRF_COOKIE, session.csrf_token, REFRESH_COOKIE, session.refresh_token
    )
}

#[tokio::test]
async fn register_login_and_fetch_profile() {
    let app = TestApp::new().await;

    let registered = app.register_user(EMAIL, USERNAME, PASSWORD).await;
    assert_eq!(registered["email"], EMAIL);
    assert_eq!(registered["username"], USERNAME);
    assert!(registered["id"].is_string());

    let session = app.login(USERNAME, PASSWORD, DEVICE).await;
    assert!(!session.access_token.is_empty());
    assert!(!session.refresh_token.is_empty());
    // Double-submit: the header value mirrors the cookie.
    assert_eq!(session.csrf_token.len(), 64);

    let res = app
        .client
        .get_with_auth(&app.url("/api/user/about_me"), &session.access_token)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["email"], EMAIL);
    assert_eq!(res.json()["username"], USERNAME);
}

#[tokio::test]
async fn login_response_sets_cookies_and_csrf_header() {
    let app = app_with_user().await;

    let body = serde_json::json!({ "username": USERNAME, "password": PASSWORD });
    let res = app
        .client
        .post_with_headers(
            &app.url("/api/auth/login"),
            &body.to_string(),
            &[(DEVICE_ID_HEADER, DEVICE)],
        )
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.json()["token_scheme"], "Bearer");

    let csrf_cookie = res.cookie(CSRF_COOKIE).expect("csrf cookie missing");
    assert_eq!(res.header(CSRF_HEADER).as_deref(), Some(csrf_cookie.as_str()));
    assert!(res.cookie(REFRESH_COOKIE).is_some());

    // Both cookies are HttpOnly and strict same-site.
    for value in res.headers.get_all("set-cookie") {
        let raw = value.to_str().unwrap();
        assert!(raw.contains("HttpOnly"), "cookie not HttpOnly: {raw}");
        assert!(raw.contains("SameSite=Strict"), "cookie not strict: {raw}");
    }
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = app_with_user().await;

    let wrong_password = serde_json::json!({ "username": USERNAME, "password": "nope-nope-nope" });
    let unknown_user = serde_json::json!({ "username": "mallory", "password": PASSWORD });

    for body in [wrong_password, unknown_user] {
        let res = app
            .client
            .post_with_headers(
                &app.url("/api/auth/login"),
                &body.to_string(),
                &[(DEVICE_ID_HEADER, DEVICE)],
            )
            .await;
        assert_eq!(res.status, 401);
        assert_eq!(res.detail(), "Invalid username or password");
    }
}

#[tokio::test]
async fn login_requires_device_header() {
    let app = app_with_user().await;

    let body = serde_json::json!({ "username": USERNAME, "password": PASSWORD });
    let res = app.client.post(&app.url("/api/auth/login"), &body.to_string()).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.detail(), "Invalid request");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = app_with_user().await;

    let body = serde_json::json!({
        "email": EMAIL,
        "username": "different_name",
        "password": PASSWORD,
    });
    let res = app
        .client
        .post(&app.url("/api/user/register"), &body.to_string())
        .await;

    assert_eq!(res.status, 409);
    let detail = res.detail();
    assert!(detail.contains("different_name"));
    assert!(detail.contains(EMAIL));
}

#[tokio::test]
async fn registration_validates_payload_shape() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "email": "not-an-email",
        "username": USERNAME,
        "password": "short",
    });
    let res = app
        .client
        .post(&app.url("/api/user/register"), &body.to_string())
        .await;

    assert_eq!(res.status, 422);
    let details = res.json()["details"].as_array().unwrap().clone();
    let fields: Vec<&str> = details
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
    for detail in &details {
        assert!(detail["type"].is_string());
        assert!(detail["message"].is_string());
    }
}

#[tokio::test]
async fn refresh_rotates_the_pair_and_revokes_the_old_token() {
    let app = app_with_user().await;
    let session = app.login(USERNAME, PASSWORD, DEVICE).await;
    let cookie = session_cookie(&session);

    let res = app
        .client
        .post_with_headers(
            &app.url("/api/auth/refresh"),
            "",
            &refresh_headers(&session, DEVICE, &cookie),
        )
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.json()["token_scheme"], "Bearer");

    let rotated = res.cookie(REFRESH_COOKIE).expect("rotated cookie missing");
    assert_ne!(rotated, session.refresh_token);

    // Replaying the superseded token must fail exactly once revoked.
    let replay = app
        .client
        .post_with_headers(
            &app.url("/api/auth/refresh"),
            "",
            &refresh_headers(&session, DEVICE, &cookie),
        )
        .await;
    assert_eq!(replay.status, 401);
    assert_eq!(replay.detail(), "Token has been revoked");

    // The rotated token is still live.
    let fresh_cookie = format!(
        "{}={}; {}={}",
        CSRF_COOKIE, session.csrf_token, REFRESH_COOKIE, rotated
    );
    let again = app
        .client
        .post_with_headers(
            &app.url("/api/auth/refresh"),
            "",
            &refresh_headers(&session, DEVICE, &fresh_cookie),
        )
        .await;
    assert_eq!(again.status, 201);
}

#[tokio::test]
async fn refresh_without_cookie_asks_for_login() {
    let app = app_with_user().await;
    let session = app.login(USERNAME, PASSWORD, DEVICE).await;

    // CSRF cookie present, refresh cookie dropped.
    let cookie = format!("{}={}", CSRF_COOKIE, session.csrf_token);
    let res = app
        .client
        .post_with_headers(
            &app.url("/api/auth/refresh"),
            "",
            &refresh_headers(&session, DEVICE, &cookie),
        )
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.detail(), "Invalid request data, please login firstly");
}

#[tokio::test]
async fn refresh_rejects_access_token_in_refresh_slot() {
    let app = app_with_user().await;
    let session = app.login(USERNAME, PASSWORD, DEVICE).await;

    let cookie = format!(
        "{}={}; {}={}",
        CSRF_COOKIE, session.csrf_token, REFRESH_COOKIE, session.access_token
    );
    let res = app
        .client
        .post_with_headers(
            &app.url("/api/auth/refresh"),
            "",
            &refresh_headers(&session, DEVICE, &cookie),
        )
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.detail(), "Expected refresh token, got access");
}

#[tokio::test]
async fn csrf_mismatch_blocks_the_request_and_leaves_the_ledger_alone() {
    let app = app_with_user().await;
    let session = app.login(USERNAME, PASSWORD, DEVICE).await;
    let cookie = session_cookie(&session);

    // Header disagrees with the cookie.
    let res = app
        .client
        .post_with_headers(
            &app.url("/api/auth/logout"),
            "",
            &[
                (DEVICE_ID_HEADER, DEVICE),
                (CSRF_HEADER, "0000000000000000"),
                ("cookie", cookie.as_str()),
                (
                    "authorization",
                    &format!("Bearer {}", session.access_token),
                ),
            ],
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.detail(), "Invalid request");

    // The refresh token was not revoked by the failed attempt.
    let refresh = app
        .client
        .post_with_headers(
            &app.url("/api/auth/refresh"),
            "",
            &refresh_headers(&session, DEVICE, &cookie),
        )
        .await;
    assert_eq!(refresh.status, 201);
}

#[tokio::test]
async fn logout_revokes_once_then_counts_zero() {
    let app = app_with_user().await;
    let session = app.login(USERNAME, PASSWORD, DEVICE).await;
    let guarded = session.guarded_headers(DEVICE);
    let headers: Vec<(&str, &str)> = guarded
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let res = app
        .client
        .post_with_headers(&app.url("/api/auth/logout"), "", &headers)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["tokens_revoked"], 1);

    // Cookies are cleared on the way out.
    let cleared: Vec<&str> = res
        .headers
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert!(cleared.iter().all(|c| c.contains("Max-Age=0")));

    // Access tokens are expiry-only, so a second logout still authenticates
    // but finds nothing left to revoke.
    let res = app
        .client
        .post_with_headers(&app.url("/api/auth/logout"), "", &headers)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["tokens_revoked"], 0);

    // And the refresh token is dead.
    let cookie = session_cookie(&session);
    let refresh = app
        .client
        .post_with_headers(
            &app.url("/api/auth/refresh"),
            "",
            &refresh_headers(&session, DEVICE, &cookie),
        )
        .await;
    assert_eq!(refresh.status, 401);
    assert_eq!(refresh.detail(), "Token has been revoked");
}

#[tokio::test]
async fn logout_all_counts_every_device() {
    let app = app_with_user().await;

    let _phone = app.login(USERNAME, PASSWORD, "phone").await;
    let _tablet = app.login(USERNAME, PASSWORD, "tablet").await;
    let laptop = app.login(USERNAME, PASSWORD, DEVICE).await;

    let guarded = laptop.guarded_headers(DEVICE);
    let headers: Vec<(&str, &str)> = guarded
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let res = app
        .client
        .post_with_headers(&app.url("/api/auth/logout_all"), "", &headers)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["tokens_revoked"], 3);
}

#[tokio::test]
async fn second_login_on_a_device_supersedes_the_first() {
    let app = app_with_user().await;

    let first = app.login(USERNAME, PASSWORD, DEVICE).await;
    let second = app.login(USERNAME, PASSWORD, DEVICE).await;

    let first_cookie = session_cookie(&first);
    let res = app
        .client
        .post_with_headers(
            &app.url("/api/auth/refresh"),
            "",
            &refresh_headers(&first, DEVICE, &first_cookie),
        )
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.detail(), "Token has been revoked");

    let second_cookie = session_cookie(&second);
    let res = app
        .client
        .post_with_headers(
            &app.url("/api/auth/refresh"),
            "",
            &refresh_headers(&second, DEVICE, &second_cookie),
        )
        .await;
    assert_eq!(res.status, 201);
}

#[tokio::test]
async fn sessions_on_other_devices_survive_a_single_logout() {
    let app = app_with_user().await;

    let phone = app.login(USERNAME, PASSWORD, "phone").await;
    let laptop = app.login(USERNAME, PASSWORD, DEVICE).await;

    let guarded = laptop.guarded_headers(DEVICE);
    let headers: Vec<(&str, &str)> = guarded
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let res = app
        .client
        .post_with_headers(&app.url("/api/auth/logout"), "", &headers)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["tokens_revoked"], 1);

    let phone_cookie = session_cookie(&phone);
    let res = app
        .client
        .post_with_headers(
            &app.url("/api/auth/refresh"),
            "",
            &refresh_headers(&phone, "phone", &phone_cookie),
        )
        .await;
    assert_eq!(res.status, 201);
}

#[tokio::test]
async fn malformed_authorization_headers_are_rejected() {
    let app = app_with_user().await;
    let url = app.url("/api/user/about_me");

    let res = app.client.get(&url).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.detail(), "No Authorization header received");

    let res = app
        .client
        .get_with_headers(&url, &[("authorization", "Token abc123")])
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(
        res.detail(),
        "Check if Bearer is included in Authorization header"
    );

    let res = app
        .client
        .get_with_headers(&url, &[("authorization", "Bearer ")])
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.detail(), "No authorization token received");

    let res = app
        .client
        .get_with_headers(&url, &[("authorization", "Bearer not-a-jwt")])
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.detail(), "Invalid token");
}

#[tokio::test]
async fn refresh_token_is_not_a_valid_access_token() {
    let app = app_with_user().await;
    let session = app.login(USERNAME, PASSWORD, DEVICE).await;

    let res = app
        .client
        .get_with_auth(&app.url("/api/user/about_me"), &session.refresh_token)
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.detail(), "Expected access token, got refresh");
}

#[tokio::test]
async fn complete_profile_updates_the_user() {
    let app = app_with_user().await;
    let session = app.login(USERNAME, PASSWORD, DEVICE).await;

    let body = serde_json::json!({ "first_name": "Alice", "last_name": "Liddell" });
    let res = app
        .client
        .put_with_headers(
            &app.url("/api/user/complete_profile"),
            &body.to_string(),
            &[(
                "authorization",
                &format!("Bearer {}", session.access_token),
            )],
        )
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.json()["first_name"], "Alice");
    assert_eq!(res.json()["last_name"], "Liddell");

    let res = app
        .client
        .get_with_auth(&app.url("/api/user/about_me"), &session.access_token)
        .await;
    assert_eq!(res.json()["first_name"], "Alice");
    assert_eq!(res.json()["last_name"], "Liddell");
}
