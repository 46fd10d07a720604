/// Request gating and validation tests
///
/// These run without PostgreSQL. The application's pool points at a closed
/// port, so each test below also shows that the request was answered before
/// any query was attempted: a query would surface as a `500` after the pool's
/// acquire timeout. External calls go to `wiremock` servers that expect none.

mod common;

use axum::http::StatusCode;
use common::{
    form_request, get, json_request, offline_app, raw_json_request, send, session_token,
};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock server that fails the test if it receives any request
async fn silent_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    server
}

fn any_user_token() -> String {
    session_token(Uuid::new_v4(), "someone@example.com")
}

#[tokio::test]
async fn test_dashboard_redirects_to_login_with_callback() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(&app, get("/dashboard", None)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/login?callbackUrl=%2Fdashboard");

    let response = send(&app, get("/dashboard/settings?connected=facebook", None)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location(),
        "/login?callbackUrl=%2Fdashboard%2Fsettings%3Fconnected%3Dfacebook"
    );
}

#[tokio::test]
async fn test_dashboard_with_forged_token_redirects() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(&app, get("/dashboard", Some("not-a-session-token"))).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.location().starts_with("/login?callbackUrl="));
}

#[tokio::test]
async fn test_api_requires_session() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    for uri in [
        "/api/content",
        "/api/auth/me",
        "/api/subscription",
        "/api/social/accounts",
        "/api/social/facebook/connect",
        "/api/maintenance/social-accounts",
    ] {
        let response = send(&app, get(uri, None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(response.json()["error"], "unauthorized", "{}", uri);
    }

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/publish",
            None,
            json!({"contentId": Uuid::new_v4(), "platform": "facebook"}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_signed_with_other_secret_is_rejected() {
    use pagepilot_shared::auth::session::{create_session_token, SessionClaims};

    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let claims = SessionClaims::new(Uuid::new_v4(), "a@example.com", chrono::Duration::hours(1));
    let token = create_session_token(&claims, "another-secret-that-is-long-enough-123").unwrap();

    let response = send(&app, get("/api/content", Some(&token))).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_missing_fields_is_bad_request() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    for body in [
        json!({"email": "ana@example.com", "password": "long enough"}),
        json!({"name": "Ana", "password": "long enough"}),
        json!({"name": "Ana", "email": "ana@example.com"}),
        json!({"name": "  ", "email": "ana@example.com", "password": "long enough"}),
        json!({}),
    ] {
        let response = send(&app, json_request("POST", "/api/auth/register", None, body.clone())).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", body);
    }
}

#[tokio::test]
async fn test_register_unknown_plan_is_bad_request() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"name": "Ana", "email": "ana@example.com", "password": "long enough", "plan": "platinum"}),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["message"]
        .as_str()
        .unwrap()
        .contains("platinum"));
}

#[tokio::test]
async fn test_register_invalid_fields_are_unprocessable() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"name": "Ana", "email": "not-an-email", "password": "short"}),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json();
    assert_eq!(body["error"], "validation_error");

    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_unreadable_json_is_a_json_bad_request() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);
    let token = any_user_token();

    let cases = [
        ("/api/auth/register", None, "not json"),
        (
            "/api/auth/register",
            None,
            r#"{"name": 1, "email": "ana@example.com", "password": "long enough"}"#,
        ),
        ("/api/auth/login", None, r#"{"email": ["ana@example.com"]}"#),
        ("/api/publish", Some(token.as_str()), "{"),
        ("/api/content", Some(token.as_str()), r#"{"body": false}"#),
    ];

    for (uri, token, body) in cases {
        let response = send(&app, raw_json_request("POST", uri, token, body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
        assert_eq!(response.json()["error"], "bad_request", "{} {}", uri, body);
    }
}

#[tokio::test]
async fn test_unreadable_query_is_a_json_bad_request() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(&app, get("/api/content?limit=ten", Some(&any_user_token()))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "bad_request");
}

#[tokio::test]
async fn test_login_missing_password_is_bad_request() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(
        &app,
        json_request("POST", "/api/auth/login", None, json!({"email": "ana@example.com"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_publish_rejects_bad_input_without_external_calls() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);
    let token = any_user_token();
    let content_id = Uuid::new_v4().to_string();

    for body in [
        json!({"contentId": content_id, "platform": "myspace"}),
        json!({"contentId": content_id}),
        json!({"platform": "facebook"}),
        json!({"contentId": "", "platform": "facebook"}),
        json!({"contentId": "42", "platform": "instagram"}),
    ] {
        let response = send(&app, json_request("POST", "/api/publish", Some(&token), body.clone())).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(response.json()["error"], "bad_request", "{}", body);
    }

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/publish",
            Some(&token),
            json!({"contentId": content_id, "platform": "myspace"}),
        ),
    )
    .await;
    assert_eq!(response.json()["message"], "Unsupported platform");
}

#[tokio::test]
async fn test_generate_validation_order() {
    let graph = silent_server().await;
    let openai = silent_server().await;
    let token = any_user_token();

    let app = offline_app(&graph.uri(), Some(&openai.uri()));

    let response = send(
        &app,
        json_request("POST", "/api/content/generate", Some(&token), json!({"tone": "playful"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/content/generate",
            Some(&token),
            json!({"prompt": "Spring menu", "platform": "tiktok"}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let unconfigured = offline_app(&graph.uri(), None);
    let response = send(
        &unconfigured,
        json_request(
            "POST",
            "/api/content/generate",
            Some(&token),
            json!({"prompt": "Spring menu", "platform": "instagram"}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_create_content_requires_body() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/content",
            Some(&any_user_token()),
            json!({"title": "Empty", "body": "   "}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_provider_error_redirects_to_settings() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(
        &app,
        get(
            "/api/social/facebook/callback?error=access_denied&error_description=Permissions+error",
            Some(&any_user_token()),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location(),
        "/dashboard/settings?error=Permissions+error"
    );
}

#[tokio::test]
async fn test_callback_missing_code_or_state_is_bad_request() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);
    let token = any_user_token();

    for uri in [
        "/api/social/facebook/callback",
        "/api/social/facebook/callback?code=abc",
        "/api/social/facebook/callback?state=xyz",
        "/api/social/facebook/callback?code=&state=xyz",
    ] {
        let response = send(&app, get(uri, Some(&token))).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_disconnect_unknown_platform_is_bad_request() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(
        &app,
        json_request("DELETE", "/api/social/accounts/myspace", Some(&any_user_token()), json!({})),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_page_sanitizes_callback() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let page = send(&app, get("/login?callbackUrl=%2Fdashboard%2Fsettings", None)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page
        .text()
        .contains(r#"name="callbackUrl" value="/dashboard/settings""#));

    let page = send(&app, get("/login?callbackUrl=https%3A%2F%2Fevil.example", None)).await;
    assert!(page.text().contains(r#"name="callbackUrl" value="/dashboard""#));
    assert!(!page.text().contains("evil.example"));
}

#[tokio::test]
async fn test_login_form_without_password_rerenders() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(
        &app,
        form_request("/login", &[("email", "ana@example.com"), ("callbackUrl", "/dashboard")]),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.set_cookie().is_none());
    let page = response.text();
    assert!(page.contains("email and password are required"));
    assert!(page.contains(r#"value="ana@example.com""#));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(&app, form_request("/logout", &[])).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/");
    assert!(response.set_cookie().unwrap().contains("Max-Age=0"));

    let response = send(&app, json_request("POST", "/api/auth/logout", None, json!({}))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .set_cookie()
        .unwrap()
        .starts_with("pagepilot_session=;"));
}

#[tokio::test]
async fn test_security_headers_on_pages() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(&app, get("/", None)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert!(response.headers.get("content-security-policy").is_some());
    assert!(response.headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let graph = silent_server().await;
    let app = offline_app(&graph.uri(), None);

    let response = send(&app, get("/nowhere", None)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.text().contains("Not found"));
}
