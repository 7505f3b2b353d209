//! End-to-end API tests driving the router through tower's `oneshot`.
//!
//! Every test runs against an in-memory database, a mock analysis provider
//! and an OCR client pointed at an unreachable port (so OCR degrades to the
//! placeholder text, which is what the mock ignores anyway).

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use ecoscan_config::{EcoscanConfig, StorageConfig};
use ecoscan_core::{ProductAnalysis, Verdict};
use ecoscan_llm::mock::MockCall;
use ecoscan_llm::MockProvider;
use ecoscan_web::server::init_state;
use ecoscan_web::{app, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn test_config(upload_dir: &TempDir) -> EcoscanConfig {
    let mut config = EcoscanConfig::default();
    config.storage = StorageConfig::memory();
    config.web.upload_dir = upload_dir.path().to_path_buf();
    config.ocr.service_url = "http://127.0.0.1:9/ocr".to_string();
    config.ocr.timeout_secs = 1;
    // keep password hashing fast in tests
    config.auth.pbkdf2_iterations = 1_000;
    config
}

fn sample_analysis() -> ProductAnalysis {
    ProductAnalysis {
        product_name: "Oat Bar".into(),
        health_score: 82,
        eco_score: 64,
        eco_score_reasoning: "Recyclable wrapper".into(),
        verdict: Verdict::Safe,
        nutritional_benefits: vec!["High fiber".into()],
        ..ProductAnalysis::default()
    }
}

fn test_app(upload_dir: &TempDir, provider: MockProvider) -> (Router, AppState) {
    let state = init_state(test_config(upload_dir), Arc::new(provider)).unwrap();
    (app(state.clone()), state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Cookie pair from the Set-Cookie header, suitable for a Cookie header
fn session_of(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn post_json(app: &Router, path: &str, body: Value, cookie: Option<&str>) -> axum::response::Response {
    let mut request = Request::post(path).header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn get(app: &Router, path: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut request = Request::get(path);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn signup(app: &Router, username: &str, email: &str) -> String {
    let response = post_json(
        app,
        "/api/signup",
        json!({ "username": username, "email": email, "password": "secret123" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_of(&response)
}

/// Multipart body with a single `product_image` field
fn multipart_body(filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"product_image\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn post_scan(app: &Router, cookie: &str, filename: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::post("/api/scan")
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .header(COOKIE, cookie)
                .body(Body::from(multipart_body(filename, b"fake image bytes")))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Poll the task endpoint until it leaves the queue, up to ~5 seconds
async fn poll_task(app: &Router, cookie: &str, task_id: &str) -> Value {
    for _ in 0..50 {
        let response = get(app, &format!("/api/tasks/{}", task_id), Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        if body["status"] == "completed" || body["status"] == "failed" {
            return body;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("task {} never finished", task_id);
}

#[tokio::test]
async fn health_is_public() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));

    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn signup_rejects_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));

    let cases = [
        (
            json!({ "username": "ab", "email": "a@example.com", "password": "secret123" }),
            "Username must be between 3 and 150 characters",
        ),
        (
            json!({ "username": "alice", "email": "not-an-email", "password": "secret123" }),
            "Invalid email address",
        ),
        (
            json!({ "username": "alice", "email": "a@example.com", "password": "short" }),
            "Password must be at least 6 characters",
        ),
    ];
    for (payload, message) in cases {
        let response = post_json(&app, "/api/signup", payload, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], message);
    }
}

#[tokio::test]
async fn signup_rejects_duplicates_with_distinct_messages() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));
    signup(&app, "alice", "alice@example.com").await;

    let response = post_json(
        &app,
        "/api/signup",
        json!({ "username": "alice", "email": "other@example.com", "password": "secret123" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Username already exists");

    let response = post_json(
        &app,
        "/api/signup",
        json!({ "username": "bob", "email": "alice@example.com", "password": "secret123" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Email already exists");
}

#[tokio::test]
async fn login_checks_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));
    signup(&app, "alice", "alice@example.com").await;

    let response = post_json(
        &app,
        "/api/login",
        json!({ "username": "alice", "password": "secret123" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_some());

    let response = post_json(
        &app,
        "/api/login",
        json!({ "username": "alice", "password": "wrong-password" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        &app,
        "/api/login",
        json!({ "username": "nobody", "password": "secret123" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid credentials");
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));

    for path in ["/api/profile", "/api/history"] {
        let response = get(&app, path, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);

        let response = get(&app, path, Some("ecoscan_session=bogus-token")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);
    }
}

#[tokio::test]
async fn expired_sessions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&dir, MockProvider::new(sample_analysis()));

    let user = state
        .stores
        .users
        .create("alice", "alice@example.com", "hash")
        .unwrap();
    state
        .stores
        .sessions
        .create("stale-token", user.id, Utc::now() - Duration::seconds(10))
        .unwrap();

    let response = get(&app, "/api/profile", Some("ecoscan_session=stale-token")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));
    let cookie = signup(&app, "alice", "alice@example.com").await;

    let response = get(&app, "/api/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(&app, "/api/logout", json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));
    let cookie = signup(&app, "alice", "alice@example.com").await;

    let body = body_json(get(&app, "/api/profile", Some(&cookie)).await).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["dietType"], "general");
    assert_eq!(body["allergies"], "");

    let response = post_json(
        &app,
        "/api/profile",
        json!({
            "healthConditions": "Diabetes",
            "allergies": "Peanuts",
            "dietType": "vegan",
            "ingredientsToAvoid": "palm oil",
        }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(get(&app, "/api/profile", Some(&cookie)).await).await;
    assert_eq!(body["healthConditions"], "Diabetes");
    assert_eq!(body["allergies"], "Peanuts");
    assert_eq!(body["dietType"], "vegan");
    assert_eq!(body["ingredientsToAvoid"], "palm oil");
}

#[tokio::test]
async fn scan_without_an_image_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));
    let cookie = signup(&app, "alice", "alice@example.com").await;

    // multipart body with an unrelated field only
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n");
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/scan")
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .header(COOKIE, &cookie)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "No image provided");

    let response = post_scan(&app, &cookie, "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "No image selected");
}

#[tokio::test(flavor = "multi_thread")]
async fn scan_completes_and_lands_in_history() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));
    let cookie = signup(&app, "alice", "alice@example.com").await;

    let response = post_scan(&app, &cookie, "label.jpg").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let task_id = body["task_id"].as_str().unwrap().to_string();

    let task = poll_task(&app, &cookie, &task_id).await;
    assert_eq!(task["status"], "completed");
    let result = &task["result"];
    assert_eq!(result["healthScore"], 82);
    assert_eq!(result["ecoScore"], 64);
    assert_eq!(result["structureData"]["product_name"], "Oat Bar");
    assert!(result["context"]
        .as_str()
        .unwrap()
        .starts_with("Product: Oat Bar."));
    let image = result["productImage"].as_str().unwrap();
    assert!(image.starts_with("/uploads/"));
    assert!(image.ends_with("label.jpg"));

    // the saved upload exists under the configured directory
    let saved = image.strip_prefix("/uploads/").unwrap();
    assert!(dir.path().join(saved).exists());

    let body = body_json(get(&app, "/api/history", Some(&cookie)).await).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productName"], "Oat Bar");
    assert_eq!(items[0]["healthScore"], 82);
    assert_eq!(items[0]["image"], format!("/uploads/{}", saved));
}

#[tokio::test(flavor = "multi_thread")]
async fn tasks_are_scoped_to_their_owner() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));
    let alice = signup(&app, "alice", "alice@example.com").await;
    let bob = signup(&app, "bob", "bob@example.com").await;

    let response = post_scan(&app, &alice, "label.jpg").await;
    let task_id = body_json(response).await["task_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = get(&app, &format!("/api/tasks/{}", task_id), Some(&bob)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Task not found");

    poll_task(&app, &alice, &task_id).await;
    let body = body_json(get(&app, "/api/history", Some(&bob)).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn clearing_history_only_touches_the_caller() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));
    let alice = signup(&app, "alice", "alice@example.com").await;
    let bob = signup(&app, "bob", "bob@example.com").await;

    for cookie in [&alice, &bob] {
        let response = post_scan(&app, cookie, "label.jpg").await;
        let task_id = body_json(response).await["task_id"]
            .as_str()
            .unwrap()
            .to_string();
        poll_task(&app, cookie, &task_id).await;
    }

    let response = post_json(&app, "/api/history/clear", json!({}), Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "History cleared successfully"
    );

    let body = body_json(get(&app, "/api/history", Some(&alice)).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    let body = body_json(get(&app, "/api/history", Some(&bob)).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir, MockProvider::new(sample_analysis()));
    let cookie = signup(&app, "alice", "alice@example.com").await;

    let response = get(&app, "/api/tasks/no-such-task", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chat_forwards_query_and_context() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockProvider::new(sample_analysis()).with_chat_reply("It is a healthy snack.");
    let (app, _) = test_app(&dir, provider.clone());
    let cookie = signup(&app, "alice", "alice@example.com").await;

    let response = post_json(
        &app,
        "/api/chat",
        json!({ "query": "Is this healthy?", "context": "Product: Oat Bar." }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["response"], "It is a healthy snack.");

    assert_eq!(
        provider.calls(),
        vec![MockCall::Chat {
            query: "Is this healthy?".into(),
            context: "Product: Oat Bar.".into(),
        }]
    );

    let response = post_json(&app, "/api/chat", json!({}), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
