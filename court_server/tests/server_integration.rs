//! Integration tests for the HTTP API.
//!
//! Drives the full router with `oneshot` requests against a fresh in-process
//! store per test.

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use court_booking::{auth::AuthManager, db::Database, wallet::TopUpLimits};
use court_server::api::{AppState, create_router, request_id::REQUEST_ID_HEADER};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For `oneshot` method

struct TestServer {
    app: Router,
    state: AppState,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

/// Helper to create a test server on an empty store
fn create_test_server() -> TestServer {
    let db = Database::new();
    let auth_manager = AuthManager::new(
        db.clone(),
        "test_pepper_for_testing_only".to_string(),
        "test_secret_key_for_testing_only_32c".to_string(),
    );
    let state = AppState::new(db, auth_manager, TopUpLimits::default());

    TestServer {
        app: create_router(state.clone()),
        state,
    }
}

impl TestServer {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    /// Helper to register a user and return their access token
    async fn register(&self, username: &str) -> String {
        let response = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({ "username": username, "password": "TestPass123" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["access_token"].as_str().unwrap().to_string()
    }

    /// Helper to bootstrap an admin and return their access token
    async fn admin(&self) -> String {
        self.state
            .auth_manager
            .create_admin("court_admin", "AdminPass123")
            .await
            .unwrap();
        let response = self
            .post(
                "/api/v1/auth/login",
                None,
                json!({ "username": "court_admin", "password": "AdminPass123" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["access_token"].as_str().unwrap().to_string()
    }

    async fn add_court(&self, admin: &str, price_cents: i64, duration_hours: i32) -> i64 {
        let response = self
            .post(
                "/api/v1/courts",
                Some(admin),
                json!({
                    "name": "Center Court",
                    "address": "1 Baseline Road",
                    "price_cents": price_cents,
                    "capacity": 4,
                    "duration_hours": duration_hours
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"].as_i64().unwrap()
    }

    async fn top_up(&self, token: &str, amount_cents: i64) -> TestResponse {
        self.post(
            "/api/v1/wallet/top-up",
            Some(token),
            json!({ "amount_cents": amount_cents, "payment": { "method": "bank_transfer" } }),
        )
        .await
    }

    async fn book(&self, token: &str, court_id: i64, slot: &str) -> TestResponse {
        self.post(
            "/api/v1/bookings",
            Some(token),
            json!({ "court_id": court_id, "slot": slot }),
        )
        .await
    }
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let server = create_test_server();

    let response = server.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["tables"]["courts"], 0);
    assert!(response.headers.contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .header(REQUEST_ID_HEADER, "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "trace-me-123");
}

#[tokio::test]
async fn test_404_for_invalid_endpoint() {
    let server = create_test_server();

    let response = server.get("/api/v1/nonexistent", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Authentication Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_register_and_duplicate_username() {
    let server = create_test_server();

    let token = server.register("new_player").await;
    assert!(!token.is_empty());

    let response = server
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "new_player", "password": "TestPass123" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "Username already exists");
}

#[tokio::test]
async fn test_invalid_login_returns_401() {
    let server = create_test_server();
    server.register("login_player").await;

    let response = server
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "login_player", "password": "WrongPassword" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = create_test_server();

    assert_eq!(
        server.get("/api/v1/wallet", None).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        server.get("/api/v1/wallet", Some("not-a-jwt")).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_malformed_json_request() {
    let server = create_test_server();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_profile_round_trip() {
    let server = create_test_server();
    let token = server.register("profile_player").await;

    let response = server
        .send(
            Method::PUT,
            "/api/v1/me",
            Some(&token),
            Some(json!({ "phone": "+84 90 123 4567", "gender": "female" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);

    let me = server.get("/api/v1/me", Some(&token)).await;
    assert_eq!(me.body["username"], "profile_player");
    assert_eq!(me.body["phone"], "+84 90 123 4567");
}

#[tokio::test]
async fn test_password_reset_flow() {
    let server = create_test_server();
    let admin = server.admin().await;
    server.register("forgetful").await;

    let filed = server
        .post(
            "/api/v1/auth/password-reset",
            None,
            json!({ "username": "forgetful" }),
        )
        .await;
    assert_eq!(filed.status, StatusCode::ACCEPTED);
    let reset_id = filed.body["id"].as_i64().unwrap();

    let confirm = json!({ "username": "forgetful", "new_password": "BrandNew123" });
    let early = server
        .post("/api/v1/auth/password-reset/confirm", None, confirm.clone())
        .await;
    assert_eq!(early.status, StatusCode::BAD_REQUEST);

    let approved = server
        .post(
            &format!("/api/v1/admin/password-resets/{reset_id}/approve"),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);

    let done = server
        .post("/api/v1/auth/password-reset/confirm", None, confirm)
        .await;
    assert_eq!(done.status, StatusCode::NO_CONTENT);

    let login = server
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "forgetful", "password": "BrandNew123" }),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
}

// ============================================================================
// Court Management Tests
// ============================================================================

#[tokio::test]
async fn test_regular_user_cannot_manage_courts() {
    let server = create_test_server();
    let token = server.register("sneaky_player").await;

    let response = server
        .post(
            "/api/v1/courts",
            Some(&token),
            json!({ "name": "Mine", "price_cents": 0, "capacity": 2, "duration_hours": 2 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = server.get("/api/v1/admin/analytics", Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_court_slots_and_search_are_public() {
    let server = create_test_server();
    let admin = server.admin().await;
    let court_id = server.add_court(&admin, 10_000, 5).await;

    let court = server.get(&format!("/api/v1/courts/{court_id}"), None).await;
    assert_eq!(
        court.body["play_times"],
        json!(["8 hours -13 hours", "13 hours - 18 hours"])
    );

    let slots = server
        .get(&format!("/api/v1/courts/{court_id}/slots"), None)
        .await;
    assert_eq!(slots.body["available"].as_array().unwrap().len(), 2);

    let found = server.get("/api/v1/courts?text=baseline", None).await;
    assert_eq!(found.body.as_array().unwrap().len(), 1);
    let none = server.get("/api/v1/courts?max_price_cents=5000", None).await;
    assert!(none.body.as_array().unwrap().is_empty());

    let missing = server.get("/api/v1/courts/999", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "Court not found");
}

#[tokio::test]
async fn test_invalid_court_rejected() {
    let server = create_test_server();
    let admin = server.admin().await;

    let response = server
        .post(
            "/api/v1/courts",
            Some(&admin),
            json!({ "name": "Too long", "price_cents": 100, "capacity": 4, "duration_hours": 15 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Booking Flow Tests
// ============================================================================

#[tokio::test]
async fn test_end_to_end_booking_flow() {
    let server = create_test_server();
    let admin = server.admin().await;
    let court_id = server.add_court(&admin, 10_000, 5).await;
    let player = server.register("flow_player").await;
    let rival = server.register("rival_player").await;

    let topped = server.top_up(&player, 15_000).await;
    assert_eq!(topped.status, StatusCode::OK, "{}", topped.body);
    assert_eq!(topped.body["balance"], 15_000);

    let booked = server.book(&player, court_id, "8 hours -13 hours").await;
    assert_eq!(booked.status, StatusCode::CREATED, "{}", booked.body);
    assert_eq!(booked.body["wallet_balance"], 5_000);
    assert_eq!(booked.body["system_balance"], 10_000);
    assert_eq!(booked.body["invoice"]["status"], "Paid");
    let booking_id = booked.body["booking"]["id"].as_i64().unwrap();

    server.top_up(&rival, 20_000).await;
    let clash = server.book(&rival, court_id, "8 hours -13 hours").await;
    assert_eq!(clash.status, StatusCode::CONFLICT);

    let slots = server
        .get(&format!("/api/v1/courts/{court_id}/slots"), None)
        .await;
    assert_eq!(slots.body["available"], json!(["13 hours - 18 hours"]));

    // Only the owner or an admin may cancel
    let stolen = server
        .send(
            Method::DELETE,
            &format!("/api/v1/bookings/{booking_id}"),
            Some(&rival),
            None,
        )
        .await;
    assert_eq!(stolen.status, StatusCode::FORBIDDEN);

    let cancelled = server
        .send(
            Method::DELETE,
            &format!("/api/v1/bookings/{booking_id}"),
            Some(&player),
            None,
        )
        .await;
    assert_eq!(cancelled.status, StatusCode::OK, "{}", cancelled.body);
    assert_eq!(cancelled.body["wallet_balance"], 15_000);
    assert_eq!(cancelled.body["system_balance"], 0);
    assert_eq!(cancelled.body["invoice"]["status"], "Cancelled");

    let history = server.get("/api/v1/wallet/transactions", Some(&player)).await;
    let kinds: Vec<&str> = history
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["Refund", "Payment", "Deposit"]);

    let revenue = server.get("/api/v1/admin/revenue", Some(&admin)).await;
    assert_eq!(revenue.body["system_balance"], 0);
    assert_eq!(revenue.body["history"].as_array().unwrap().len(), 2);

    let rebooked = server.book(&rival, court_id, "8 hours -13 hours").await;
    assert_eq!(rebooked.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_insufficient_funds_returns_402() {
    let server = create_test_server();
    let admin = server.admin().await;
    let court_id = server.add_court(&admin, 10_000, 5).await;
    let player = server.register("short_player").await;
    server.top_up(&player, 5_000).await;

    let response = server.book(&player, court_id, "13 hours - 18 hours").await;
    assert_eq!(response.status, StatusCode::PAYMENT_REQUIRED);

    let wallet = server.get("/api/v1/wallet", Some(&player)).await;
    assert_eq!(wallet.body["balance"], 5_000);
    let mine = server.get("/api/v1/bookings", Some(&player)).await;
    assert!(mine.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_top_up_limits_enforced() {
    let server = create_test_server();
    let player = server.register("limit_player").await;

    assert_eq!(
        server.top_up(&player, 999).await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        server.top_up(&player, 1_000_001).await.status,
        StatusCode::BAD_REQUEST
    );

    let balance_method = server
        .post(
            "/api/v1/wallet/top-up",
            Some(&player),
            json!({ "amount_cents": 5_000, "payment": { "method": "balance" } }),
        )
        .await;
    assert_eq!(balance_method.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reschedule_to_taken_slot_conflicts() {
    let server = create_test_server();
    let admin = server.admin().await;
    let court_id = server.add_court(&admin, 0, 2).await;
    let first = server.register("first_player").await;
    let second = server.register("second_player").await;

    let a = server.book(&first, court_id, "8 hours -10 hours").await;
    assert_eq!(a.status, StatusCode::CREATED, "{}", a.body);
    assert_eq!(a.body["invoice"]["payment_method"], "free");
    let b = server.book(&second, court_id, "10 hours - 12 hours").await;
    let b_id = b.body["booking"]["id"].as_i64().unwrap();

    let clash = server
        .send(
            Method::PUT,
            &format!("/api/v1/bookings/{b_id}/slot"),
            Some(&second),
            Some(json!({ "slot": "8 hours -10 hours" })),
        )
        .await;
    assert_eq!(clash.status, StatusCode::CONFLICT);

    let moved = server
        .send(
            Method::PUT,
            &format!("/api/v1/bookings/{b_id}/slot"),
            Some(&second),
            Some(json!({ "slot": "12 hours - 14 hours" })),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK, "{}", moved.body);
    assert_eq!(moved.body["slot"], "12 hours - 14 hours");
}

// ============================================================================
// Feedback Tests
// ============================================================================

#[tokio::test]
async fn test_accepted_report_blocks_booking() {
    let server = create_test_server();
    let admin = server.admin().await;
    let court_id = server.add_court(&admin, 0, 7).await;
    let player = server.register("report_player").await;

    let filed = server
        .post(
            &format!("/api/v1/courts/{court_id}/reports"),
            Some(&player),
            json!({ "condition": "needs_repair", "balls": 2, "court_quality": "Net sagging" }),
        )
        .await;
    assert_eq!(filed.status, StatusCode::CREATED, "{}", filed.body);
    let report_id = filed.body["id"].as_i64().unwrap();

    let accepted = server
        .post(
            &format!("/api/v1/admin/reports/{report_id}/accept"),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.body["court"]["status"], "Repairing");

    let blocked = server.book(&player, court_id, "8 hours -15 hours").await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);

    let resolved = server
        .post(
            &format!("/api/v1/admin/reports/{report_id}/resolve"),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(resolved.body["status"], "Available");
    let booked = server.book(&player, court_id, "8 hours -15 hours").await;
    assert_eq!(booked.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_review_requires_booking() {
    let server = create_test_server();
    let admin = server.admin().await;
    let court_id = server.add_court(&admin, 0, 7).await;
    let player = server.register("review_player").await;
    let reviews_uri = format!("/api/v1/courts/{court_id}/reviews");

    let denied = server
        .post(&reviews_uri, Some(&player), json!({ "rating": 5 }))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    server.book(&player, court_id, "15 hours - 22 hours").await;
    let created = server
        .post(
            &reviews_uri,
            Some(&player),
            json!({ "rating": 4, "comment": "Fast surface" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);

    let again = server
        .post(&reviews_uri, Some(&player), json!({ "rating": 3 }))
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let listed = server.get(&reviews_uri, None).await;
    assert_eq!(listed.body["rating"]["count"], 1);
    assert_eq!(listed.body["rating"]["average"], 4.0);
}

// ============================================================================
// Admin Tests
// ============================================================================

#[tokio::test]
async fn test_deactivated_user_loses_access() {
    let server = create_test_server();
    let admin = server.admin().await;
    let token = server.register("doomed_player").await;

    let users = server.get("/api/v1/admin/users", Some(&admin)).await;
    let user_id = users
        .body
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "doomed_player")
        .and_then(|u| u["id"].as_str())
        .unwrap()
        .to_string();

    let response = server
        .send(
            Method::DELETE,
            &format!("/api/v1/admin/users/{user_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_active"], false);

    assert_eq!(
        server.get("/api/v1/wallet", Some(&token)).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_close_own_account() {
    let server = create_test_server();
    let token = server.register("quitter").await;

    let refused = server
        .send(
            Method::DELETE,
            "/api/v1/me",
            Some(&token),
            Some(json!({ "password": "NotTheRightOne1" })),
        )
        .await;
    assert_eq!(refused.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        server.get("/api/v1/me", Some(&token)).await.status,
        StatusCode::OK
    );

    let closed = server
        .send(
            Method::DELETE,
            "/api/v1/me",
            Some(&token),
            Some(json!({ "password": "TestPass123" })),
        )
        .await;
    assert_eq!(closed.status, StatusCode::NO_CONTENT);

    let login = server
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "quitter", "password": "TestPass123" }),
        )
        .await;
    assert_eq!(login.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_analytics_summary() {
    let server = create_test_server();
    let admin = server.admin().await;
    let court_id = server.add_court(&admin, 2_500, 2).await;
    let player = server.register("stats_player").await;
    server.top_up(&player, 10_000).await;
    server.book(&player, court_id, "8 hours -10 hours").await;

    let summary = server.get("/api/v1/admin/analytics", Some(&admin)).await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["total_users"], 2);
    assert_eq!(summary.body["active_bookings"], 1);
    assert_eq!(summary.body["system_balance"], 2_500);
    assert_eq!(summary.body["net_revenue"], 2_500);
    assert_eq!(summary.body["days"], 30);
    assert_eq!(summary.body["daily_registrations"].as_array().unwrap().len(), 30);

    let week = server
        .get("/api/v1/admin/analytics?days=7", Some(&admin))
        .await;
    assert_eq!(week.status, StatusCode::OK);
    let registrations = week.body["daily_registrations"].as_array().unwrap();
    let bookings = week.body["daily_bookings"].as_array().unwrap();
    assert_eq!(registrations.len(), 7);
    assert_eq!(bookings.len(), 7);
    let today = chrono::Utc::now().date_naive().to_string();
    assert_eq!(registrations[6]["date"], today.as_str());
    assert_eq!(registrations[6]["count"], 2);
    assert_eq!(bookings[6]["count"], 1);
    assert!(bookings[..6].iter().all(|day| day["count"] == 0));

    let all = server.get("/api/v1/admin/bookings", Some(&admin)).await;
    assert_eq!(all.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_bookings_single_winner() {
    let server = create_test_server();
    let admin = server.admin().await;
    let court_id = server.add_court(&admin, 1_000, 14).await;

    let mut tokens = Vec::new();
    for i in 0..8 {
        let token = server.register(&format!("racer_{i}")).await;
        server.top_up(&token, 5_000).await;
        tokens.push(token);
    }

    let mut handles = Vec::new();
    for token in tokens {
        let app = server.app.clone();
        handles.push(tokio::spawn(async move {
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/v1/bookings")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "court_id": court_id, "slot": "8 hours -22 hours" }).to_string(),
                ))
                .unwrap();
            app.oneshot(request).await.unwrap().status()
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            status => assert_eq!(status, StatusCode::CONFLICT),
        }
    }
    assert_eq!(created, 1);

    let revenue = server.get("/api/v1/admin/revenue", Some(&admin)).await;
    assert_eq!(revenue.body["system_balance"], 1_000);
}
