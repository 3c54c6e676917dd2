use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;
use velvetline::{AppState, auth::JwtKeys, db};

async fn app() -> Router {
    // A single connection keeps the in-memory database alive for the whole
    // test.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    db::init_schema(&pool).await.expect("schema");

    velvetline::router(AppState {
        db_pool: pool,
        keys: JwtKeys::new(b"test-secret"),
    })
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Registers a user and returns `(token, user_id)`.
async fn register(app: &Router, name: &str, email: &str, age: i64, user_type: &str) -> (String, String) {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": "secret1",
            "phone": "600123456",
            "age": age,
            "user_type": user_type,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (
        body["data"]["token"].as_str().unwrap().to_owned(),
        body["data"]["user"]["id"].as_str().unwrap().to_owned(),
    )
}

async fn first_profile_id(app: &Router) -> String {
    let (status, body) = request(app, "GET", "/api/profiles", None, None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["profiles"][0]["id"].as_str().unwrap().to_owned()
}

fn booking_body(model_id: &str, profile_id: &str, date: &str) -> Value {
    json!({
        "model_id": model_id,
        "profile_id": profile_id,
        "date": date,
        "time": "18:00",
        "duration": 2,
        "service_type": "incall",
        "services": ["Dinners"],
        "customer_phone": "600123456",
        "pricing": { "hourly_rate": 150, "total_amount": 300 },
    })
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = app().await;

    let (status, body) = request(&app, "GET", "/api", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = request(&app, "GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn register_login_me_flow() {
    let app = app().await;
    let (token, _) = register(&app, "Carlos", "carlos@example.com", 30, "customer").await;

    let (status, body) = request(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "carlos@example.com");
    assert!(body["data"]["user"].get("password_hash").is_none());

    // Same email again.
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Carlos II",
            "email": "carlos@example.com",
            "password": "secret1",
            "phone": "600123456",
            "age": 30,
            "user_type": "customer",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "carlos@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "carlos@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().is_some());
    assert!(body["data"]["user"]["last_login"].is_string());
}

#[tokio::test]
async fn auth_gating() {
    let app = app().await;

    let (status, _) = request(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/api/auth/me", Some("garbage.token.here"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn register_rejects_bad_payload() {
    let app = app().await;
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "X",
            "email": "not-an-email",
            "password": "short",
            "phone": "123",
            "age": 17,
            "user_type": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn model_registration_seeds_profile() {
    let app = app().await;
    register(&app, "Ana", "ana@example.com", 25, "model").await;

    let (status, body) = request(&app, "GET", "/api/profiles", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let profiles = body["data"]["profiles"].as_array().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["name"], "Ana");
    assert_eq!(profiles[0]["incall"], "€150/h");
    assert_eq!(body["data"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn profile_filtering_and_search() {
    let app = app().await;
    register(&app, "Ana", "ana@example.com", 25, "model").await;
    register(&app, "Beatriz", "bea@example.com", 47, "model").await;

    let (_, body) = request(&app, "GET", "/api/profiles?search=Beatriz", None, None).await;
    let profiles = body["data"]["profiles"].as_array().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["name"], "Beatriz");

    let (_, body) = request(&app, "GET", "/api/profiles?min_age=30", None, None).await;
    assert_eq!(body["data"]["profiles"].as_array().unwrap().len(), 1);

    let (_, body) = request(&app, "GET", "/api/profiles?location=all", None, None).await;
    assert_eq!(body["data"]["profiles"].as_array().unwrap().len(), 2);

    let (status, _) = request(&app, "GET", "/api/profiles?sort_by=bogus", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(&app, "GET", "/api/profiles?min_age=17", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_detail_counts_views() {
    let app = app().await;
    register(&app, "Ana", "ana@example.com", 25, "model").await;
    let profile_id = first_profile_id(&app).await;

    let (status, body) = request(&app, "GET", &format!("/api/profiles/{profile_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profile"]["views"], 1);
    assert!(body["data"]["profile"]["availability"].is_object());

    let (_, body) = request(&app, "GET", &format!("/api/profiles/{profile_id}"), None, None).await;
    assert_eq!(body["data"]["profile"]["views"], 2);

    let missing = uuid::Uuid::now_v7();
    let (status, _) = request(&app, "GET", &format!("/api/profiles/{missing}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_update_rules() {
    let app = app().await;
    let (model_token, _) = register(&app, "Ana", "ana@example.com", 25, "model").await;
    let (customer_token, _) = register(&app, "Carlos", "carlos@example.com", 30, "customer").await;
    let profile_id = first_profile_id(&app).await;
    let uri = format!("/api/profiles/{profile_id}");

    let (status, _) = request(
        &app,
        "PUT",
        &uri,
        Some(&customer_token),
        Some(json!({ "location": "Barcelona" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "PUT",
        &uri,
        Some(&model_token),
        Some(json!({ "rates": { "incall": "150 euros" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        "PUT",
        &uri,
        Some(&model_token),
        Some(json!({
            "location": "Barcelona",
            "services": ["Dinners", "Travel companion"],
            "rates": { "incall": "€180/h" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["profile"]["location"], "Barcelona");
    assert_eq!(body["data"]["profile"]["incall"], "€180/h");
    assert_eq!(body["data"]["profile"]["services"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn online_status_toggle() {
    let app = app().await;
    let (model_token, _) = register(&app, "Ana", "ana@example.com", 25, "model").await;
    let profile_id = first_profile_id(&app).await;

    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/profiles/{profile_id}/online-status"),
        Some(&model_token),
        Some(json!({ "is_online": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&app, "GET", "/api/profiles", None, None).await;
    assert_eq!(body["data"]["profiles"][0]["online"], true);
}

#[tokio::test]
async fn booking_lifecycle() {
    let app = app().await;
    let (model_token, model_id) = register(&app, "Ana", "ana@example.com", 25, "model").await;
    let (customer_token, _) = register(&app, "Carlos", "carlos@example.com", 30, "customer").await;
    let profile_id = first_profile_id(&app).await;

    // Models cannot book themselves.
    let (status, _) = request(
        &app,
        "POST",
        "/api/bookings",
        Some(&model_token),
        Some(booking_body(&model_id, &profile_id, "2030-05-01")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &app,
        "POST",
        "/api/bookings",
        Some(&customer_token),
        Some(booking_body(&model_id, &profile_id, "2030-05-01")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let booking = &body["data"]["booking"];
    assert_eq!(booking["status"], "pending");
    assert!(booking["confirmation_code"].as_str().unwrap().starts_with("VV"));
    let booking_id = booking["id"].as_str().unwrap().to_owned();

    // Same model, same date.
    let (status, _) = request(
        &app,
        "POST",
        "/api/bookings",
        Some(&customer_token),
        Some(booking_body(&model_id, &profile_id, "2030-05-01")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Only the model can confirm.
    let status_uri = format!("/api/bookings/{booking_id}/status");
    let (status, _) = request(
        &app,
        "PATCH",
        &status_uri,
        Some(&customer_token),
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &app,
        "PATCH",
        &status_uri,
        Some(&model_token),
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["booking"]["status"], "confirmed");

    // Confirming twice is not a legal transition.
    let (status, _) = request(
        &app,
        "PATCH",
        &status_uri,
        Some(&model_token),
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = request(
        &app,
        "PATCH",
        &status_uri,
        Some(&model_token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["booking"]["completed_at"].is_string());

    // Completed is terminal.
    let (status, _) = request(
        &app,
        "PATCH",
        &status_uri,
        Some(&model_token),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = request(&app, "GET", "/api/bookings/stats/overview", Some(&model_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stats"]["completed"], 1);
    assert_eq!(body["data"]["stats"]["total"], 1);
}

#[tokio::test]
async fn booking_cancellation_and_visibility() {
    let app = app().await;
    let (_, model_id) = register(&app, "Ana", "ana@example.com", 25, "model").await;
    let (customer_token, _) = register(&app, "Carlos", "carlos@example.com", 30, "customer").await;
    let (stranger_token, _) = register(&app, "Diego", "diego@example.com", 40, "customer").await;
    let profile_id = first_profile_id(&app).await;

    let (_, body) = request(
        &app,
        "POST",
        "/api/bookings",
        Some(&customer_token),
        Some(booking_body(&model_id, &profile_id, "2030-06-02")),
    )
    .await;
    let booking_id = body["data"]["booking"]["id"].as_str().unwrap().to_owned();

    // Only the two parties can see it.
    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/bookings/{booking_id}"),
        Some(&stranger_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/bookings/{booking_id}/status"),
        Some(&customer_token),
        Some(json!({ "status": "cancelled", "notes": "change of plans" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let booking = &body["data"]["booking"];
    assert_eq!(booking["status"], "cancelled");
    assert_eq!(booking["cancellation_reason"], "change of plans");
    assert_eq!(booking["customer_notes"], "change of plans");

    // A cancelled date is free again.
    let (status, _) = request(
        &app,
        "POST",
        "/api/bookings",
        Some(&customer_token),
        Some(booking_body(&model_id, &profile_id, "2030-06-02")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = request(&app, "GET", "/api/bookings?status=cancelled", Some(&customer_token), None).await;
    assert_eq!(body["data"]["bookings"].as_array().unwrap().len(), 1);
    let (_, body) = request(&app, "GET", "/api/bookings", Some(&customer_token), None).await;
    assert_eq!(body["data"]["bookings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn booking_validation() {
    let app = app().await;
    let (_, model_id) = register(&app, "Ana", "ana@example.com", 25, "model").await;
    let (customer_token, _) = register(&app, "Carlos", "carlos@example.com", 30, "customer").await;
    let profile_id = first_profile_id(&app).await;

    let mut body = booking_body(&model_id, &profile_id, "2020-01-01");
    body["time"] = json!("25:99");
    body["duration"] = json!(0);
    body["services"] = json!([]);
    let (status, response) = request(&app, "POST", "/api/bookings", Some(&customer_token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["errors"].as_array().unwrap().len() >= 4);

    // Profile that does not belong to the model.
    let bogus = uuid::Uuid::now_v7().to_string();
    let (status, _) = request(
        &app,
        "POST",
        "/api/bookings",
        Some(&customer_token),
        Some(booking_body(&model_id, &bogus, "2030-07-01")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn messaging_flow() {
    let app = app().await;
    let (model_token, model_id) = register(&app, "Ana", "ana@example.com", 25, "model").await;
    let (customer_token, customer_id) = register(&app, "Carlos", "carlos@example.com", 30, "customer").await;
    let profile_id = first_profile_id(&app).await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/messages",
        Some(&customer_token),
        Some(json!({
            "receiver_id": model_id,
            "profile_id": profile_id,
            "content": "Hola, are you available next week?",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let message_id = body["data"]["message"]["id"].as_str().unwrap().to_owned();

    let (_, body) = request(&app, "GET", "/api/messages/unread-count", Some(&model_token), None).await;
    assert_eq!(body["data"]["unread_count"], 1);

    // Reading the thread marks it read.
    let conversation_uri = format!("/api/messages/conversation/{customer_id}/{profile_id}");
    let (status, body) = request(&app, "GET", &conversation_uri, Some(&model_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 1);

    let (_, body) = request(&app, "GET", "/api/messages/unread-count", Some(&model_token), None).await;
    assert_eq!(body["data"]["unread_count"], 0);

    let (status, body) = request(&app, "GET", "/api/messages/conversations", Some(&customer_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let conversations = body["data"]["conversations"].as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["other_user"]["name"], "Ana");
    assert_eq!(conversations[0]["unread_count"], 0);

    // Soft delete hides the message from both sides.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/messages/{message_id}"),
        Some(&customer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&app, "GET", &conversation_uri, Some(&model_token), None).await;
    assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 0);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/messages/{message_id}"),
        Some(&customer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn message_validation() {
    let app = app().await;
    let (customer_token, _) = register(&app, "Carlos", "carlos@example.com", 30, "customer").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/messages",
        Some(&customer_token),
        Some(json!({ "receiver_id": "nope", "profile_id": "nope", "content": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);

    // Message about a profile that does not exist.
    let ghost = uuid::Uuid::now_v7();
    let (status, _) = request(
        &app,
        "POST",
        "/api/messages",
        Some(&customer_token),
        Some(json!({
            "receiver_id": ghost.to_string(),
            "profile_id": ghost.to_string(),
            "content": "hello?",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_checks() {
    let app = app().await;

    let (status, _) = request(&app, "POST", "/api/status", None, Some(json!({ "client_name": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        "POST",
        "/api/status",
        None,
        Some(json!({ "client_name": "monitor-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["client_name"], "monitor-1");

    let (status, body) = request(&app, "GET", "/api/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
