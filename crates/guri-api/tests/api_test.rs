//! Router-level tests against the in-memory store seeded with the demo
//! fixtures.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;

use guri_api::{auth, build_router, config::Config, state::AppState};
use guri_persist::{fixtures, MemoryPersistenceClient, UserRepository};

const ADMIN_PASSWORD: &str = "admin-password";
const AGENT_PASSWORD: &str = "agent-password";
const BOUNDARY: &str = "guri-test-boundary";

fn test_config() -> Config {
    let uploads = std::env::temp_dir().join(format!("guri-api-test-{}", uuid::Uuid::new_v4().simple()));
    let raw = format!(
        r#"
        jwt_secret = "an-integration-test-secret-of-32-chars"

        [server]
        host = "127.0.0.1"
        port = 0

        [cors]
        enabled = true
        origins = ["*"]

        [database]
        in_memory = true
        max_connections = 1
        acquire_timeout_ms = 1000

        [auth]
        token_ttl_hours = 1
        reset_token_ttl_minutes = 60
        expose_reset_token = true

        [uploads]
        dir = "{}"
        max_file_bytes = 1024
        max_files = 3

        [stories]
        ttl_hours = 24

        [logging]
        level = "warn"
        format = "pretty"
        "#,
        uploads.display().to_string().replace('\\', "/")
    );
    toml::from_str(&raw).unwrap()
}

struct TestApp {
    router: Router,
    store: Arc<MemoryPersistenceClient>,
    uploads: PathBuf,
}

async fn test_app() -> TestApp {
    let store = Arc::new(MemoryPersistenceClient::new());
    let accounts = auth::seed_accounts(ADMIN_PASSWORD, AGENT_PASSWORD).unwrap();
    store.seed(&fixtures::demo(), &accounts).await.unwrap();

    let config = test_config();
    let uploads = PathBuf::from(&config.uploads.dir);
    let state = Arc::new(AppState::new(config, store.clone()));
    TestApp {
        router: build_router(state),
        store,
        uploads,
    }
}

async fn app() -> Router {
    test_app().await.router
}

/// Files currently in the uploads directory; a directory never created counts as empty
fn stored_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    request(Method::GET, uri, None, None)
}

/// `(name, Some((file_name, content_type)), bytes)` parts; `None` makes a text field
fn multipart(uri: &str, token: &str, parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file {
            Some((file_name, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    name, file_name, content_type
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn admin_token(app: &Router) -> String {
    login(app, "admin@guri.so", ADMIN_PASSWORD).await
}

/// Amina is agent 1
async fn agent_token(app: &Router) -> String {
    login(app, "amina@guri.so", AGENT_PASSWORD).await
}

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = app().await;
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["backend"], "memory");
}

#[tokio::test]
async fn test_property_filters() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/properties?purpose=Rent&location=mogadishu")).await;
    assert_eq!(status, StatusCode::OK);
    let mut found = ids(&body);
    found.sort();
    assert_eq!(found, vec![2, 3]);

    // purpose defaults to Sale
    let (_, body) = send(&app, get("/api/properties?min_beds=4")).await;
    assert_eq!(ids(&body), vec![1]);

    let (status, body) = send(&app, get("/api/properties?min_beds=lots")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_featured_properties() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/properties/featured?limit=10")).await;

    assert_eq!(status, StatusCode::OK);
    let mut found = ids(&body);
    found.sort();
    assert_eq!(found, vec![1, 3]);
}

#[tokio::test]
async fn test_property_by_slug_and_missing() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/properties/hodan-family-villa")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);

    let (status, body) = send(&app, get("/api/properties/no-such-place")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Property not found: no-such-place" })
    );
}

#[tokio::test]
async fn test_mutations_require_token() {
    let app = app().await;
    let (status, body) = send(
        &app,
        request(Method::POST, "/api/categories", None, Some(json!({ "name": "Farms" }))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing bearer token");
}

#[tokio::test]
async fn test_category_admin_only_and_unique_slug() {
    let app = app().await;
    let admin = admin_token(&app).await;
    let agent = agent_token(&app).await;

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/categories", Some(&agent), Some(json!({ "name": "Farms" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/categories", Some(&admin), Some(json!({ "name": "Farms" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "farms");

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/categories", Some(&admin), Some(json!({ "name": "Farms" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, get("/api/categories/farms")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Farms");
}

#[tokio::test]
async fn test_agent_publishes_under_own_profile() {
    let app = app().await;
    let agent = agent_token(&app).await;

    let draft = json!({
        "title": "Shangani Loft",
        "price": 900,
        "purpose": "Rent",
        "property_type": "apartment",
        "location": "Shangani",
        "city": "Mogadishu",
        "bedrooms": 1,
        "agent_id": 2
    });
    let (status, body) = send(&app, request(Method::POST, "/api/properties", Some(&agent), Some(draft))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["agent_id"], 1);
    assert_eq!(body["data"]["slug"], "shangani-loft");

    // Property 3 belongs to agent 2
    let (status, _) = send(&app, request(Method::DELETE, "/api/properties/3", Some(&agent), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request(Method::DELETE, "/api/properties/2", Some(&agent), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_contact_form_is_public_but_inbox_is_admin() {
    let app = app().await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/contacts",
            None,
            Some(json!({
                "name": "Hodan",
                "email": "hodan@example.com",
                "message": "Is the villa still available?",
                "property_id": 1
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "new");
    let contact_id = body["data"]["id"].as_i64().unwrap();

    let agent = agent_token(&app).await;
    let (status, _) = send(&app, request(Method::GET, "/api/contacts", Some(&agent), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = admin_token(&app).await;
    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/contacts/{}", contact_id),
            Some(&admin),
            Some(json!({ "status": "read" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "read");
}

#[tokio::test]
async fn test_story_upload_then_grouped_feed() {
    let app = app().await;
    let agent = agent_token(&app).await;

    let (status, body) = send(
        &app,
        multipart(
            "/api/stories",
            &agent,
            &[
                ("media", Some(("tour.png", "image/png")), b"not-really-a-png"),
                ("agent_id", None, b"2"),
                ("duration", None, b"8"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["agent_id"], 1);
    assert_eq!(body["data"]["media_type"], "image");
    assert_eq!(body["data"]["duration"], 8);
    assert!(body["data"]["media_url"].as_str().unwrap().starts_with("/uploads/"));

    let (status, body) = send(&app, get("/api/stories")).await;
    assert_eq!(status, StatusCode::OK);
    let groups = body["data"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["agent_id"], 1);
    assert_eq!(groups[0]["agent_name"], "Amina Warsame");
    assert_eq!(groups[0]["stories"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, get("/api/stories/agent/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, get("/api/stories/agent/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_story_rejects_documents() {
    let app = app().await;
    let agent = agent_token(&app).await;

    let (status, body) = send(
        &app,
        multipart(
            "/api/stories",
            &agent,
            &[("media", Some(("brochure.pdf", "application/pdf")), b"%PDF-1.4")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_property_image_upload() {
    let app = app().await;
    let admin = admin_token(&app).await;

    let (status, body) = send(
        &app,
        multipart(
            "/api/properties/4/images",
            &admin,
            &[
                ("images", Some(("front.jpg", "image/jpeg")), b"jpeg-bytes"),
                ("images", Some(("back.webp", "image/webp")), b"webp-bytes"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let urls = body["data"].as_array().unwrap();
    assert_eq!(urls.len(), 2);
    assert!(urls[1].as_str().unwrap().ends_with(".webp"));

    let (_, body) = send(&app, get("/api/properties/4")).await;
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = app().await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "nobody@guri.so" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("reset_token").is_none());

    let (_, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "Amina@Guri.so" })),
        ),
    )
    .await;
    let token = body["data"]["reset_token"].as_str().unwrap().to_string();

    let reset = json!({ "token": token, "password": "brand-new-password" });
    let (status, _) = send(
        &app,
        request(Method::POST, "/api/auth/reset-password", None, Some(reset.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    login(&app, "amina@guri.so", "brand-new-password").await;

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/auth/reset-password", None, Some(reset)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_and_me() {
    let app = app().await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Faisal", "email": "faisal@example.com", "password": "long-enough" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["role"], "user");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, request(Method::GET, "/api/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "faisal@example.com");

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Again", "email": "faisal@example.com", "password": "long-enough" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, request(Method::GET, "/api/auth/me", Some("not-a-jwt"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_stats_and_user_management() {
    let app = app().await;
    let admin = admin_token(&app).await;

    let (status, body) = send(&app, request(Method::GET, "/api/admin/stats", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["properties"], 4);
    assert_eq!(body["data"]["featured_properties"], 2);
    assert_eq!(body["data"]["users"], 3);

    let (status, _) = send(&app, request(Method::DELETE, "/api/admin/users/1", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, request(Method::DELETE, "/api/admin/users/42", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/admin/stories/purge", Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["purged"], 0);
}

#[tokio::test]
async fn test_new_projects_are_public_but_projects_are_not() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/new-projects?location=hargeisa")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![2]);

    let (status, body) = send(&app, get("/api/new-projects/lido-heights")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);

    let (status, _) = send(&app, get("/api/projects")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_missing_service() {
    let app = app().await;
    let admin = admin_token(&app).await;

    let (status, body) = send(&app, request(Method::DELETE, "/api/services/99", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Service not found: 99");

    let (status, _) = send(&app, request(Method::DELETE, "/api/services/abc", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_bodies_are_enveloped() {
    let app = app().await;

    let broken = Request::builder()
        .method(Method::POST)
        .uri("/api/contacts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": \"Hodan\","))
        .unwrap();
    let (status, body) = send(&app, broken).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request:"));

    let untyped = Request::builder()
        .method(Method::POST)
        .uri("/api/contacts")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(&app, untyped).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["success"], false);

    let admin = admin_token(&app).await;
    let not_multipart = request(Method::POST, "/api/properties/4/images", Some(&admin), Some(json!({})));
    let (status, body) = send(&app, not_multipart).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_route_is_enveloped() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Route not found: /api/nowhere" }));

    let (status, body) = send(&app, get("/favicon.ico")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_rejected_gallery_upload_writes_nothing() {
    let app = test_app().await;
    let admin = admin_token(&app.router).await;

    let (status, body) = send(
        &app.router,
        multipart(
            "/api/properties/4/images",
            &admin,
            &[
                ("images", Some(("front.png", "image/png")), b"png-bytes"),
                ("images", Some(("floorplan.pdf", "application/pdf")), b"%PDF-1.4"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE, "{}", body);
    assert_eq!(stored_files(&app.uploads), 0);

    let (_, body) = send(&app.router, get("/api/properties/4")).await;
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejected_story_writes_nothing() {
    let app = test_app().await;
    let agent = agent_token(&app.router).await;

    for duration in [&b"0"[..], &b"61"[..]] {
        let (status, body) = send(
            &app.router,
            multipart(
                "/api/stories",
                &agent,
                &[
                    ("media", Some(("tour.png", "image/png")), b"png-bytes"),
                    ("duration", None, duration),
                ],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(body["success"], false);
    }
    assert_eq!(stored_files(&app.uploads), 0);

    let (status, _) = send(
        &app.router,
        multipart(
            "/api/stories",
            &agent,
            &[("media", Some(("tour.png", "image/png")), b"png-bytes")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stored_files(&app.uploads), 1);
    std::fs::remove_dir_all(&app.uploads).ok();
}

#[tokio::test]
async fn test_admin_token_outlives_account() {
    let app = test_app().await;
    let admin = admin_token(&app.router).await;

    let (status, _) = send(&app.router, request(Method::GET, "/api/admin/stats", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);

    assert!(app.store.delete_user(1).await.unwrap());

    let (status, body) = send(&app.router, request(Method::GET, "/api/admin/stats", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Account no longer exists");

    let (status, _) = send(
        &app.router,
        request(Method::POST, "/api/categories", Some(&admin), Some(json!({ "name": "Offices" }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
