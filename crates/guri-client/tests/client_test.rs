use mockito::{Matcher, Server};
use serde_json::{json, Value};

use guri_client::{ClientError, GuriClient, NewStory, Session, Upload};
use guri_types::{
    ContactStatus, Page, PropertyDraft, PropertyFilter, PropertyType, Purpose, ResourceKey, Role,
};

fn envelope(data: Value) -> String {
    json!({ "success": true, "data": data }).to_string()
}

fn user_json(id: i64, role: &str) -> Value {
    json!({
        "id": id,
        "name": "Amina Warsame",
        "email": "amina@guri.so",
        "role": role,
        "created_at": "2026-03-01T09:00:00Z"
    })
}

fn property_json(id: i64) -> Value {
    json!({
        "id": id,
        "slug": "ocean-view-villa",
        "title": "Ocean View Villa",
        "price": 250000,
        "currency": "USD",
        "purpose": "Sale",
        "property_type": "villa",
        "location": "Lido",
        "city": "Mogadishu",
        "bedrooms": 4,
        "bathrooms": 3,
        "images": ["/uploads/a.jpg"],
        "featured": true,
        "agent_id": 1,
        "created_at": "2026-03-01T09:00:00Z",
        "updated_at": "2026-03-01T09:00:00Z"
    })
}

fn story_json(id: i64, agent_id: i64, created_at: &str) -> Value {
    json!({
        "id": id,
        "agent_id": agent_id,
        "media_type": "image",
        "media_url": format!("/uploads/story-{}.jpg", id),
        "duration": 5,
        "created_at": created_at,
        "agent_name": format!("Agent {}", agent_id)
    })
}

async fn logged_in(server: &mut Server) -> GuriClient {
    server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::PartialJson(json!({ "email": "amina@guri.so" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(envelope(json!({ "token": "jwt-token", "user": user_json(2, "agent") })))
        .create_async()
        .await;

    let client = GuriClient::new(server.url()).unwrap();
    client.login("amina@guri.so", "password123").await.unwrap();
    client
}

#[tokio::test]
async fn test_properties_sends_filter_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/properties")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("purpose".into(), "Rent".into()),
            Matcher::UrlEncoded("location".into(), "Mogadishu".into()),
            Matcher::UrlEncoded("type".into(), "villa".into()),
            Matcher::UrlEncoded("min_beds".into(), "3".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(envelope(json!([property_json(1)])))
        .create_async()
        .await;

    let client = GuriClient::new(server.url()).unwrap();
    let filter = PropertyFilter::new(Purpose::Rent)
        .location("Mogadishu")
        .property_type(PropertyType::Villa)
        .beds(Some(3), None);

    let properties = client
        .properties(&filter, Page::new(2, Page::DEFAULT_LIMIT))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].slug, "ocean-view-villa");
    assert!(properties[0].is_featured());
}

#[tokio::test]
async fn test_get_by_slug() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/properties/ocean-view-villa")
        .with_status(200)
        .with_body(envelope(property_json(4)))
        .create_async()
        .await;

    let client = GuriClient::new(server.url()).unwrap();
    let property = client
        .property(&ResourceKey::parse("Ocean-View-Villa"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(property.id, 4);
}

#[tokio::test]
async fn test_login_starts_session_and_attaches_token() {
    let mut server = Server::new_async().await;
    let client = logged_in(&mut server).await;

    let session = client.session().await;
    assert_eq!(session.token(), Some("jwt-token"));
    assert_eq!(session.user().map(|u| u.role), Some(Role::Agent));

    let mock = server
        .mock("POST", "/api/properties")
        .match_header("authorization", "Bearer jwt-token")
        .match_body(Matcher::PartialJson(json!({ "title": "Ocean View Villa", "purpose": "Sale" })))
        .with_status(201)
        .with_body(envelope(property_json(9)))
        .create_async()
        .await;

    let draft: PropertyDraft = serde_json::from_value(json!({
        "title": "Ocean View Villa",
        "price": 250000,
        "purpose": "Sale",
        "property_type": "villa",
        "location": "Lido",
        "city": "Mogadishu",
        "bedrooms": 4,
        "bathrooms": 3
    }))
    .unwrap();
    let created = client.create_property(&draft).await.unwrap();

    mock.assert_async().await;
    assert_eq!(created.id, 9);
}

#[tokio::test]
async fn test_mutation_without_session_fails_locally() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/properties/1")
        .expect(0)
        .create_async()
        .await;

    let client = GuriClient::new(server.url()).unwrap();
    let err = client.delete_property(1).await.unwrap_err();

    assert!(matches!(err, ClientError::NotAuthenticated));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_resets_session() {
    let mut server = Server::new_async().await;
    let client = logged_in(&mut server).await;

    server
        .mock("GET", "/api/auth/me")
        .with_status(401)
        .with_body(json!({ "success": false, "message": "Token expired" }).to_string())
        .create_async()
        .await;

    let err = client.me().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Token expired"));
    assert_eq!(err.status(), Some(401));
    assert_eq!(client.session().await, Session::Anonymous);
}

#[tokio::test]
async fn test_error_message_from_envelope() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/agents/99")
        .with_status(404)
        .with_body(json!({ "success": false, "message": "Agent not found: 99" }).to_string())
        .create_async()
        .await;

    let client = GuriClient::new(server.url()).unwrap();
    let err = client.agent(99).await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Agent not found: 99");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_error_message_falls_back_to_body_text() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/categories")
        .with_status(502)
        .with_body("Bad gateway from proxy")
        .create_async()
        .await;

    let client = GuriClient::new(server.url()).unwrap();
    let err = client.categories().await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Api { status: 502, ref message } if message == "Bad gateway from proxy"
    ));
}

#[tokio::test]
async fn test_unsuccessful_envelope_with_ok_status_is_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/services")
        .with_status(200)
        .with_body(json!({ "success": false, "message": "maintenance" }).to_string())
        .create_async()
        .await;

    let client = GuriClient::new(server.url()).unwrap();
    let err = client.services().await.unwrap_err();
    assert!(matches!(err, ClientError::Api { ref message, .. } if message == "maintenance"));
}

#[tokio::test]
async fn test_delete_accepts_envelope_without_data() {
    let mut server = Server::new_async().await;
    let client = logged_in(&mut server).await;

    let mock = server
        .mock("DELETE", "/api/stories/3")
        .match_header("authorization", "Bearer jwt-token")
        .with_status(200)
        .with_body(json!({ "success": true, "message": "Story deleted" }).to_string())
        .create_async()
        .await;

    client.delete_story(3).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stories_decode_groups() {
    let mut server = Server::new_async().await;
    let groups = json!([
        {
            "agent_id": 1,
            "agent_name": "Agent 1",
            "stories": [
                story_json(3, 1, "2026-03-01T12:00:00Z"),
                story_json(1, 1, "2026-03-01T08:00:00Z")
            ]
        },
        {
            "agent_id": 2,
            "stories": [story_json(2, 2, "2026-03-01T10:00:00Z")]
        }
    ]);
    server
        .mock("GET", "/api/stories")
        .with_status(200)
        .with_body(envelope(groups))
        .create_async()
        .await;

    let client = GuriClient::new(server.url()).unwrap();
    let groups = client.stories().await.unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].agent_id, 1);
    assert_eq!(groups[0].stories.len(), 2);
    assert_eq!(groups[0].stories[0].id, 3);
    assert_eq!(groups[1].agent_name, None);
}

#[tokio::test]
async fn test_image_upload_is_multipart() {
    let mut server = Server::new_async().await;
    let client = logged_in(&mut server).await;

    let mock = server
        .mock("POST", "/api/properties/4/images")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="images"; filename="front.jpg""#.into()),
            Matcher::Regex(r#"name="images"; filename="kitchen.png""#.into()),
        ]))
        .with_status(201)
        .with_body(envelope(json!(["/uploads/x.jpg", "/uploads/y.png"])))
        .create_async()
        .await;

    let urls = client
        .upload_property_images(
            4,
            vec![
                Upload::new("front.jpg", "image/jpeg", b"jpeg".to_vec()),
                Upload::new("kitchen.png", "image/png", b"png".to_vec()),
            ],
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(urls, vec!["/uploads/x.jpg", "/uploads/y.png"]);
}

#[tokio::test]
async fn test_post_story_sends_media_field() {
    let mut server = Server::new_async().await;
    let client = logged_in(&mut server).await;

    let mock = server
        .mock("POST", "/api/stories")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="media"; filename="tour.mp4""#.into()),
            Matcher::Regex(r#"name="duration""#.into()),
        ]))
        .with_status(201)
        .with_body(envelope(story_json(5, 1, "2026-03-01T12:00:00Z")))
        .create_async()
        .await;

    let mut story = NewStory::new(Upload::new("tour.mp4", "video/mp4", b"mp4".to_vec()));
    story.duration = Some(15);
    let posted = client.post_story(story).await.unwrap();

    mock.assert_async().await;
    assert_eq!(posted.id, 5);
}

#[tokio::test]
async fn test_contact_status_update() {
    let mut server = Server::new_async().await;
    let client = logged_in(&mut server).await;

    server
        .mock("PUT", "/api/contacts/6")
        .match_body(Matcher::Json(json!({ "status": "read" })))
        .with_status(200)
        .with_body(envelope(json!({
            "id": 6,
            "name": "Hodan",
            "email": "hodan@example.com",
            "message": "Is the villa still available?",
            "status": "read",
            "created_at": "2026-03-01T09:00:00Z"
        })))
        .create_async()
        .await;

    let contact = client.set_contact_status(6, ContactStatus::Read).await.unwrap();
    assert_eq!(contact.status, ContactStatus::Read);
}

#[tokio::test]
async fn test_forgot_password_token_is_optional() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/forgot-password")
        .with_status(200)
        .with_body(envelope(json!({})))
        .create_async()
        .await;

    let client = GuriClient::new(server.url()).unwrap();
    assert_eq!(client.forgot_password("nobody@guri.so").await.unwrap(), None);
}

#[tokio::test]
async fn test_logout_forgets_session() {
    let mut server = Server::new_async().await;
    let client = logged_in(&mut server).await;
    assert!(client.is_authenticated().await);

    client.logout().await;
    assert!(!client.is_authenticated().await);
    assert!(matches!(
        client.admin_stats().await.unwrap_err(),
        ClientError::NotAuthenticated
    ));
}
