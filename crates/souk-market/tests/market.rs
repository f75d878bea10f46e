//! Integration tests for the market APIs over a scripted backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use souk_market::{
    Feed, FeedConfig, FilePicker, ImagePicker, ImageSource, MarketError, PostsApi, ProductDraft,
    ProductQuery, ProductsApi, ProfileApi, ProfileConfig, ProfileUpdate,
};
use souk_protocol::Location;
use souk_protocol::endpoints::{POSTS, PRODUCTS, PROFILE, REFRESH_TOKEN, product};
use souk_session::{ApiClient, SessionConfig};
use souk_store::{MemoryStore, StoreKey};
use souk_transport::{FormPart, Method, RequestBody, ScriptedTransport, TransportError};

// =========================================================================
// Fixtures
// =========================================================================

type Client = ApiClient<ScriptedTransport, MemoryStore>;

fn setup() -> (Arc<ScriptedTransport>, Arc<Client>) {
    let transport = Arc::new(ScriptedTransport::new());
    let store = Arc::new(MemoryStore::with_entries([
        (StoreKey::AccessToken, "tok"),
        (StoreKey::RefreshToken, "r1"),
    ]));
    let client = Arc::new(ApiClient::new(
        Arc::clone(&transport),
        store,
        SessionConfig::default(),
    ));
    (transport, client)
}

fn product_json(id: &str, email: &str, deleted: bool) -> serde_json::Value {
    json!({
        "_id": id,
        "title": format!("Item {id}"),
        "price": 10,
        "isDeleted": deleted,
        "user": { "_id": "u", "email": email }
    })
}

fn posts_json(ids: impl IntoIterator<Item = u32>) -> serde_json::Value {
    let posts: Vec<_> = ids
        .into_iter()
        .map(|i| json!({ "_id": format!("p{i}"), "title": format!("Post {i}") }))
        .collect();
    json!({ "success": true, "data": posts })
}

fn multipart_names(body: &RequestBody) -> Vec<String> {
    match body {
        RequestBody::Multipart(parts) => parts.iter().map(|p| p.name().to_string()).collect(),
        other => panic!("expected multipart, got {other:?}"),
    }
}

fn text_value<'a>(body: &'a RequestBody, field: &str) -> Option<&'a str> {
    let RequestBody::Multipart(parts) = body else {
        return None;
    };
    parts.iter().find_map(|p| match p {
        FormPart::Text { name, value } if name == field => Some(value.as_str()),
        _ => None,
    })
}

// =========================================================================
// Profile
// =========================================================================

#[tokio::test]
async fn test_profile_fetch_returns_user() {
    let (transport, client) = setup();
    transport.respond(
        Method::Get,
        PROFILE,
        200,
        json!({ "data": { "user": { "_id": "u1", "email": "a@b.com" } } }),
    );

    let user = ProfileApi::new(client, ProfileConfig::default()).fetch().await.unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(transport.requests()[0].bearer.as_deref(), Some("tok"));
}

#[tokio::test(start_paused = true)]
async fn test_profile_fetch_with_retry_recovers() {
    let (transport, client) = setup();
    transport
        .respond(Method::Get, PROFILE, 503, json!({}))
        .fail(Method::Get, PROFILE, TransportError::Timeout)
        .respond(
            Method::Get,
            PROFILE,
            200,
            json!({ "data": { "user": { "_id": "u1", "email": "a@b.com" } } }),
        );

    let api = ProfileApi::new(client, ProfileConfig::default());
    let started = tokio::time::Instant::now();
    let user = api.fetch_with_retry().await.unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(transport.count(Method::Get, PROFILE), 3);
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_profile_fetch_with_retry_gives_up() {
    let (transport, client) = setup();
    transport.respond(Method::Get, PROFILE, 500, json!({}));

    let api = ProfileApi::new(client, ProfileConfig::default());
    let err = api.fetch_with_retry().await.unwrap_err();

    assert!(matches!(err, MarketError::Api(_)));
    assert_eq!(transport.count(Method::Get, PROFILE), 3);
}

#[tokio::test(start_paused = true)]
async fn test_profile_fetch_with_retry_stops_on_401() {
    let (transport, client) = setup();
    transport.respond(Method::Get, PROFILE, 401, json!({}));
    transport.respond(Method::Post, REFRESH_TOKEN, 401, json!({}));

    let api = ProfileApi::new(client, ProfileConfig::default());
    api.fetch_with_retry().await.unwrap_err();

    // The rejected refresh signs the user out; nothing is retried.
    assert_eq!(transport.count(Method::Get, PROFILE), 1);
    assert_eq!(transport.count(Method::Post, REFRESH_TOKEN), 1);
}

#[tokio::test]
async fn test_profile_update_sends_multipart() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("face");
    std::fs::write(&image, b"jpg").unwrap();

    let (transport, client) = setup();
    transport.respond(
        Method::Put,
        PROFILE,
        200,
        json!({ "data": { "user": { "_id": "u1", "email": "a@b.com", "lastName": "Byron" } } }),
    );

    let user = ProfileApi::new(client, ProfileConfig::default())
        .update(ProfileUpdate {
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            profile_image: Some(souk_transport::ImageAsset::from_path(image)),
        })
        .await
        .unwrap();

    assert_eq!(user.last_name.as_deref(), Some("Byron"));
    let sent = &transport.requests_to(Method::Put, PROFILE)[0];
    assert_eq!(multipart_names(&sent.body), ["firstName", "lastName", "profileImage"]);
    let RequestBody::Multipart(parts) = &sent.body else { unreachable!() };
    assert!(matches!(
        &parts[2],
        FormPart::File { file_name, content_type, .. }
            if file_name == "profile.jpg" && content_type == "image/jpeg"
    ));
}

#[tokio::test]
async fn test_profile_update_requires_names() {
    let (transport, client) = setup();

    let err = ProfileApi::new(client, ProfileConfig::default())
        .update(ProfileUpdate {
            first_name: "".into(),
            last_name: "Byron".into(),
            profile_image: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "First name is required");
    assert!(transport.requests().is_empty());
}

// =========================================================================
// Products
// =========================================================================

fn draft_with_image(dir: &tempfile::TempDir) -> ProductDraft {
    let path = dir.path().join("bike");
    std::fs::write(&path, b"img").unwrap();
    ProductDraft {
        name: "Bike".into(),
        description: "Barely used".into(),
        price: "120".into(),
        location: Some(Location {
            name: "Beirut".into(),
            latitude: 33.5,
            longitude: 35.25,
        }),
        images: vec![souk_transport::ImageAsset::from_path(path)],
    }
}

#[tokio::test]
async fn test_list_sends_query() {
    let (transport, client) = setup();
    transport.respond(
        Method::Get,
        PRODUCTS,
        200,
        json!({ "data": [product_json("1", "a@b.com", false)] }),
    );

    let products = ProductsApi::new(client)
        .list(&ProductQuery::default().page(1, 20).search("bike"))
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    let query = &transport.requests()[0].query;
    assert!(query.contains(&("search".into(), "bike".into())));
    assert!(query.contains(&("limit".into(), "20".into())));
}

#[tokio::test]
async fn test_list_owned_by_filters_owner_and_deleted() {
    let (transport, client) = setup();
    transport.respond(
        Method::Get,
        PRODUCTS,
        200,
        json!({ "data": [
            product_json("1", "a@b.com", false),
            product_json("2", "someone@else.com", false),
            product_json("3", "a@b.com", true),
        ] }),
    );

    let mine = ProductsApi::new(client).list_owned_by("a@b.com").await.unwrap();

    let ids: Vec<_> = mine.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["1"]);
    assert_eq!(
        transport.requests()[0].query,
        vec![("userEmail".to_string(), "a@b.com".to_string())]
    );
}

#[tokio::test]
async fn test_list_without_data_is_empty() {
    let (transport, client) = setup();
    transport.respond(Method::Get, PRODUCTS, 200, json!({ "success": true }));

    assert!(ProductsApi::new(client).list(&ProductQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_product_by_id() {
    let (transport, client) = setup();
    transport.respond(
        Method::Get,
        &product("42"),
        200,
        json!({ "data": product_json("42", "a@b.com", false) }),
    );

    let item = ProductsApi::new(client).get("42").await.unwrap();

    assert_eq!(item.id, "42");
    assert_eq!(item.title, "Item 42");
}

#[tokio::test]
async fn test_create_sends_title_location_and_images() {
    let dir = tempfile::tempdir().unwrap();
    let (transport, client) = setup();
    transport.respond(Method::Post, PRODUCTS, 201, json!({ "success": true }));

    let created = ProductsApi::new(client).create(draft_with_image(&dir)).await.unwrap();

    assert_eq!(created, None);
    let sent = &transport.requests_to(Method::Post, PRODUCTS)[0];
    assert_eq!(
        multipart_names(&sent.body),
        [
            "title",
            "description",
            "price",
            "location[name]",
            "location[latitude]",
            "location[longitude]",
            "images"
        ]
    );
    assert_eq!(text_value(&sent.body, "location[latitude]"), Some("33.5"));
    let RequestBody::Multipart(parts) = &sent.body else { unreachable!() };
    assert!(matches!(
        parts.last(),
        Some(FormPart::File { file_name, .. }) if file_name == "photo_0.jpg"
    ));
}

#[tokio::test]
async fn test_create_invalid_sends_nothing() {
    let (transport, client) = setup();

    let err = ProductsApi::new(client).create(ProductDraft::default()).await.unwrap_err();

    assert!(matches!(err, MarketError::Invalid(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_create_server_error_message() {
    let dir = tempfile::tempdir().unwrap();
    let (transport, client) = setup();
    transport.respond(Method::Post, PRODUCTS, 400, json!({ "message": "Too many images" }));

    let err = ProductsApi::new(client).create(draft_with_image(&dir)).await.unwrap_err();

    assert_eq!(err.user_message("Failed to upload product."), "Too many images");
}

#[tokio::test]
async fn test_update_uses_name_field_and_put() {
    let dir = tempfile::tempdir().unwrap();
    let (transport, client) = setup();
    transport.respond(
        Method::Put,
        &product("7"),
        200,
        json!({ "data": product_json("7", "a@b.com", false) }),
    );
    let mut draft = draft_with_image(&dir);
    draft.images.clear();

    let updated = ProductsApi::new(client).update("7", draft, 2).await.unwrap();

    assert_eq!(updated.map(|p| p.id).as_deref(), Some("7"));
    let sent = &transport.requests_to(Method::Put, &product("7"))[0];
    let names = multipart_names(&sent.body);
    assert_eq!(names[0], "name");
    assert!(!names.contains(&"images".to_string()));
}

#[tokio::test]
async fn test_delete_product() {
    let (transport, client) = setup();
    transport.respond(Method::Delete, &product("9"), 200, json!({ "success": true }));

    ProductsApi::new(client).delete("9").await.unwrap();

    assert_eq!(transport.count(Method::Delete, &product("9")), 1);
}

// =========================================================================
// Feed
// =========================================================================

fn feed(client: Arc<Client>, page_size: u32) -> Feed<ScriptedTransport, MemoryStore> {
    Feed::new(PostsApi::new(client), FeedConfig { page_size })
}

#[tokio::test]
async fn test_feed_pages_until_short_page() {
    let (transport, client) = setup();
    transport
        .respond(Method::Get, POSTS, 200, posts_json(0..3))
        .respond(Method::Get, POSTS, 200, posts_json(3..4));
    let mut feed = feed(client, 3);

    assert_eq!(feed.load_more().await.unwrap(), 3);
    assert!(feed.has_more());
    assert_eq!(feed.next_page(), 2);

    assert_eq!(feed.load_more().await.unwrap(), 1);
    assert!(!feed.has_more());

    // Exhausted: no further request.
    assert_eq!(feed.load_more().await.unwrap(), 0);
    assert_eq!(transport.count(Method::Get, POSTS), 2);

    let sent = transport.requests_to(Method::Get, POSTS);
    assert_eq!(sent[1].query, vec![("page".into(), "2".into()), ("limit".into(), "3".into())]);
}

#[tokio::test]
async fn test_feed_skips_duplicate_posts() {
    let (transport, client) = setup();
    transport
        .respond(Method::Get, POSTS, 200, posts_json(0..2))
        .respond(Method::Get, POSTS, 200, posts_json(1..3));
    let mut feed = feed(client, 2);

    feed.load_more().await.unwrap();
    let added = feed.load_more().await.unwrap();

    assert_eq!(added, 1);
    let ids: Vec<_> = feed.posts().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["p0", "p1", "p2"]);
}

#[tokio::test]
async fn test_feed_reset_replaces_posts() {
    let (transport, client) = setup();
    transport
        .respond(Method::Get, POSTS, 200, posts_json(0..2))
        .respond(Method::Get, POSTS, 200, posts_json(5..6));
    let mut feed = feed(client, 2);
    feed.load_more().await.unwrap();

    let count = feed.reset().await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(feed.posts()[0].id, "p5");
    assert!(!feed.has_more());
    assert_eq!(feed.next_page(), 2);
    let sent = transport.requests_to(Method::Get, POSTS);
    assert_eq!(sent[1].query[0], ("page".to_string(), "1".to_string()));
}

#[tokio::test]
async fn test_feed_error_stops_paging() {
    let (transport, client) = setup();
    transport.respond(Method::Get, POSTS, 500, json!({ "message": "down" }));
    let mut feed = feed(client, 10);

    let err = feed.load_more().await.unwrap_err();

    assert_eq!(err.user_message("Failed to load posts."), "down");
    assert!(!feed.has_more());
    assert_eq!(feed.load_more().await.unwrap(), 0);
}

// =========================================================================
// Picker into draft
// =========================================================================

#[tokio::test]
async fn test_picked_images_feed_a_draft() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shot.png");
    std::fs::write(&path, b"png").unwrap();

    let outcome = FilePicker::new([path]).pick(ImageSource::Library, 5).await.unwrap();
    let mut draft = draft_with_image(&dir);
    draft.images = outcome.into_assets();

    assert_eq!(draft.images.len(), 1);
    assert!(draft.validate_new().is_ok());
}
