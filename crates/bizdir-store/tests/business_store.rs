//! Integration tests for `BusinessStore` and `ReviewStore` using wiremock
//! HTTP mocks. No real network traffic is made.

use bizdir_core::{normalize, RemoteCredentials};
use bizdir_store::{
    BusinessApplication, BusinessStore, ImageUpload, ReviewDraft, ReviewStore, StoreClient,
    StoreError,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches the `where` query parameter as parsed JSON, so key order in the
/// serialized clause does not matter.
struct WhereClause(Value);

impl Match for WhereClause {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .find(|(key, _)| key == "where")
            .and_then(|(_, raw)| serde_json::from_str::<Value>(&raw).ok())
            .is_some_and(|clause| clause == self.0)
    }
}

fn test_client(base_url: &str) -> StoreClient {
    let credentials = RemoteCredentials {
        app_id: "test-app".to_owned(),
        rest_key: "test-key".to_owned(),
    };
    StoreClient::new(base_url, &credentials, 5, "bizdir-test/0.1")
        .expect("client construction should not fail")
}

fn test_store(base_url: &str) -> BusinessStore {
    BusinessStore::new(test_client(base_url))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_by_keyword_sends_disjunctive_query_with_auth_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Business"))
        .and(header("x-parse-application-id", "test-app"))
        .and(header("x-parse-rest-api-key", "test-key"))
        .and(query_param("limit", "1000"))
        .and(WhereClause(json!({"$or": [
            {"Keywords": {"$regex": "pizza", "$options": "i"}},
            {"Keywords": {"$regex": "pizzas", "$options": "i"}},
            {"Name": {"$regex": "pizza", "$options": "i"}},
            {"Category": {"$regex": "pizza", "$options": "i"}}
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "objectId": "p1",
                "Name": "Slice House",
                "Category": "Restaurant",
                "Keywords": ["pizzas", "delivery"],
                "Address": "12 Oak St"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = test_store(&server.uri())
        .find_by_keyword("pizza")
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id(), Some("p1"));
    let record = normalize(&results[0]);
    assert_eq!(record.name.as_deref(), Some("Slice House"));
}

#[tokio::test]
async fn find_by_keyword_blank_fetches_everything() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Business"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let results = test_store(&server.uri())
        .with_limit(25)
        .find_by_keyword("   ")
        .await
        .unwrap();
    assert!(results.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests[0].url.query_pairs().all(|(k, _)| k != "where"),
        "fetch-all must not send a where clause"
    );
}

#[tokio::test]
async fn find_by_category_sends_anchored_escaped_pattern() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Business"))
        .and(WhereClause(json!({
            "Category": {"$regex": "^Fast\\-Food \\& Casual$", "$options": "i"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"objectId": "f1", "Name": "Burger Barn", "Category": "Fast-Food & Casual"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = test_store(&server.uri())
        .find_by_category("Fast-Food & Casual")
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn find_by_id_not_found_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Business/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"code": 101, "error": "Object not found."})),
        )
        .mount(&server)
        .await;

    let err = test_store(&server.uri())
        .find_by_id("missing")
        .await
        .expect_err("missing object should error");
    assert!(err.is_not_found(), "expected not-found, got {err:?}");
}

#[tokio::test]
async fn find_by_id_blank_never_hits_the_network() {
    let server = MockServer::start().await;
    let err = test_store(&server.uri()).find_by_id("").await.unwrap_err();
    assert!(matches!(err, StoreError::MissingId));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_json_success_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Business"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_store(&server.uri()).fetch_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn transient_failure_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Business"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/classes/Business"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"objectId": "r1", "Name": "Retry Diner"}]
        })))
        .mount(&server)
        .await;

    let store = BusinessStore::new(test_client(&server.uri()).with_retry(2, 0));
    let results = store.fetch_all().await.expect("should succeed after retry");
    assert_eq!(results.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

fn application() -> BusinessApplication {
    BusinessApplication {
        name: "Joe's Cafe".to_owned(),
        category: "Cafe".to_owned(),
        keywords: vec!["coffee".to_owned()],
        address: "1 Main St".to_owned(),
        ..BusinessApplication::default()
    }
}

#[tokio::test]
async fn create_sets_public_read_acl() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/classes/Business"))
        .and(body_partial_json(json!({
            "Name": "Joe's Cafe",
            "Keywords": ["Cafe", "coffee"],
            "Addresses": ["1 Main St"],
            "ACL": {"*": {"read": true}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "objectId": "new1",
            "createdAt": "2025-04-01T09:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = test_store(&server.uri())
        .create(&application())
        .await
        .expect("create should succeed");
    assert_eq!(created.object_id, "new1");
}

#[tokio::test]
async fn create_uploads_image_before_saving() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/files/photo.jpg"))
        .and(header("content-type", "image/jpeg"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "abc_photo.jpg",
            "url": "https://files.example.com/abc_photo.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/classes/Business"))
        .and(body_partial_json(json!({
            "Image": {"__type": "File", "name": "abc_photo.jpg"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"objectId": "new2"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = application();
    app.image = Some(ImageUpload {
        filename: "photo.jpg".to_owned(),
        content_type: "image/jpeg".to_owned(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
    });

    let created = test_store(&server.uri()).create(&app).await.unwrap();
    assert_eq!(created.object_id, "new2");
}

#[tokio::test]
async fn create_permission_failure_is_detected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/classes/Business"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 119,
            "error": "Permission denied for action create on class Business."
        })))
        .mount(&server)
        .await;

    let err = test_store(&server.uri())
        .create(&application())
        .await
        .unwrap_err();
    assert!(err.is_permission_denied(), "got {err:?}");
}

#[tokio::test]
async fn update_and_delete_target_the_object_path() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/classes/Business/b9"))
        .and(body_partial_json(json!({"Description": "Now open Sundays"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updatedAt": "2025-05-01T00:00:00.000Z"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/classes/Business/b9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let mut fields = serde_json::Map::new();
    fields.insert("Description".to_owned(), json!("Now open Sundays"));
    store.update("b9", &fields).await.unwrap();
    store.delete("b9").await.unwrap();
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reviews_are_created_with_numeric_rating() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/classes/Review"))
        .and(body_partial_json(json!({"businessId": "b1", "rating": 5})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"objectId": "r1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let created = ReviewStore::new(&client)
        .create_review(&ReviewDraft {
            business_id: "b1".to_owned(),
            rating: Some("5".to_owned()),
            text: Some("Best espresso in town".to_owned()),
            author_name: Some("sam".to_owned()),
        })
        .await
        .unwrap();
    assert_eq!(created.object_id, "r1");
}

#[tokio::test]
async fn reviews_are_listed_by_business_newest_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Review"))
        .and(WhereClause(json!({"businessId": "b1"})))
        .and(query_param("order", "-createdAt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"objectId": "r2", "businessId": "b1", "rating": 4, "text": "Solid", "createdAt": "2025-04-02T00:00:00.000Z"},
                {"objectId": "r1", "businessId": "b1", "rating": 5, "createdAt": "2025-04-01T00:00:00.000Z"},
                {"businessId": "b1", "rating": "broken"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let reviews = ReviewStore::new(&client)
        .find_reviews_by_business("b1")
        .await
        .unwrap();

    assert_eq!(reviews.len(), 2, "malformed rows are skipped");
    assert_eq!(reviews[0].id, "r2");
    assert_eq!(reviews[0].rating, Some(4.0));
}

#[tokio::test]
async fn reviews_for_blank_business_skip_the_store() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());
    let reviews = ReviewStore::new(&client)
        .find_reviews_by_business("")
        .await
        .unwrap();
    assert!(reviews.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn all_reviews_are_listed_without_a_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/classes/Review"))
        .and(query_param("limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"objectId": "r1", "businessId": "b1", "rating": 5},
                {"objectId": "r2", "businessId": "b2", "rating": 3.5, "text": "Fine"},
                {"rating": 2}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let reviews = ReviewStore::new(&client).fetch_all_reviews().await.unwrap();

    assert_eq!(reviews.len(), 2, "malformed rows are skipped");
    assert_eq!(reviews[1].business_id.as_deref(), Some("b2"));
    assert_eq!(reviews[1].rating, Some(3.5));
    let requests = server.received_requests().await.unwrap();
    assert!(
        requests[0].url.query_pairs().all(|(k, _)| k != "where"),
        "listing every review must not send a where clause"
    );
}
