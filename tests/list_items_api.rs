//! Router-level tests for the list-items pipeline
//!
//! These drive the fully assembled router (authentication, ownership gate,
//! handlers, error middleware) with in-memory stores.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use shelf_app::{build_registry, AppDeps};
use shelf_authz::{StaticTokenVerifier, User};
use shelf_db::{
    Book, InMemoryBookStore, InMemoryListItemStore, ListItem, ListItemFilter, ListItemStore,
};
use shelf_kernel::settings::Settings;
use tower::ServiceExt; // For oneshot()

struct TestApp {
    router: Router,
    list_items: InMemoryListItemStore,
}

fn book(id: &str, title: &str) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        author: "Ann Author".to_string(),
        cover_image_url: None,
        page_count: Some(200),
        publisher: None,
        synopsis: None,
    }
}

fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        username: format!("{id}-name"),
    }
}

fn test_app() -> TestApp {
    let books = InMemoryBookStore::with_books([book("b1", "Dune"), book("b2", "Emma")]);
    let list_items = InMemoryListItemStore::new();
    let verifier = StaticTokenVerifier::new([
        ("token-u1".to_string(), user("u1")),
        ("token-u2".to_string(), user("u2")),
    ]);

    let deps = AppDeps {
        books: Arc::new(books),
        list_items: Arc::new(list_items.clone()),
        verifier: Arc::new(verifier),
    };
    let registry = build_registry(&deps).unwrap();
    let router = shelf_http::build_router(&registry, &Settings::default());

    TestApp { router, list_items }
}

impl TestApp {
    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(value) => {
                let bytes = serde_json::to_vec(&value).unwrap();
                self.send_raw(method, uri, token, Some("application/json"), bytes)
                    .await
            }
            None => self.send_raw(method, uri, token, None, Vec::new()).await,
        }
    }

    async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body.into()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn items_of(&self, owner_id: &str) -> Vec<ListItem> {
        self.list_items
            .query(ListItemFilter::owned_by(owner_id))
            .await
            .unwrap()
    }

    async fn seed(&self, id: &str, owner_id: &str, book_id: &str) -> ListItem {
        self.list_items
            .insert(ListItem {
                id: id.to_string(),
                owner_id: owner_id.to_string(),
                book_id: book_id.to_string(),
                rating: -1,
                notes: String::new(),
                start_date: None,
                finish_date: None,
            })
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn create_list_item_for_a_new_book() {
    let app = test_app();

    let (status, body) = app
        .send(
            "POST",
            "/api/list-items",
            Some("token-u1"),
            Some(json!({ "bookId": "b1" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let list_item = &body["listItem"];
    assert_eq!(list_item["ownerId"], "u1");
    assert_eq!(list_item["bookId"], "b1");
    assert_eq!(
        list_item["book"],
        serde_json::to_value(book("b1", "Dune")).unwrap()
    );

    let id = list_item["id"].as_str().unwrap();
    assert!(app.list_items.read_by_id(id).await.unwrap().is_some());
}

#[tokio::test]
async fn create_list_item_without_book_id_is_a_400() {
    let app = test_app();

    let (status, body) = app
        .send("POST", "/api/list-items", Some("token-u1"), Some(json!({})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "No bookId provided" }));
}

#[tokio::test]
async fn create_list_item_without_a_body_is_a_400() {
    let app = test_app();

    for content_type in [None, Some("application/json")] {
        let (status, body) = app
            .send_raw(
                "POST",
                "/api/list-items",
                Some("token-u1"),
                content_type,
                Body::empty(),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{content_type:?}");
        assert_eq!(body, json!({ "message": "No bookId provided" }));
    }
    assert!(app.items_of("u1").await.is_empty());
}

#[tokio::test]
async fn create_list_item_with_malformed_json_is_a_400_with_a_message() {
    let app = test_app();

    let (status, body) = app
        .send_raw(
            "POST",
            "/api/list-items",
            Some("token-u1"),
            Some("application/json"),
            r#"{"bookId": 1}"#,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string(), "{body}");
    assert!(app.items_of("u1").await.is_empty());
}

#[tokio::test]
async fn create_list_item_twice_is_a_400() {
    let app = test_app();
    app.seed("li1", "u1", "b1").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/list-items",
            Some("token-u1"),
            Some(json!({ "bookId": "b1" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "message": "User u1 already has a list item for the book with the ID b1" })
    );
}

#[tokio::test]
async fn unknown_list_item_is_a_404() {
    let app = test_app();

    let (status, body) = app
        .send("GET", "/api/list-items/42", Some("token-u1"), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "message": "No list item was found with the id of 42" })
    );
}

#[tokio::test]
async fn someone_elses_list_item_is_a_403() {
    let app = test_app();
    app.seed("li1", "u1", "b1").await;

    let (status, body) = app
        .send("GET", "/api/list-items/li1", Some("token-u2"), None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({ "message": "User with id u2 is not authorized to access the list item li1" })
    );
}

#[tokio::test]
async fn own_list_item_is_expanded_with_its_book() {
    let app = test_app();
    let item = app.seed("li1", "u1", "b2").await;

    let (status, body) = app
        .send("GET", "/api/list-items/li1", Some("token-u1"), None)
        .await;

    let mut expected = serde_json::to_value(&item).unwrap();
    expected["book"] = serde_json::to_value(book("b2", "Emma")).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "listItem": expected }));
}

#[tokio::test]
async fn list_items_only_include_the_callers() {
    let app = test_app();
    app.seed("li1", "u1", "b2").await;
    app.seed("li2", "u2", "b1").await;
    app.seed("li3", "u1", "b1").await;

    let (status, body) = app
        .send("GET", "/api/list-items", Some("token-u1"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let items = body["listItems"].as_array().unwrap();
    let summary: Vec<(&str, &str)> = items
        .iter()
        .map(|item| {
            (
                item["id"].as_str().unwrap(),
                item["book"]["title"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(summary, vec![("li1", "Emma"), ("li3", "Dune")]);
}

#[tokio::test]
async fn missing_token_is_a_401_with_code() {
    let app = test_app();

    let (status, body) = app.send("GET", "/api/list-items", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({
            "code": "credentials_required",
            "message": "No authorization token was found"
        })
    );
}

#[tokio::test]
async fn unauthenticated_item_requests_never_reach_the_gate() {
    let app = test_app();
    app.seed("li1", "u1", "b1").await;

    let (status, body) = app
        .send("GET", "/api/list-items/li1", Some("forged"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_token");
}

#[tokio::test]
async fn books_are_readable_by_id() {
    let app = test_app();

    let (status, body) = app
        .send("GET", "/api/books/b1", Some("token-u1"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["title"], "Dune");

    let (status, body) = app
        .send("GET", "/api/books/b9", Some("token-u1"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "No book was found with the id of b9" }));
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, spec) = app.send("GET", "/docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/api/list-items/{id}"]["get"].is_object());
    assert!(spec["paths"]["/api/list-items"]["post"].is_object());
}
