//! Integration tests for `/api/YeQiMessage`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_empty, post_json, put_json, TestApp};
use serde_json::{json, Value};

async fn post_message(app: &TestApp, name: &str, content: &str) -> Value {
    let response = post_json(
        app.app(),
        "/api/YeQiMessage",
        &json!({ "name": name, "content": content }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    json["data"].clone()
}

#[tokio::test]
async fn new_message_is_listed_first() {
    let app = build_test_app().await;
    post_message(&app, "Bob", "earlier").await;

    let message = post_message(&app, "Ann", "hi").await;
    assert!(message["id"].is_i64());
    assert!(message["created_at"].is_string());
    assert_eq!(message["name"], "Ann");
    assert_eq!(message["content"], "hi");

    let response = get(app.app(), "/api/YeQiMessage?page=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"][0]["id"], message["id"]);
    assert_eq!(json["data"][0]["content"], "hi");
    assert_eq!(json["pagination"]["total"], 2);
}

#[tokio::test]
async fn create_requires_name_and_content() {
    let app = build_test_app().await;

    for body in [
        json!({ "name": "Ann" }),
        json!({ "content": "hi" }),
        json!({ "name": "", "content": "hi" }),
        json!({ "name": "Ann", "content": "   " }),
    ] {
        let response = post_json(app.app(), "/api/YeQiMessage", &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }

    assert_eq!(app.count("messages").await, 0);
}

#[tokio::test]
async fn page_size_bounds_the_page() {
    let app = build_test_app().await;
    for i in 0..7 {
        post_message(&app, "Guest", &format!("note {i}")).await;
    }

    let response = get(app.app(), "/api/YeQiMessage?page=3&pageSize=3").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["content"], "note 0");
    assert_eq!(json["pagination"]["totalPages"], 3);

    let response = get(app.app(), "/api/YeQiMessage?page=9&pageSize=3").await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn largest_page_size_still_counts_pages() {
    let app = build_test_app().await;
    post_message(&app, "Ann", "only one").await;

    let response = get(app.app(), "/api/YeQiMessage?pageSize=9223372036854775807").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["pagination"]["pageSize"], i64::MAX);
    assert_eq!(json["pagination"]["totalPages"], 1);
}

#[tokio::test]
async fn array_bodies_are_rejected() {
    let app = build_test_app().await;

    let response = post_json(app.app(), "/api/YeQiMessage", &json!(["Ann", "hi"])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], 400);
    assert_eq!(app.count("messages").await, 0);

    let id = post_message(&app, "Ann", "hi").await["id"].as_i64().unwrap();
    let uri = format!("/api/YeQiMessage/{id}");
    let response = put_json(app.app(), &uri, &json!(["Mallory", "changed"])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(app.app(), &uri).await).await;
    assert_eq!(json["data"]["name"], "Ann");
    assert_eq!(json["data"]["content"], "hi");
}

#[tokio::test]
async fn sort_by_id_ascending() {
    let app = build_test_app().await;
    let first = post_message(&app, "A", "one").await;
    post_message(&app, "B", "two").await;

    let response = get(app.app(), "/api/YeQiMessage?sortBy=id&order=ASC").await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["id"], first["id"]);

    let response = get(app.app(), "/api/YeQiMessage?sortBy=name").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_by_id_wraps_the_row() {
    let app = build_test_app().await;
    let message = post_message(&app, "Ann", "hi").await;

    let response = get(app.app(), &format!("/api/YeQiMessage/{}", message["id"])).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["name"], "Ann");

    let response = get(app.app(), "/api/YeQiMessage/404").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_accepts_either_field() {
    let app = build_test_app().await;
    let id = post_message(&app, "Ann", "hi").await["id"].as_i64().unwrap();
    let uri = format!("/api/YeQiMessage/{id}");

    let response = put_json(app.app(), &uri, &json!({ "content": "hello again" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["content"], "hello again");
    assert_eq!(data["name"], "Ann");

    let response = put_json(app.app(), &uri, &json!({ "name": "Annie" })).await;
    assert_eq!(body_json(response).await["data"]["name"], "Annie");

    let response = put_json(app.app(), &uri, &json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(app.app(), &uri, &json!({ "content": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(app.app(), "/api/YeQiMessage/999", &json!({ "content": "x" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_one_and_all() {
    let app = build_test_app().await;
    let id = post_message(&app, "Ann", "hi").await["id"].as_i64().unwrap();
    post_message(&app, "Bob", "yo").await;
    post_message(&app, "Cy", "hey").await;

    let response = delete(app.app(), &format!("/api/YeQiMessage/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let response = delete(app.app(), &format!("/api/YeQiMessage/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.count("messages").await, 2);

    let response = delete(app.app(), "/api/YeQiMessage").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["deleted"], 2);
    assert_eq!(app.count("messages").await, 0);
}

#[tokio::test]
async fn messages_cannot_be_liked() {
    let app = build_test_app().await;
    let id = post_message(&app, "Ann", "hi").await["id"].as_i64().unwrap();

    let response = post_empty(app.app(), &format!("/api/YeQiMessage/{id}/like")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
