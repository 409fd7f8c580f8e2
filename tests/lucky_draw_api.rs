//! Integration tests for `/api/luckyDraw`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_empty, post_json, put_json, TestApp};
use serde_json::{json, Value};

async fn add(app: &TestApp, body: Value) -> Value {
    let response = post_json(app.app(), "/api/luckyDraw", &body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Participant created successfully!");
    json["participant"].clone()
}

#[tokio::test]
async fn create_defaults_weight_to_one() {
    let app = build_test_app().await;

    let participant = add(&app, json!({ "name": "Ann" })).await;
    assert_eq!(participant["weight"], 1);
    assert_eq!(participant["likes"], 0);

    let participant = add(&app, json!({ "name": "Bob", "weight": "4" })).await;
    assert_eq!(participant["weight"], 4);
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let app = build_test_app().await;

    for body in [
        json!({}),
        json!({ "name": "  " }),
        json!({ "name": "Zero", "weight": 0 }),
        json!({ "name": "Negative", "weight": -3 }),
        json!({ "name": "Words", "weight": "heavy" }),
        json!({ "name": "Greedy", "weight": i64::MAX }),
        json!({ "name": "Just over", "weight": 1_000_001 }),
        json!(["Positional", 5]),
    ] {
        let response = post_json(app.app(), "/api/luckyDraw", &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }

    assert_eq!(app.count("lucky_draw").await, 0);
}

#[tokio::test]
async fn list_defaults_to_id_ascending_and_sorts_by_weight() {
    let app = build_test_app().await;
    add(&app, json!({ "name": "light", "weight": 1 })).await;
    add(&app, json!({ "name": "heavy", "weight": 9 })).await;
    add(&app, json!({ "name": "medium", "weight": 5 })).await;

    let names = |json: &Value| -> Vec<String> {
        json["participants"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect()
    };

    let json = body_json(get(app.app(), "/api/luckyDraw").await).await;
    assert_eq!(names(&json), ["light", "heavy", "medium"]);
    assert_eq!(json["total"], 3);

    let json = body_json(get(app.app(), "/api/luckyDraw?sortBy=weight&order=DESC").await).await;
    assert_eq!(names(&json), ["heavy", "medium", "light"]);

    let response = get(app.app(), "/api/luckyDraw?sortBy=name").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_name_or_weight() {
    let app = build_test_app().await;
    let id = add(&app, json!({ "name": "Ann", "weight": 2 })).await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/luckyDraw/{id}");

    let response = put_json(app.app(), &uri, &json!({ "weight": 7 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let participant = body_json(response).await["participant"].clone();
    assert_eq!(participant["weight"], 7);
    assert_eq!(participant["name"], "Ann");

    let response = put_json(app.app(), &uri, &json!({ "weight": 0 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(app.app(), &uri, &json!({ "weight": i64::MAX })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(app.app(), &uri, &json!({ "weight": 1_000_000 })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json(app.app(), "/api/luckyDraw/555", &json!({ "name": "Ghost" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn like_counts_up() {
    let app = build_test_app().await;
    let id = add(&app, json!({ "name": "Fan favourite" })).await["id"]
        .as_i64()
        .unwrap();

    for expected in 1..=3 {
        let response = post_empty(app.app(), &format!("/api/luckyDraw/{id}/like")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["participant"]["likes"], expected);
    }
}

#[tokio::test]
async fn draw_from_empty_list_is_404() {
    let app = build_test_app().await;
    let response = post_empty(app.app(), "/api/luckyDraw/draw").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn draw_returns_an_existing_participant() {
    let app = build_test_app().await;
    let ann = add(&app, json!({ "name": "Ann", "weight": 3 })).await;
    let bob = add(&app, json!({ "name": "Bob", "weight": 1 })).await;

    for _ in 0..10 {
        let response = post_empty(app.app(), "/api/luckyDraw/draw").await;
        assert_eq!(response.status(), StatusCode::OK);
        let winner = body_json(response).await["participant"]["id"].clone();
        assert!(winner == ann["id"] || winner == bob["id"]);
    }
}

#[tokio::test]
async fn draw_with_maximum_weights_still_picks_a_winner() {
    let app = build_test_app().await;
    for name in ["Ann", "Bob", "Cy"] {
        add(&app, json!({ "name": name, "weight": 1_000_000 })).await;
    }

    let response = post_empty(app.app(), "/api/luckyDraw/draw").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["participant"]["id"].is_i64());
}

#[tokio::test]
async fn delete_reports_counts() {
    let app = build_test_app().await;
    let id = add(&app, json!({ "name": "Ann" })).await["id"].as_i64().unwrap();
    add(&app, json!({ "name": "Bob" })).await;
    add(&app, json!({ "name": "Cy" })).await;

    let response = delete(app.app(), &format!("/api/luckyDraw/{id}")).await;
    assert_eq!(
        body_json(response).await["message"],
        "Participant deleted successfully!"
    );

    let response = delete(app.app(), &format!("/api/luckyDraw/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(app.app(), "/api/luckyDraw").await;
    let json = body_json(response).await;
    assert_eq!(json["message"], "Deleted 2 participants successfully!");
    assert_eq!(json["deleted"], 2);
    assert_eq!(app.count("lucky_draw").await, 0);
}
