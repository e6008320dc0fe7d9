mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_redirect_and_count_click() {
    let (server, _store) = common::make_server();

    let created = server
        .post("/api/links")
        .add_header("X-Client-Id", "client-1")
        .json(&json!({ "url": "https://example.com/target" }))
        .await;
    created.assert_status(StatusCode::CREATED);

    let code = created.json::<Value>()["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);

    let response = server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/target");
    assert_eq!(
        response.header("cache-control"),
        "no-store, no-cache, must-revalidate"
    );

    let link = server
        .get(&format!("/api/admin/links/{code}"))
        .add_header("Authorization", common::admin_bearer())
        .await
        .json::<Value>();

    assert_eq!(link["click_count"], 1);
    assert!(link["last_clicked_at"].is_string());
}

#[tokio::test]
async fn test_each_redirect_counts() {
    let (server, _store) = common::make_server();

    server
        .post("/api/links")
        .add_header("Authorization", common::admin_bearer())
        .json(&json!({ "url": "https://example.com", "custom_code": "count1" }))
        .await
        .assert_status(StatusCode::CREATED);

    for _ in 0..3 {
        server
            .get("/count1")
            .await
            .assert_status(StatusCode::FOUND);
    }

    let link = server
        .get("/api/admin/links/count1")
        .add_header("Authorization", common::admin_bearer())
        .await
        .json::<Value>();

    assert_eq!(link["click_count"], 3);
}

#[tokio::test]
async fn test_redirect_follows_rebind() {
    let (server, _store) = common::make_server();

    server
        .post("/api/links")
        .add_header("X-Client-Id", "client-1")
        .json(&json!({ "url": "https://old.example.com", "custom_code": "moved1" }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .patch("/api/links/moved1")
        .add_header("X-Client-Id", "client-1")
        .json(&json!({ "url": "https://new.example.com" }))
        .await
        .assert_status_ok();

    let response = server.get("/moved1").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://new.example.com");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let (server, _store) = common::make_server();

    let response = server.get("/nonexistent").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_malformed_code_is_not_found() {
    let (server, _store) = common::make_server();

    server.get("/a").await.assert_status_not_found();
    server
        .get(&format!("/{}", "x".repeat(21)))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_target_with_control_characters_is_never_stored() {
    let (server, _store) = common::make_server();

    let response = server
        .post("/api/links")
        .add_header("Authorization", common::admin_bearer())
        .json(&json!({ "url": "https://example.com/a\nb", "custom_code": "ctrl01" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "invalid_format");

    server
        .get("/ctrl01")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rebind_to_control_characters_keeps_old_target() {
    let (server, _store) = common::make_server();

    server
        .post("/api/links")
        .add_header("Authorization", common::admin_bearer())
        .json(&json!({ "url": "https://example.com/ok", "custom_code": "ctrl02" }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .patch("/api/links/ctrl02")
        .add_header("Authorization", common::admin_bearer())
        .json(&json!({ "url": "https://example.com/\tbad" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server.get("/ctrl02").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/ok");
}
