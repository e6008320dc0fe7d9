mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_client_create_generates_six_char_code() {
    let (server, _store) = common::make_server();

    let response = server
        .post("/api/links")
        .add_header("X-Client-Id", "client-1")
        .json(&json!({ "url": "https://example.com/a" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body = response.json::<Value>();
    let code = body["code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(body["target_url"], "https://example.com/a");
    assert_eq!(body["short_url"], format!("{}/{}", common::BASE_URL, code));
    assert_eq!(body["click_count"], 0);
    assert_eq!(body["created_by"], "client");
    assert_eq!(body["owner_client_id"], "client-1");
}

#[tokio::test]
async fn test_admin_create_needs_no_client_id() {
    let (server, _store) = common::make_server();

    let response = server
        .post("/api/links")
        .add_header("Authorization", common::admin_bearer())
        .json(&json!({ "url": "https://example.com/admin" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body = response.json::<Value>();
    assert_eq!(body["created_by"], "admin");
    assert!(body.get("owner_client_id").is_none());
}

#[tokio::test]
async fn test_custom_code_is_used_verbatim() {
    let (server, _store) = common::make_server();

    let response = server
        .post("/api/links")
        .add_header("X-Client-Id", "client-1")
        .json(&json!({ "url": "https://example.com", "custom_code": "Promo2026" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["code"], "Promo2026");
}

#[tokio::test]
async fn test_taken_custom_code_conflicts_with_update_hint() {
    let (server, _store) = common::make_server();

    server
        .post("/api/links")
        .add_header("X-Client-Id", "client-1")
        .json(&json!({ "url": "https://example.com/1", "custom_code": "taken1" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/links")
        .add_header("X-Client-Id", "client-2")
        .json(&json!({ "url": "https://example.com/2", "custom_code": "taken1" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "already_exists");
    assert_eq!(body["error"]["details"]["suggestion"], "update");
}

#[tokio::test]
async fn test_invalid_urls_are_rejected() {
    let (server, _store) = common::make_server();

    for url in ["not a url", "ftp://example.com/file", "https://", ""] {
        let response = server
            .post("/api/links")
            .add_header("X-Client-Id", "client-1")
            .json(&json!({ "url": url }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"]["code"], "invalid_format");
    }
}

#[tokio::test]
async fn test_invalid_custom_code_is_rejected() {
    let (server, _store) = common::make_server();
    let too_long = "x".repeat(21);

    for code in ["ab", "has-dash", too_long.as_str()] {
        let response = server
            .post("/api/links")
            .add_header("X-Client-Id", "client-1")
            .json(&json!({ "url": "https://example.com", "custom_code": code }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_blank_custom_code_generates_random_code() {
    let (server, _store) = common::make_server();

    for code in ["", "   "] {
        let response = server
            .post("/api/links")
            .add_header("X-Client-Id", "client-1")
            .json(&json!({ "url": "https://example.com", "custom_code": code }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let generated = response.json::<Value>()["code"].as_str().unwrap().to_string();
        assert_eq!(generated.len(), 6);
    }
}

#[tokio::test]
async fn test_missing_client_id_is_bad_request() {
    let (server, _store) = common::make_server();

    let response = server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["details"]["header"],
        "x-client-id"
    );
}

#[tokio::test]
async fn test_wrong_bearer_is_not_downgraded_to_client() {
    let (server, _store) = common::make_server();

    let response = server
        .post("/api/links")
        .add_header("Authorization", "Bearer wrong-token")
        .add_header("X-Client-Id", "client-1")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_invalid_format() {
    let (server, _store) = common::make_server();

    let response = server
        .post("/api/links")
        .add_header("X-Client-Id", "client-1")
        .add_header("Content-Type", "application/json")
        .text("{not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "invalid_format");
}

#[tokio::test]
async fn test_rebind_changes_target() {
    let (server, _store) = common::make_server();

    server
        .post("/api/links")
        .add_header("X-Client-Id", "client-1")
        .json(&json!({ "url": "https://old.example.com", "custom_code": "rebind1" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .patch("/api/links/rebind1")
        .add_header("X-Client-Id", "client-2")
        .json(&json!({ "url": "https://new.example.com" }))
        .await;

    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["code"], "rebind1");
    assert_eq!(body["target_url"], "https://new.example.com");
    assert!(body["updated_at"].is_string());
}

#[tokio::test]
async fn test_rebind_missing_code_suggests_create() {
    let (server, _store) = common::make_server();

    let response = server
        .patch("/api/links/nope42")
        .add_header("X-Client-Id", "client-1")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status_not_found();

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["details"]["suggestion"], "create");
}

#[tokio::test]
async fn test_rebind_with_invalid_url_leaves_link_untouched() {
    let (server, _store) = common::make_server();

    server
        .post("/api/links")
        .add_header("Authorization", common::admin_bearer())
        .json(&json!({ "url": "https://keep.example.com", "custom_code": "keep01" }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .patch("/api/links/keep01")
        .add_header("X-Client-Id", "client-1")
        .json(&json!({ "url": "javascript:alert(1)" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/admin/links/keep01")
        .add_header("Authorization", common::admin_bearer())
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["target_url"],
        "https://keep.example.com"
    );
}
