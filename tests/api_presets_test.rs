//! Tests for /api/presets and /api/parse.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use common::TestApp;

#[tokio::test]
async fn test_list_presets() {
    let app = TestApp::new();

    let response = app.get("/api/presets").await;

    common::assert_ok(&response);
    let presets: Vec<serde_json::Value> = response.json();
    assert_eq!(presets.len(), 20);
    assert_eq!(presets[0]["name"], "Lumineux & doux");
    assert_eq!(
        presets[0]["params"],
        serde_json::json!({"brightness": 20.0, "contrast": -10.0, "warmth": 10.0})
    );
    assert!(presets.iter().all(|p| p["description"].is_string()));
}

#[tokio::test]
async fn test_parse_text() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/parse",
            r#"{"text": "augmenter légèrement la luminosité et le contraste"}"#,
        )
        .await;

    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    assert_eq!(
        json["params"],
        serde_json::json!({"brightness": 10.0, "contrast": 10.0})
    );
}

#[tokio::test]
async fn test_parse_black_and_white() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/parse", r#"{"text": "Noir et blanc"}"#)
        .await;

    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    assert_eq!(json["params"], serde_json::json!({"grayscale": 1.0}));
}

#[tokio::test]
async fn test_parse_unrecognized() {
    let app = TestApp::new();

    for text in ["", "   ", "make it pop"] {
        let body = serde_json::json!({ "text": text }).to_string();
        let response = app.post_json("/api/parse", &body).await;
        common::assert_json_error(&response, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
