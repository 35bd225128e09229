mod common;

use std::sync::Arc;

use amygdala::{router, AppState, ModelManager};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    _data: TempDir,
    _models: TempDir,
}

async fn app() -> TestApp {
    common::init();
    let data = TempDir::new().unwrap();
    let models = TempDir::new().unwrap();
    let sources = common::write_fixtures(data.path());
    let manager = ModelManager::new(models.path()).unwrap();
    let state = AppState::initialize(manager, sources).await.unwrap();
    TestApp {
        router: router(Arc::new(state)),
        _data: data,
        _models: models,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_and_symptoms() {
    let app = app().await;
    let (status, body) = send(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = send(&app.router, "GET", "/symptoms", None).await;
    assert_eq!(status, StatusCode::OK);
    let symptoms = body["symptoms"].as_array().unwrap();
    assert_eq!(symptoms.len(), 9);
    assert_eq!(symptoms[0], "itching");
}

#[tokio::test]
async fn test_predict() {
    let app = app().await;
    let (status, body) = send(
        &app.router,
        "POST",
        "/predict",
        Some(json!({"symptoms": ["itching", "skin_rash", "nodal_skin_eruptions"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_disease"], "Fungal infection");

    let (status, _) = send(&app.router, "POST", "/predict", Some(json!({"wrong": []}))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_suggest_symptoms() {
    let app = app().await;
    let (status, body) = send(
        &app.router,
        "POST",
        "/suggest-symptoms",
        Some(json!({"selected_symptoms": ["chills"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let suggested: Vec<&str> = body["suggested_symptoms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(!suggested.is_empty());
    assert!(suggested.len() <= 15);
    assert!(!suggested.contains(&"chills"));
    assert_eq!(suggested[0], "vomiting");

    let (status, body) = send(
        &app.router,
        "POST",
        "/suggest-symptoms",
        Some(json!({"selected_symptoms": ["unknown"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"suggested_symptoms": []}));
}

#[tokio::test]
async fn test_emoji_endpoints() {
    let app = app().await;

    // not trained yet
    let (status, body) = send(&app.router, "POST", "/emoji-suggest", Some(json!({"text": "so sad"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().starts_with("Emoji suggestion failed:"));

    let (status, body) = send(&app.router, "POST", "/emoji-train/naive-bayes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["algorithm"], "Naive Bayes");
    assert_eq!(body["num_emojis"], 3);
    assert_eq!(body["message"], "Naive Bayes emoji model trained successfully");

    let (status, body) = send(
        &app.router,
        "POST",
        "/emoji-suggest",
        Some(json!({"text": "crying, so sad", "top_n": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["emotion"], "sadness");
    assert_eq!(body["text"], "crying, so sad");
    assert_eq!(body["raw_predictions"].as_array().unwrap().len(), 2);
    assert_eq!(body["raw_predictions"][0]["emoji"], "😢");
    let first = &body["suggestions"][0];
    assert_eq!(first["emoji"], "😢");
    assert_eq!(first["description"], "Crying Face");

    let (status, body) = send(&app.router, "POST", "/emoji-suggest/naive-bayes", Some(json!({"text": "@user #"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("No predictions"));

    let (status, body) = send(
        &app.router,
        "POST",
        "/emoji-suggest",
        Some(json!({"text": "so sad", "top_n": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["raw_predictions"].as_array().unwrap().len(), 3);

    let (status, body) = send(
        &app.router,
        "POST",
        "/emoji-suggest",
        Some(json!({"text": "so sad", "top_n": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "top_n must be at least 1");
}

#[tokio::test]
async fn test_emoji_train_failure_detail() {
    common::init();
    let data = TempDir::new().unwrap();
    let models = TempDir::new().unwrap();
    let sources = common::write_fixtures(data.path());
    std::fs::remove_file(&sources.emoji_mapping).unwrap();
    let manager = ModelManager::new(models.path()).unwrap();
    let state = AppState::initialize(manager, sources).await.unwrap();
    let router = router(Arc::new(state));

    let (status, body) = send(&router, "POST", "/emoji-train", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Dataset error: Dataset not found"), "{}", detail);
}
