//! Smoke tests against a spawned server.
//!
//! The application is built with the real Gemini provider but only the
//! endpoints that never reach it are exercised.

use attractions_service::config::{AttractionsConfig, GoogleConfig, ModelConfig, RequestLogConfig};
use attractions_service::startup::Application;
use reqwest::Client;
use secrecy::Secret;
use service_core::config::Config;
use std::time::Duration;
use tempfile::TempDir;

/// Spawn the application on a random port and return the port number.
async fn spawn_app(log_dir: &TempDir) -> u16 {
    let config = AttractionsConfig {
        common: Config {
            port: 0, // Random port
            ..Config::default()
        },
        models: ModelConfig {
            text_model: "gemini-2.5-flash".to_string(),
        },
        google: GoogleConfig {
            api_key: Secret::new("test-api-key".to_string()),
            api_base: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(1),
        },
        request_log: RequestLogConfig {
            path: log_dir.path().join("info.csv"),
        },
    };

    let app = Application::build(config)
        .await
        .expect("Failed to build application");

    let port = app.port();

    // Spawn the server in the background
    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    port
}

#[tokio::test]
async fn root_returns_greeting() {
    let dir = TempDir::new().unwrap();
    let port = spawn_app(&dir).await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Hello from the attractions service!");
}

#[tokio::test]
async fn health_check_returns_ok() {
    let dir = TempDir::new().unwrap();
    let port = spawn_app(&dir).await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "attractions-service");
}

#[tokio::test]
async fn readiness_check_returns_ok_with_api_key() {
    let dir = TempDir::new().unwrap();
    let port = spawn_app(&dir).await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/ready", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}
