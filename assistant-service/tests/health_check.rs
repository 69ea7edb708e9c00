mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = reqwest::get(format!("{}/health", app.address))
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "assistant-service");
}

#[tokio::test]
async fn readiness_check_reads_the_store() {
    let app = TestApp::spawn().await;

    let response = reqwest::get(format!("{}/ready", app.address))
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
}
