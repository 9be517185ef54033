//! # Server End-to-End Tests
//!
//! Spawns the server on a random port against httpmock-backed workspace
//! APIs and exercises `/predict` over real HTTP.

use httpmock::prelude::*;
use serde_json::json;
use sqlrag_server::{config::AppConfig, run};
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};

const INDEX_NAME: &str = "demo.data.table_metadata_index";
const LLM_ENDPOINT: &str = "text2sqlrag";

fn test_config(workspace_url: String) -> AppConfig {
    AppConfig {
        port: 0,
        workspace_url,
        workspace_token: "test-token".to_string(),
        vector_search_endpoint: "shared-endpoint".to_string(),
        vector_index_name: INDEX_NAME.to_string(),
        llm_endpoint: LLM_ENDPOINT.to_string(),
    }
}

/// Spawns the app bound to a random port, returning its base address.
async fn spawn_app(workspace_url: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{port}");

    let config = test_config(workspace_url);
    tokio::spawn(async move {
        if let Err(e) = run(listener, config).await {
            eprintln!("Server error: {e}");
        }
    });

    // Give the server a moment to start
    sleep(Duration::from_millis(100)).await;

    address
}

#[tokio::test]
async fn test_health_check() {
    let workspace = MockServer::start();
    let address = spawn_app(workspace.base_url()).await;

    let response = reqwest::get(format!("{address}/health"))
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_predict_round_trip() {
    let workspace = MockServer::start();

    let query_mock = workspace.mock(|when, then| {
        when.method(POST)
            .path(format!("/api/2.0/vector-search/indexes/{INDEX_NAME}/query"));
        then.status(200).json_body(json!({
            "result": {
                "data_array": [
                    ["farm", "CREATE TABLE farm (Farm_ID int, Cows real)", "Livestock counts"]
                ]
            }
        }));
    });

    let invocation_mock = workspace.mock(|when, then| {
        when.method(POST)
            .path(format!("/serving-endpoints/{LLM_ENDPOINT}/invocations"));
        then.status(200).json_body(json!({
            "choices": [{ "text": "[SQL]\nSELECT MAX(Cows), MIN(Cows) FROM farm;</s>" }]
        }));
    });

    let address = spawn_app(workspace.base_url()).await;
    let client = reqwest::Client::new();

    let payload = json!({
        "messages": [{
            "role": "user",
            "content": "Return the maximum and minimum number of cows across all farms."
        }]
    });

    let response = client
        .post(format!("{address}/predict"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(
        response.status().is_success(),
        "Request failed with status: {}",
        response.status()
    );

    let body: serde_json::Value = response
        .json()
        .await
        .expect("Failed to parse response JSON");

    assert_eq!(
        body["generated_sql"][0].as_str().unwrap(),
        "SELECT MAX(Cows), MIN(Cows) FROM farm;"
    );

    query_mock.assert();
    invocation_mock.assert();
}

#[tokio::test]
async fn test_predict_maps_upstream_failure_to_bad_gateway() {
    let workspace = MockServer::start();

    workspace.mock(|when, then| {
        when.method(POST)
            .path(format!("/api/2.0/vector-search/indexes/{INDEX_NAME}/query"));
        then.status(500).body("index exploded");
    });

    let address = spawn_app(workspace.base_url()).await;
    let client = reqwest::Client::new();

    let payload = json!({
        "messages": [{ "role": "user", "content": "How many farms are there?" }]
    });

    let response = client
        .post(format!("{address}/predict"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("index exploded"));
}

#[tokio::test]
async fn test_predict_rejects_payload_without_user_message() {
    let workspace = MockServer::start();
    let address = spawn_app(workspace.base_url()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{address}/predict"))
        .json(&json!({ "messages": [] }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}
