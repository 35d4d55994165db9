//! Integration tests for health, static files and admin endpoints

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::configuration::get_configuration;
use chirpy::startup::run;
use chirpy::state::AppState;
use chirpy::store::InMemoryStore;
use serde_json::{json, Value};

fn spawn_app(platform: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.application.platform = platform.to_string();
    configuration.database.in_memory = true;

    let state = AppState::new(&configuration, Arc::new(InMemoryStore::new()));
    let server = run(listener, state).expect("Failed to create server");
    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app("dev");

    let response = reqwest::Client::new()
        .get(&format!("{}/api/healthz", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn file_server_hits_are_counted() {
    let addr = spawn_app("dev");
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let response = client
            .get(&format!("{}/app/", addr))
            .send()
            .await
            .expect("Failed to execute request");
        assert!(response.status().is_success());
    }

    let body = client
        .get(&format!("{}/admin/metrics", addr))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap();

    assert!(body.contains("Chirpy has been visited 3 times!"));
}

#[tokio::test]
async fn reset_clears_hits_and_users_on_dev() {
    let addr = spawn_app("dev");
    let client = reqwest::Client::new();

    client.get(&format!("{}/app/", addr)).send().await.unwrap();
    let created = client
        .post(&format!("{}/api/users", addr))
        .json(&json!({"email": "a@b.com", "password": "pw1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(201, created.status().as_u16());

    let response = client
        .post(&format!("{}/admin/reset", addr))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let metrics = client
        .get(&format!("{}/admin/metrics", addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("visited 0 times"));

    // the same email can be registered again
    let again = client
        .post(&format!("{}/api/users", addr))
        .json(&json!({"email": "a@b.com", "password": "pw1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(201, again.status().as_u16());
}

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let addr = spawn_app("production");

    let response = reqwest::Client::new()
        .post(&format!("{}/admin/reset", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(403, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body.get("error").is_some());
}
