//! Shared test helpers for agent integration tests
//!
//! Each helper mounts mock endpoints on a wiremock server and returns an
//! AgentClient pointing at it.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use syncpanel_agent::AgentClient;

/// Starts a mock agent and returns a client pointing at it.
pub async fn setup_agent_mock() -> (MockServer, AgentClient) {
    let server = MockServer::start().await;
    let client = AgentClient::new(&server.uri()).expect("mock server URI is a valid base URL");
    (server, client)
}

/// A job as the agent serializes it.
pub fn job_json(id: &str, label: &str) -> Value {
    json!({
        "id": id,
        "label": label,
        "server": "https://files.example.com",
        "user": "alice",
        "directory": format!("/home/alice/Sync/{label}"),
        "workspace": "my-files",
        "remote_folder": "/",
        "direction": "bi",
        "solve": "manual",
        "active": true,
        "frequency": "auto",
        "start_time": {"h": 0, "m": 0},
        "trust_ssl": false,
        "filters": {
            "includes": ["*"],
            "excludes": [".*", "*/.*"]
        },
        "timeout": 20,
        "poolsize": 4,
        "running": false
    })
}

/// Mounts `GET /jobs` returning the given body.
pub async fn mount_jobs(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts a `GET` endpoint returning `status` with a JSON body.
pub async fn mount_get(server: &MockServer, route: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}
