//! Error classification: unreachable agent versus error responses

use serde_json::json;
use syncpanel_agent::{AgentClient, AgentError};
use syncpanel_core::ports::{IAgentApi, UNREACHABLE_MESSAGE};
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use crate::common;

#[tokio::test]
async fn test_connection_refused_is_connectivity_failure() {
    // Reserve a free port, then release it so nothing listens there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let client = AgentClient::new(&format!("http://127.0.0.1:{port}")).expect("valid URL");
    let err = client.list_jobs().await.unwrap_err();
    assert!(err.is_connectivity(), "expected unreachable, got {err:?}");
    assert_eq!(err.user_message(), UNREACHABLE_MESSAGE);
}

#[tokio::test]
async fn test_error_status_carries_message() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(
        &server,
        "/ws/request",
        401,
        json!({"error": "Check your login and password"}),
    )
    .await;

    let target = syncpanel_core::ports::RemoteTarget::Request(Default::default());
    let err = client.list_workspaces(&target).await.unwrap_err();
    assert!(!err.is_connectivity());
    match err {
        AgentError::Server { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Check your login and password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("GET"))
        .and(path("/jobs/missing/logs"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("Can't find any job config with this ID."),
        )
        .mount(&server)
        .await;

    let err = client.job_logs("missing", None).await.unwrap_err();
    assert_eq!(err.user_message(), "Can't find any job config with this ID.");
}

#[tokio::test]
async fn test_embedded_error_with_success_status() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(&server, "/jobs/ghost", 200, json!({"error": "Cannot find job"})).await;

    let err = client.get_job("ghost").await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::Server { status: 200, ref message } if message == "Cannot find job"
    ));
}

#[tokio::test]
async fn test_undecodable_body_is_invalid_response() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client.list_jobs().await.unwrap_err();
    assert!(matches!(err, AgentError::InvalidResponse(_)));
    assert!(!err.is_connectivity());
}
