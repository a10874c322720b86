//! Workspaces, folders, endpoint resolution and sharing

use serde_json::json;
use syncpanel_agent::AgentError;
use syncpanel_core::domain::ShareRequest;
use syncpanel_core::ports::{FolderQuery, IAgentApi, RemoteTarget, ServerCredentials};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::common;

fn credentials() -> ServerCredentials {
    ServerCredentials {
        url: "https://files.example.com".into(),
        user: "alice".into(),
        password: Some("secret".into()),
        trust_ssl: false,
    }
}

#[tokio::test]
async fn test_list_workspaces_with_credentials() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("GET"))
        .and(path("/ws/request"))
        .and(query_param("url", "https://files.example.com"))
        .and(query_param("user", "alice"))
        .and(query_param("password", "secret"))
        .and(query_param("trust_ssl", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "application_title": "Files",
            "user_display_name": "Alice",
            "repositories": {"repo": {
                "@repositorySlug": "my-files",
                "label": "My Files",
                "@access_type": "fs",
                "@meta_syncable_REPO_SYNCABLE": "true"
            }}
        })))
        .mount(&server)
        .await;

    let listing = client
        .list_workspaces(&RemoteTarget::Request(credentials()))
        .await
        .expect("workspaces");
    assert_eq!(listing.user_display_name.as_deref(), Some("Alice"));
    let syncable = listing.syncable();
    assert_eq!(syncable.len(), 1);
    assert_eq!(syncable[0].badge(), "MF");
}

#[tokio::test]
async fn test_list_workspaces_for_job() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(
        &server,
        "/ws/job-1",
        200,
        json!({"repositories": {"repo": []}}),
    )
    .await;

    let listing = client
        .list_workspaces(&RemoteTarget::Job("job-1".into()))
        .await
        .expect("workspaces");
    assert!(listing.repositories.repo.is_empty());
}

#[tokio::test]
async fn test_list_folders_with_subdir() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("GET"))
        .and(path("/folders/request"))
        .and(query_param("ws", "my-files"))
        .and(query_param("subdir", "/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"@filename": "/projects/2024", "@text": "2024"},
            {"@filename": "/projects/2025", "@text": "2025", "tree": []}
        ])))
        .mount(&server)
        .await;

    let nodes = client
        .list_folders(&FolderQuery {
            target: RemoteTarget::Request(credentials()),
            workspace: "my-files".into(),
            subdir: Some("/projects".into()),
        })
        .await
        .expect("folders");
    assert_eq!(nodes.len(), 2);
    assert!(!nodes[0].is_loaded());
    assert!(nodes[1].is_loaded());
}

#[tokio::test]
async fn test_list_folders_error_payload() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(
        &server,
        "/folders/job-1",
        200,
        json!([{"error": "Cannot load workspace"}]),
    )
    .await;

    let err = client
        .list_folders(&FolderQuery {
            target: RemoteTarget::Job("job-1".into()),
            workspace: String::new(),
            subdir: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Cannot load workspace");
    assert!(matches!(err, AgentError::Server { .. }));
}

#[tokio::test]
async fn test_resolve_client_id() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(
        &server,
        "/resolve/acme",
        200,
        json!({"endpoints": [{"url": "https://acme.example.com"}], "vanity": {"title": "Acme"}}),
    )
    .await;

    let resolved = client.resolve_client_id("acme").await.expect("resolve");
    assert_eq!(resolved.primary_url(), Some("https://acme.example.com"));
}

#[tokio::test]
async fn test_share_check_and_create() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("GET"))
        .and(path("/share/job-1"))
        .and(query_param("checkExistingLinkFlag", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "link": "", "existingLinkFlag": "false"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/share/job-1"))
        .and(query_param("action", "share"))
        .and(query_param("ws_label", "report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "link": "https://files.example.com/s/abc"
        })))
        .mount(&server)
        .await;

    let existing = client
        .check_existing_share("job-1", "docs/report.pdf")
        .await
        .expect("check share");
    assert!(!existing.existing);

    let link = client
        .share("job-1", &ShareRequest::new("docs/report.pdf"))
        .await
        .expect("share");
    assert!(link.is_url());
}

#[tokio::test]
async fn test_unshare() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("GET"))
        .and(path("/share/job-1"))
        .and(query_param("action", "unshare"))
        .and(query_param("path", "docs/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .unshare("job-1", "docs/report.pdf")
        .await
        .expect("unshare");
}
