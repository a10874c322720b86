//! Integration tests for job, log, conflict and command endpoints

use serde_json::json;
use syncpanel_agent::AgentError;
use syncpanel_core::domain::{ConflictStatus, Job};
use syncpanel_core::ports::{IAgentApi, JobCommand, LogFilter, SaveMode};
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::common;

// ============================================================================
// Jobs
// ============================================================================

#[tokio::test]
async fn test_list_jobs_splits_connectivity_markers() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_jobs(
        &server,
        json!([
            common::job_json("job-1", "Docs"),
            {"is_connected_to_internet": true},
            common::job_json("job-2", "Photos"),
            {"is_connected_to_internet": false}
        ]),
    )
    .await;

    let listing = client.list_jobs().await.expect("list jobs");
    assert_eq!(listing.jobs.len(), 2);
    assert_eq!(listing.jobs[0].label, "Docs");
    assert_eq!(listing.jobs[1].id, "job-2");
    assert_eq!(listing.internet_ok, Some(false));
}

#[tokio::test]
async fn test_list_jobs_decodes_running_state() {
    let (server, client) = common::setup_agent_mock().await;
    let mut job = common::job_json("job-1", "Docs");
    job["running"] = json!(true);
    job["state"] = json!({
        "global": {"queue_length": 10, "queue_done": 5, "eta": 12.5},
        "tasks": {"current": [], "total": 10}
    });
    job["last_event"] = json!({"type": "remote", "message": "Downloaded a.txt", "date": "today"});
    common::mount_jobs(&server, json!([job])).await;

    let listing = client.list_jobs().await.expect("list jobs");
    let job = &listing.jobs[0];
    assert!(job.running);
    let state = job.state.as_ref().expect("state");
    assert_eq!(state.global.percent(), Some(50.0));
    assert_eq!(job.last_event.as_ref().map(|e| e.kind.as_str()), Some("remote"));
}

#[tokio::test]
async fn test_jobs_by_id_sends_flag_and_fills_ids() {
    let (server, client) = common::setup_agent_mock().await;
    let mut stored = common::job_json("", "Docs");
    stored.as_object_mut().unwrap().remove("id");
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("with_id", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"job-1": stored})))
        .mount(&server)
        .await;

    let jobs = client.jobs_by_id().await.expect("jobs by id");
    assert_eq!(jobs["job-1"].id, "job-1");
    assert_eq!(jobs["job-1"].label, "Docs");
}

#[tokio::test]
async fn test_get_job_accepts_marker_listing() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(
        &server,
        "/jobs/job-1",
        200,
        json!([common::job_json("job-1", "Docs"), {"is_connected_to_internet": true}]),
    )
    .await;

    let job = client.get_job("job-1").await.expect("get job");
    assert_eq!(job.label, "Docs");
}

#[tokio::test]
async fn test_save_job_toggle_sends_flag() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("POST"))
        .and(path("/jobs"))
        .and(body_partial_json(json!({"id": "job-1", "toggle_status": true, "active": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::job_json("job-1", "Docs")))
        .expect(1)
        .mount(&server)
        .await;

    let job = Job {
        id: "job-1".into(),
        label: "Docs".into(),
        active: false,
        ..Job::default()
    };
    let saved = client
        .save_job(&job, SaveMode::ToggleStatus)
        .await
        .expect("toggle");
    assert_eq!(saved.id, "job-1");
}

#[tokio::test]
async fn test_save_job_suggest_directory() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("POST"))
        .and(path("/jobs"))
        .and(body_partial_json(json!({"test_path": true, "repoObject": {"label": "My Files"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "new",
            "directory": "/home/alice/Pydio/My Files",
            "test_path": true,
            "repoObject": {"label": "My Files"}
        })))
        .mount(&server)
        .await;

    let draft = Job {
        id: "new".into(),
        ..Job::default()
    };
    let echoed = client
        .save_job(
            &draft,
            SaveMode::SuggestDirectory {
                workspace_label: "My Files".into(),
            },
        )
        .await
        .expect("suggest directory");
    assert_eq!(echoed.directory, "/home/alice/Pydio/My Files");
}

#[tokio::test]
async fn test_delete_job() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("DELETE"))
        .and(path("/jobs/job-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_job("job-1").await.expect("delete");
}

// ============================================================================
// Logs and conflicts
// ============================================================================

#[tokio::test]
async fn test_job_logs_with_filter() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("GET"))
        .and(path("/jobs/job-1/logs"))
        .and(query_param("status", "error"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [{"type": "local", "message": "Upload failed", "date": "now", "status": "error"}],
            "running": false
        })))
        .mount(&server)
        .await;

    let filter = LogFilter {
        key: "status".into(),
        value: "error".into(),
    };
    let snapshot = client
        .job_logs("job-1", Some(&filter))
        .await
        .expect("logs");
    assert_eq!(snapshot.logs.len(), 1);
    assert!(snapshot.running.is_none());
}

#[tokio::test]
async fn test_job_conflicts_and_save() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(
        &server,
        "/jobs/job-1/conflicts",
        200,
        json!([
            {"node_id": 7, "node_path": "/a.txt", "status": "UNSOLVED", "type": "local"},
            {"node_id": 8, "node_path": "/b.txt", "status": "SOLVED:KEEPBOTH"}
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/jobs/conflicts"))
        .and(body_partial_json(json!({"node_id": "7", "status": "SOLVED:REMOTE", "job_id": "job-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut conflicts = client.job_conflicts("job-1").await.expect("conflicts");
    assert_eq!(conflicts.len(), 2);
    assert_eq!(conflicts[0].node_id, "7");
    assert!(conflicts[1].status.is_solved());

    let mut resolved = conflicts.remove(0);
    resolved.status = ConflictStatus::Solved("REMOTE".into());
    resolved.job_id = Some("job-1".into());
    client.save_conflict(&resolved).await.expect("save conflict");
}

#[tokio::test]
async fn test_save_conflict_without_job_is_rejected_locally() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(
        &server,
        "/jobs/job-1/conflicts",
        200,
        json!([{"node_id": "7", "status": "UNSOLVED"}]),
    )
    .await;

    let conflicts = client.job_conflicts("job-1").await.expect("conflicts");
    let err = client.save_conflict(&conflicts[0]).await.unwrap_err();
    assert!(matches!(err, AgentError::Rejected(_)));
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn test_send_command() {
    let (server, client) = common::setup_agent_mock().await;
    Mock::given(method("GET"))
        .and(path("/cmd/pause/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["success"])))
        .expect(1)
        .mount(&server)
        .await;

    client
        .send_command(JobCommand::Pause, "job-1")
        .await
        .expect("pause");
}

#[tokio::test]
async fn test_send_generic_command_returns_body() {
    let (server, client) = common::setup_agent_mock().await;
    common::mount_get(&server, "/cmd/check_update", 200, json!({"update": false})).await;

    let body = client
        .send_generic_command("check_update")
        .await
        .expect("generic command");
    assert_eq!(body["update"], false);
}
