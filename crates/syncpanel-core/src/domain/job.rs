//! Sync job entity
//!
//! A [`Job`] is one configured synchronization task between a local
//! directory and a folder of a remote workspace. Jobs are owned by the
//! agent; the panel keeps a reconciled copy that is refreshed by polling
//! and edited locally until saved.

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{errors::DomainError, log::LogEntry, progress::JobState, wire};

/// Placeholder id carried by a job that has not been saved yet
pub const DRAFT_JOB_ID: &str = "new";

/// Glob patterns synchronized by default
pub const DEFAULT_INCLUDES: &[&str] = &["*"];

/// Glob patterns ignored by default
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".*",
    "*/.*",
    "/recycle_bin*",
    "*.pydio_dl",
    "*.DS_Store",
    ".~lock.*",
    "~*",
    "*.xlk",
    "*.tmp",
];

/// Names of the fields a user may edit on an existing job
pub const EDITABLE_FIELDS: &[&str] = &[
    "label",
    "server",
    "user",
    "password",
    "directory",
    "workspace",
    "frequency",
    "timeout",
    "poolsize",
    "direction",
    "solve",
    "trust_ssl",
];

// ============================================================================
// Enumerations
// ============================================================================

/// Which way changes flow between the local directory and the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Local changes are pushed only
    Up,
    /// Remote changes are pulled only
    Down,
    /// Both ways
    #[default]
    Bi,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Bi => "bi",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "bi" => Ok(Direction::Bi),
            other => Err(DomainError::ValidationFailed(format!(
                "unknown direction '{other}' (expected up, down or bi)"
            ))),
        }
    }
}

/// How the agent settles conflicts for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolvePolicy {
    /// Conflicts wait for the user
    #[default]
    Manual,
    /// The local version wins
    Local,
    /// The remote version wins
    Remote,
    /// Both versions are kept
    Both,
}

impl fmt::Display for SolvePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolvePolicy::Manual => "manual",
            SolvePolicy::Local => "local",
            SolvePolicy::Remote => "remote",
            SolvePolicy::Both => "both",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SolvePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(SolvePolicy::Manual),
            "local" => Ok(SolvePolicy::Local),
            "remote" => Ok(SolvePolicy::Remote),
            "both" => Ok(SolvePolicy::Both),
            other => Err(DomainError::ValidationFailed(format!(
                "unknown conflict policy '{other}' (expected manual, local, remote or both)"
            ))),
        }
    }
}

/// Time of day used by scheduled jobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTime {
    pub h: u32,
    pub m: u32,
}

/// Include/exclude glob patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilters {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl Default for JobFilters {
    fn default() -> Self {
        Self {
            includes: DEFAULT_INCLUDES.iter().map(|s| s.to_string()).collect(),
            excludes: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_frequency() -> String {
    "auto".to_string()
}

fn default_timeout() -> u32 {
    20
}

fn default_poolsize() -> u32 {
    4
}

// ============================================================================
// Job
// ============================================================================

/// A configured sync task
///
/// Fields the agent sends that are not modelled here are kept in
/// [`Job::extra`] so that a round trip through the panel never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Agent-issued identifier, or [`DRAFT_JOB_ID`] for an unsaved draft
    #[serde(default, deserialize_with = "wire::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Base URL of the remote file server
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub user: String,
    /// Only present while the user is entering credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Local directory
    #[serde(default)]
    pub directory: String,
    /// Remote workspace slug
    #[serde(default)]
    pub workspace: String,
    #[serde(default)]
    pub remote_folder: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub solve: SolvePolicy,
    #[serde(default = "default_true", deserialize_with = "wire::lenient_bool")]
    pub active: bool,
    /// `auto`, `manual` or `time`
    #[serde(default = "default_frequency")]
    pub frequency: String,
    #[serde(default)]
    pub start_time: StartTime,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub trust_ssl: bool,
    #[serde(default)]
    pub filters: JobFilters,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    /// Number of parallel transfers
    #[serde(default = "default_poolsize")]
    pub poolsize: u32,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub running: bool,
    #[serde(
        default,
        deserialize_with = "wire::false_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<JobState>,
    #[serde(
        default,
        deserialize_with = "wire::false_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_event: Option<LogEntry>,
    /// Computed client side from `state`; never sent to the agent
    #[serde(skip)]
    pub progress: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Job {
    fn default() -> Self {
        Self {
            id: String::new(),
            label: String::new(),
            server: String::new(),
            user: String::new(),
            password: None,
            directory: String::new(),
            workspace: String::new(),
            remote_folder: String::new(),
            direction: Direction::default(),
            solve: SolvePolicy::default(),
            active: true,
            frequency: default_frequency(),
            start_time: StartTime::default(),
            trust_ssl: false,
            filters: JobFilters::default(),
            timeout: default_timeout(),
            poolsize: default_poolsize(),
            running: false,
            state: None,
            last_event: None,
            progress: None,
            extra: Map::new(),
        }
    }
}

/// The user-editable subset of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableFields {
    pub label: String,
    pub server: String,
    pub user: String,
    pub password: Option<String>,
    pub directory: String,
    pub workspace: String,
    pub frequency: String,
    pub timeout: u32,
    pub poolsize: u32,
    pub direction: Direction,
    pub solve: SolvePolicy,
    pub trust_ssl: bool,
}

impl Job {
    /// True for a draft that the agent has not assigned an id to yet.
    pub fn is_draft(&self) -> bool {
        self.id.is_empty() || self.id == DRAFT_JOB_ID
    }

    /// Percentage of the current run that is done, if a run is in progress.
    pub fn progress_percent(&self) -> Option<f64> {
        self.state.as_ref().and_then(|s| s.global.percent())
    }

    /// Copies only the server-authoritative fields from `server`.
    ///
    /// Used for the job the user is currently looking at or editing: status,
    /// last event and running snapshot follow the agent while label,
    /// credentials, filters and the rest stay as the user left them.
    /// `progress` is recomputed when the job is running; an empty queue
    /// leaves the previous value in place.
    pub fn absorb_status(&mut self, server: &Job) -> bool {
        let before = (
            self.state.clone(),
            self.last_event.clone(),
            self.running,
            self.progress,
        );

        self.state = server.state.clone();
        self.last_event = server.last_event.clone();
        self.running = server.running;
        if self.running {
            if let Some(percent) = self.progress_percent() {
                self.progress = Some(percent);
            }
        }

        before != (self.state.clone(), self.last_event.clone(), self.running, self.progress)
    }

    /// Merges every data field of `server` into this job, key by key.
    ///
    /// Optional fields the agent omitted (such as the password) keep their
    /// local value; unknown fields are overlaid one key at a time. Returns
    /// true when anything changed.
    pub fn merge_from(&mut self, server: &Job) -> bool {
        let before = self.clone();

        self.id.clone_from(&server.id);
        self.label.clone_from(&server.label);
        self.server.clone_from(&server.server);
        self.user.clone_from(&server.user);
        if server.password.is_some() {
            self.password.clone_from(&server.password);
        }
        self.directory.clone_from(&server.directory);
        self.workspace.clone_from(&server.workspace);
        self.remote_folder.clone_from(&server.remote_folder);
        self.direction = server.direction;
        self.solve = server.solve;
        self.active = server.active;
        self.frequency.clone_from(&server.frequency);
        self.start_time = server.start_time;
        self.trust_ssl = server.trust_ssl;
        self.filters.clone_from(&server.filters);
        self.timeout = server.timeout;
        self.poolsize = server.poolsize;
        self.running = server.running;
        self.state.clone_from(&server.state);
        self.last_event.clone_from(&server.last_event);
        for (key, value) in &server.extra {
            self.extra.insert(key.clone(), value.clone());
        }

        *self != before
    }

    /// Snapshot of the user-editable fields.
    pub fn editable(&self) -> EditableFields {
        EditableFields {
            label: self.label.clone(),
            server: self.server.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            directory: self.directory.clone(),
            workspace: self.workspace.clone(),
            frequency: self.frequency.clone(),
            timeout: self.timeout,
            poolsize: self.poolsize,
            direction: self.direction,
            solve: self.solve,
            trust_ssl: self.trust_ssl,
        }
    }

    /// Overwrites the user-editable fields.
    pub fn apply_editable(&mut self, fields: EditableFields) {
        self.label = fields.label;
        self.server = fields.server;
        self.user = fields.user;
        self.password = fields.password;
        self.directory = fields.directory;
        self.workspace = fields.workspace;
        self.frequency = fields.frequency;
        self.timeout = fields.timeout;
        self.poolsize = fields.poolsize;
        self.direction = fields.direction;
        self.solve = fields.solve;
        self.trust_ssl = fields.trust_ssl;
    }

    /// True when `other` synchronizes the same remote folder into the same
    /// local directory under a different id.
    pub fn targets_same_as(&self, other: &Job) -> bool {
        self.id != other.id
            && self.server.trim_end_matches('/') == other.server.trim_end_matches('/')
            && self.workspace == other.workspace
            && self.remote_folder == other.remote_folder
            && self.directory == other.directory
    }
}

// ============================================================================
// JobList
// ============================================================================

/// Body of `GET /jobs`
///
/// The agent interleaves `{"is_connected_to_internet": bool}` markers with the
/// job objects; they are split out here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobList {
    pub jobs: Vec<Job>,
    /// Last connectivity marker seen in the listing, if any
    pub internet_ok: Option<bool>,
}

impl JobList {
    /// Splits a raw listing into jobs and connectivity markers.
    pub fn from_values(values: Vec<Value>) -> Result<Self, serde_json::Error> {
        let mut list = JobList::default();
        for value in values {
            if let Some(flag) = connectivity_marker(&value) {
                list.internet_ok = Some(flag);
                continue;
            }
            list.jobs.push(serde_json::from_value(value)?);
        }
        Ok(list)
    }

    /// Index of the job with the given id.
    pub fn position(&self, job_id: &str) -> Option<usize> {
        self.jobs.iter().position(|j| j.id == job_id)
    }
}

fn connectivity_marker(value: &Value) -> Option<bool> {
    let obj = value.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    obj.get("is_connected_to_internet").and_then(Value::as_bool)
}

/// Body of `GET /jobs?with_id=true`: the persisted configuration keyed by id
pub type JobsById = HashMap<String, Job>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::progress::GlobalProgress;

    fn running_state(done: f64, length: f64) -> JobState {
        JobState {
            global: GlobalProgress {
                queue_done: done,
                queue_length: length,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn sample_job() -> Job {
        Job {
            id: "srv-my-files".into(),
            label: "My files".into(),
            server: "https://files.example.com".into(),
            user: "alice".into(),
            directory: "/home/alice/Sync".into(),
            workspace: "my-files".into(),
            remote_folder: "/".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_agent_job() {
        let value = json!({
            "id": "192.168.0.64-my-files",
            "label": "Work",
            "server": "http://192.168.0.64",
            "user": "admin",
            "directory": "/home/u/Work",
            "workspace": "my-files",
            "remote_folder": "/flash dat",
            "direction": "bi",
            "solve": "both",
            "active": false,
            "frequency": "auto",
            "start_time": {"h": 0, "m": 0},
            "trust_ssl": false,
            "filters": {"includes": ["*"], "excludes": [".*"]},
            "timeout": 20,
            "poolsize": 4,
            "hide_up_dir": "false",
            "monitor": true,
            "running": false
        });
        let job: Job = serde_json::from_value(value).unwrap();
        assert_eq!(job.solve, SolvePolicy::Both);
        assert!(!job.active);
        assert!(job.state.is_none());
        assert_eq!(job.extra.get("monitor"), Some(&json!(true)));
        assert_eq!(job.extra.get("hide_up_dir"), Some(&json!("false")));
    }

    #[test]
    fn test_defaults_match_agent_defaults() {
        let job: Job = serde_json::from_value(json!({"id": "x"})).unwrap();
        assert_eq!(job.direction, Direction::Bi);
        assert_eq!(job.solve, SolvePolicy::Manual);
        assert!(job.active);
        assert_eq!(job.frequency, "auto");
        assert_eq!(job.timeout, 20);
        assert_eq!(job.poolsize, 4);
        assert_eq!(job.filters.includes, vec!["*"]);
        assert!(job.filters.excludes.contains(&"*.DS_Store".to_string()));
    }

    #[test]
    fn test_serialize_skips_client_only_fields() {
        let mut job = sample_job();
        job.progress = Some(42.0);
        let value = serde_json::to_value(&job).unwrap();
        assert!(value.get("progress").is_none());
        assert!(value.get("password").is_none());
        assert!(value.get("state").is_none());
    }

    #[test]
    fn test_absorb_status_keeps_user_edits() {
        let mut selected = sample_job();
        selected.label = "Edited label".into();

        let mut server = sample_job();
        server.running = true;
        server.state = Some(running_state(5.0, 10.0));
        server.last_event = Some(LogEntry {
            message: "Uploaded a.txt".into(),
            ..Default::default()
        });

        assert!(selected.absorb_status(&server));
        assert_eq!(selected.label, "Edited label");
        assert_eq!(selected.progress, Some(50.0));
        assert!(selected.running);
        assert_eq!(
            selected.last_event.as_ref().map(|e| e.message.as_str()),
            Some("Uploaded a.txt")
        );
    }

    #[test]
    fn test_absorb_status_empty_queue_keeps_progress() {
        let mut selected = sample_job();
        selected.progress = Some(30.0);

        let mut server = sample_job();
        server.running = true;
        server.state = Some(running_state(0.0, 0.0));

        selected.absorb_status(&server);
        assert_eq!(selected.progress, Some(30.0));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut local = sample_job();
        let mut server = sample_job();
        server.label = "Renamed".into();
        server.extra.insert("monitor".into(), json!(false));

        assert!(local.merge_from(&server));
        assert!(!local.merge_from(&server));
        assert_eq!(local.label, "Renamed");
    }

    #[test]
    fn test_merge_keeps_local_password() {
        let mut local = sample_job();
        local.password = Some("secret".into());
        let server = sample_job();

        local.merge_from(&server);
        assert_eq!(local.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_editable_roundtrip_restores_fields() {
        let original = sample_job();
        let mut edited = original.clone();
        edited.label = "Changed".into();
        edited.poolsize = 8;
        assert_ne!(edited.editable(), original.editable());

        edited.apply_editable(original.editable());
        assert_eq!(edited.editable(), original.editable());
    }

    #[test]
    fn test_targets_same_as_ignores_trailing_slash() {
        let a = sample_job();
        let mut b = sample_job();
        b.id = "other".into();
        b.server = "https://files.example.com/".into();
        assert!(a.targets_same_as(&b));

        b.directory = "/elsewhere".into();
        assert!(!a.targets_same_as(&b));
    }

    #[test]
    fn test_job_list_splits_connectivity_markers() {
        let values = vec![
            json!({"id": "a", "label": "A"}),
            json!({"is_connected_to_internet": true}),
            json!({"id": "b", "label": "B"}),
            json!({"is_connected_to_internet": false}),
        ];
        let list = JobList::from_values(values).unwrap();
        assert_eq!(list.jobs.len(), 2);
        assert_eq!(list.internet_ok, Some(false));
        assert_eq!(list.position("b"), Some(1));
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
