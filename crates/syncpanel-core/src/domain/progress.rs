//! Transfer progress snapshots reported by the agent
//!
//! The same shape is used for a job's `state` and for the `running` part of
//! a logs response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Queue-wide counters for a running job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalProgress {
    /// Number of operations queued in the current run
    pub queue_length: f64,
    /// Number of queued operations already processed
    pub queue_done: f64,
    /// Last measured transfer rate in bytes per second
    pub last_transfer_rate: f64,
    /// Estimated seconds until the queue is drained
    pub eta: f64,
    /// Seconds elapsed since the run started
    pub total_time: f64,
    /// Non-zero while the agent is still indexing changes
    pub status_indexing: i64,
    /// Total bytes left in the queue
    pub queue_bytesize: i64,
    pub queue_start_time: f64,
}

impl GlobalProgress {
    /// Percentage of the queue processed, or `None` when the queue is empty.
    pub fn percent(&self) -> Option<f64> {
        if self.queue_length <= 0.0 {
            return None;
        }
        Some(100.0 * self.queue_done / self.queue_length)
    }

    /// True once every queued operation has been processed.
    pub fn is_drained(&self) -> bool {
        self.queue_length > 0.0 && self.queue_done >= self.queue_length
    }
}

/// A single in-flight transfer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskProgress {
    /// Path of the item being transferred
    pub target: Option<String>,
    /// `local` or `remote`
    pub location: Option<String>,
    /// Operation kind (`create`, `delete`, `path`, ...)
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub total_size: Option<u64>,
    pub bytesize: Option<u64>,
    pub bytes_sent: Option<u64>,
    pub total_bytes_sent: Option<u64>,
    /// Per-file progress percentage
    pub progress: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Currently running transfers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSet {
    pub current: Vec<TaskProgress>,
    pub total: u64,
}

/// Progress snapshot of a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobState {
    pub global: GlobalProgress,
    pub tasks: TaskSet,
}

/// Snapshot of the task currently running for a job, as reported with its logs.
pub type RunningState = JobState;
