//! Per-job transfer history

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{progress::RunningState, wire};

/// One event recorded by the agent for a job
///
/// Entries are immutable once received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    /// Event kind as reported by the agent (`local`, `remote`, `sync`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub date: String,
    pub status: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    /// The event time; the agent writes local time with optional microseconds.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.date.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()
    }

    /// `date` at second precision, or as received when it does not parse.
    pub fn display_date(&self) -> String {
        match self.timestamp() {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.date.clone(),
        }
    }
}

/// Body of `GET /jobs/:job_id/logs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogsSnapshot {
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    /// `None` when the agent reports `running: false`
    #[serde(default, deserialize_with = "wire::false_as_none")]
    pub running: Option<RunningState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_idle_logs() {
        let json = r#"{"logs": [{"type": "remote", "message": "Downloaded a.txt",
            "date": "2016-06-27 14:02:11", "status": "success", "id": 12}], "running": false}"#;
        let snapshot: LogsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.logs.len(), 1);
        assert_eq!(snapshot.logs[0].kind, "remote");
        assert_eq!(snapshot.logs[0].extra.get("id"), Some(&Value::from(12)));
        assert!(snapshot.running.is_none());
    }

    #[test]
    fn test_display_date_drops_microseconds() {
        let entry = LogEntry {
            date: "2016-06-27 14:02:11.532117".into(),
            ..Default::default()
        };
        assert_eq!(entry.display_date(), "2016-06-27 14:02:11");
        assert!(entry.timestamp().is_some());

        let odd = LogEntry {
            date: "yesterday".into(),
            ..Default::default()
        };
        assert!(odd.timestamp().is_none());
        assert_eq!(odd.display_date(), "yesterday");
    }

    #[test]
    fn test_parse_running_logs() {
        let json = r#"{"logs": [], "running": {"global": {"queue_length": 4, "queue_done": 1},
            "tasks": {"current": [], "total": 4}}}"#;
        let snapshot: LogsSnapshot = serde_json::from_str(json).unwrap();
        let running = snapshot.running.expect("running state");
        assert_eq!(running.global.percent(), Some(25.0));
    }
}
