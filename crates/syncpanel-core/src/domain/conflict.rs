//! Conflict entities
//!
//! A conflict is a file whose local and remote versions diverged. The agent
//! detects them; the panel only lists them and records the user's choice.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{errors::DomainError, wire};

const UNSOLVED: &str = "UNSOLVED";
const SOLVED_PREFIX: &str = "SOLVED:";

/// Resolution status of a conflict as stored by the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConflictStatus {
    /// Waiting for a decision
    Unsolved,
    /// Settled with the given policy (`KEEPLOCAL`, `KEEPREMOTE`, `KEEPBOTH`, ...)
    Solved(String),
    /// Any other status the agent reports, kept verbatim
    Other(String),
}

impl ConflictStatus {
    pub fn is_solved(&self) -> bool {
        matches!(self, ConflictStatus::Solved(_))
    }

    /// Strict parse for user input: only `UNSOLVED` and `SOLVED:<POLICY>`.
    pub fn parse_resolution(s: &str) -> Result<Self, DomainError> {
        match Self::from(s.to_string()) {
            ConflictStatus::Solved(policy) if policy.is_empty() => {
                Err(DomainError::InvalidConflictStatus(s.to_string()))
            }
            ConflictStatus::Other(_) => Err(DomainError::InvalidConflictStatus(s.to_string())),
            status => Ok(status),
        }
    }
}

impl From<String> for ConflictStatus {
    fn from(raw: String) -> Self {
        if raw == UNSOLVED {
            ConflictStatus::Unsolved
        } else if let Some(policy) = raw.strip_prefix(SOLVED_PREFIX) {
            ConflictStatus::Solved(policy.to_string())
        } else {
            ConflictStatus::Other(raw)
        }
    }
}

impl From<ConflictStatus> for String {
    fn from(status: ConflictStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for ConflictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictStatus::Unsolved => write!(f, "{}", UNSOLVED),
            ConflictStatus::Solved(policy) => write!(f, "{}{}", SOLVED_PREFIX, policy),
            ConflictStatus::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl FromStr for ConflictStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_resolution(s)
    }
}

/// Which side the conflicting change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSide {
    Local,
    Remote,
    #[serde(other)]
    Unknown,
}

/// A file whose local and remote versions diverged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(deserialize_with = "wire::string_or_number")]
    pub node_id: String,
    #[serde(default)]
    pub node_path: String,
    pub status: ConflictStatus,
    /// Set when the resolution is sent back to the agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub side: Option<ConflictSide>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Selects which conflicts a resolution applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveTarget {
    /// Every conflict with this node id
    Node(String),
    /// Every conflict that is not already solved
    AllUnsolved,
}

/// The conflicts currently listed for one job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictSet {
    job_id: String,
    conflicts: Vec<Conflict>,
}

impl ConflictSet {
    pub fn new(job_id: impl Into<String>, conflicts: Vec<Conflict>) -> Self {
        Self {
            job_id: job_id.into(),
            conflicts,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn unsolved_count(&self) -> usize {
        self.conflicts.iter().filter(|c| !c.status.is_solved()).count()
    }

    /// Applies `status` to the targeted conflicts.
    ///
    /// Returns copies of the updated records, tagged with the job id, ready
    /// to be saved one by one.
    pub fn resolve(&mut self, target: &ResolveTarget, status: &ConflictStatus) -> Vec<Conflict> {
        let job_id = self.job_id.clone();
        self.conflicts
            .iter_mut()
            .filter(|c| match target {
                ResolveTarget::Node(id) => &c.node_id == id,
                ResolveTarget::AllUnsolved => !c.status.is_solved(),
            })
            .map(|c| {
                c.status = status.clone();
                c.job_id = Some(job_id.clone());
                c.clone()
            })
            .collect()
    }
}
