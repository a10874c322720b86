//! Port definitions (hexagonal architecture interfaces)
//!
//! - [`IAgentApi`] - The sync agent's HTTP API

pub mod agent_api;

pub use agent_api::{
    AgentError, AgentResult, FolderQuery, IAgentApi, JobCommand, LogFilter, RemoteTarget,
    SaveMode, ServerCredentials, UNREACHABLE_MESSAGE,
};
