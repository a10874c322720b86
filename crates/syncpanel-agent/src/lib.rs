//! Syncpanel Agent - HTTP adapter for the local sync agent
//!
//! Implements the [`IAgentApi`](syncpanel_core::ports::IAgentApi) port over
//! the agent's REST API with `reqwest`.
//!
//! ## Modules
//!
//! - [`client`] - HTTP plumbing: URL construction, auth, error classification
//! - [`api`] - The port implementation, one method per agent resource

pub mod api;
pub mod client;

pub use client::AgentClient;
pub use syncpanel_core::ports::{AgentError, AgentResult};
