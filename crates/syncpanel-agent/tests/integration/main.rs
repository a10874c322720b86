//! Integration tests for syncpanel-agent
//!
//! Uses wiremock to simulate the sync agent and verifies request shapes,
//! response decoding and error classification of the AgentClient.

mod common;

mod test_failures;
mod test_jobs;
mod test_remote;
mod test_settings;
