//! Syncpanel Core - Domain model and agent port for the sync control panel
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Job`, `LogsSnapshot`, `Conflict`, `FolderNode`, `Workspace`, `ShareRequest`
//! - **Use cases** - `CreateJobUseCase`, `ManageJobUseCase`, `ResolveConflictsUseCase`,
//!   `ListWorkspacesUseCase`, `ResolveEndpointUseCase`
//! - **Port definitions** - `IAgentApi`, the single seam to the local sync agent
//! - **Configuration** - YAML-backed [`config::Config`]
//!
//! # Architecture
//!
//! The domain module contains pure data and merge rules with no I/O.
//! Ports define the trait the HTTP adapter implements.
//! Use cases orchestrate domain entities through the port.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
