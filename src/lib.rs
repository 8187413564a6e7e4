//! ClickUp issue-tracker integration.
//!
//! Links a version-control client's issue panel to ClickUp: resolves tasks
//! by id, lists pending work, marks tasks in progress, and maps branch
//! names to task identifiers via a configured prefix.
//!
//! Modules:
//! - config: host-persisted parameter schema and reconciliation
//! - branch: branch-name to task-id resolution
//! - clickup: authenticated client for the ClickUp REST API v2
//! - extension: the synchronous façade the host drives

pub mod branch;
pub mod clickup;
pub mod config;
pub mod extension;
pub mod types;

pub use clickup::{ClickUpClient, ClickUpError, ClickUpUser, PlaintextToken, TokenDecryptor};
pub use config::{ConfigParameter, ParameterKind, TrackerConfiguration, WorkingMode};
pub use extension::ClickUpExtension;
pub use types::Task;
