//! Error types.
//!
//! Steady-state ticking does not produce errors for ordinary transitions
//! (a container drifting out of the volume, a block already gone); those
//! are guard conditions handled in place. `DockError` covers rejected
//! commands and the few conditions that end an assembly's run.

use crate::ids::{AssemblyId, ToolId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DockError {
    /// A disable was requested and has not been committed yet.
    #[error("{0} has a disable pending; retry after the next tick")]
    DisablePending(AssemblyId),
    /// The assembly lost its anchor and can no longer operate.
    #[error("{0} is invalid")]
    InvalidAssembly(AssemblyId),
    #[error("no assembly with id {0}")]
    UnknownAssembly(AssemblyId),
    /// A tool block vanished or was switched off mid-processing.
    #[error("{0} is no longer usable")]
    ToolUnavailable(ToolId),
    #[error("an assembly needs at least two tools, got {0}")]
    TooFewTools(usize),
    #[error("beam count {requested} outside 1..={max}")]
    BeamCountOutOfRange { requested: usize, max: usize },
    #[error("speed multiplier {0} must be positive and finite")]
    InvalidMultiplier(f32),
}

/// Failure loading a [`crate::config::DockConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {}", format_issues(.0))]
    Invalid(Vec<crate::config::ConfigIssue>),
}

fn format_issues(issues: &[crate::config::ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{:?}", i))
        .collect::<Vec<_>>()
        .join(", ")
}
