use thiserror::Error;

use crate::workflow::types::WorkflowState;

/// Errors surfaced at the orchestrator boundary
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Workflow orchestrator is no longer running")]
    OrchestratorStopped,

    #[error("Workflow faulted in state {state}: {reason}")]
    Faulted { state: WorkflowState, reason: String },

    #[error("Invalid workflow configuration: {0}")]
    Config(String),
}

/// Rejection payload of a permission check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} directories failed permission checks", .dirs_to_report.len())]
pub struct PermissionFailure {
    pub dirs_to_report: Vec<String>,
}

impl PermissionFailure {
    pub fn new(dirs_to_report: Vec<String>) -> Self {
        Self { dirs_to_report }
    }
}
