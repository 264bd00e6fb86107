// Core types for the media-library workflow state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::workflow::context::WorkflowContext;

/// Workflow states, in the order a successful cycle visits them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowState {
    /// Waiting for an operator to start a cycle
    Idle,
    /// Listing candidate directories under the base path
    Scanning,
    /// Verifying read/write access on every scanned directory
    CheckingFilePermissions,
    /// Selecting the files that qualify for relocation
    EvaluatingFiles,
    /// Relocating selected files into the destination library
    MovingFiles,
    /// Failures were handed to the operator; only RESTART leaves this state
    ReportingErrors,
}

impl WorkflowState {
    pub const ALL: [WorkflowState; 6] = [
        WorkflowState::Idle,
        WorkflowState::Scanning,
        WorkflowState::CheckingFilePermissions,
        WorkflowState::EvaluatingFiles,
        WorkflowState::MovingFiles,
        WorkflowState::ReportingErrors,
    ];

    /// Externally visible state name
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Scanning => "Scanning",
            WorkflowState::CheckingFilePermissions => "CheckingFilePermissions",
            WorkflowState::EvaluatingFiles => "EvaluatingFiles",
            WorkflowState::MovingFiles => "MovingFiles",
            WorkflowState::ReportingErrors => "ReportingErrors",
        }
    }

    /// The effect launched on entry, if any
    pub fn entry_effect(&self) -> Option<EffectKind> {
        match self {
            WorkflowState::Idle => None,
            WorkflowState::Scanning => Some(EffectKind::Scan),
            WorkflowState::CheckingFilePermissions => Some(EffectKind::CheckPermissions),
            WorkflowState::EvaluatingFiles => Some(EffectKind::Evaluate),
            WorkflowState::MovingFiles => Some(EffectKind::Move),
            WorkflowState::ReportingErrors => Some(EffectKind::NotifyErrors),
        }
    }

    /// Whether the entry effect's completion drives the next transition.
    /// Error notification is fire-and-forget.
    pub fn awaits_effect(&self) -> bool {
        matches!(
            self.entry_effect(),
            Some(kind) if kind != EffectKind::NotifyErrors
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operator events accepted by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowEvent {
    StartScan,
    Restart,
}

impl WorkflowEvent {
    pub const ALL: [WorkflowEvent; 2] = [WorkflowEvent::StartScan, WorkflowEvent::Restart];

    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::StartScan => "START_SCAN",
            WorkflowEvent::Restart => "RESTART",
        }
    }
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kinds of asynchronous effects the orchestrator launches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Scan,
    CheckPermissions,
    Evaluate,
    Move,
    NotifyErrors,
}

/// Input handed to a collaborator, projected from the context at state entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectRequest {
    Scan {
        base_path: String,
    },
    CheckPermissions {
        directories: Vec<String>,
    },
    Evaluate {
        directories: Vec<String>,
        accepted_file_types: BTreeSet<String>,
    },
    Move {
        files: Vec<String>,
        destination_path: String,
    },
    NotifyErrors {
        dirs_to_report: Vec<String>,
    },
}

impl EffectRequest {
    /// Project the effect input for `state` out of the current context
    pub fn for_state(state: WorkflowState, context: &WorkflowContext) -> Option<Self> {
        let request = match state.entry_effect()? {
            EffectKind::Scan => EffectRequest::Scan {
                base_path: context.base_path().to_string(),
            },
            EffectKind::CheckPermissions => EffectRequest::CheckPermissions {
                directories: context.directories_to_check().to_vec(),
            },
            EffectKind::Evaluate => EffectRequest::Evaluate {
                directories: context.dirs_to_evaluate().to_vec(),
                accepted_file_types: context.accepted_file_types().clone(),
            },
            EffectKind::Move => EffectRequest::Move {
                files: context.dirs_to_move().to_vec(),
                destination_path: context.destination_path().to_string(),
            },
            EffectKind::NotifyErrors => EffectRequest::NotifyErrors {
                dirs_to_report: context.dirs_to_report().to_vec(),
            },
        };
        Some(request)
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            EffectRequest::Scan { .. } => EffectKind::Scan,
            EffectRequest::CheckPermissions { .. } => EffectKind::CheckPermissions,
            EffectRequest::Evaluate { .. } => EffectKind::Evaluate,
            EffectRequest::Move { .. } => EffectKind::Move,
            EffectRequest::NotifyErrors { .. } => EffectKind::NotifyErrors,
        }
    }

    /// Failure outcome used when the effect times out or its task dies.
    ///
    /// A permission check that never settles reports every directory it was
    /// asked about, since none of them were verified.
    pub fn failure_outcome(&self, reason: impl Into<String>) -> Option<EffectOutcome> {
        let reason = reason.into();
        match self {
            EffectRequest::Scan { .. } => Some(EffectOutcome::ScanFailed { reason }),
            EffectRequest::CheckPermissions { directories } => {
                Some(EffectOutcome::PermissionsFailed {
                    dirs_to_report: directories.clone(),
                    reason: Some(reason),
                })
            }
            EffectRequest::Evaluate { .. } => Some(EffectOutcome::EvaluationFailed { reason }),
            EffectRequest::Move { .. } => Some(EffectOutcome::MoveFailed { reason }),
            EffectRequest::NotifyErrors { .. } => None,
        }
    }
}

/// Settled result of an effect, fed back into the machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectOutcome {
    ScanCompleted {
        directories: Vec<String>,
    },
    ScanFailed {
        reason: String,
    },
    PermissionsChecked {
        dirs_to_evaluate: Vec<String>,
        dirs_to_report: Vec<String>,
    },
    PermissionsFailed {
        dirs_to_report: Vec<String>,
        reason: Option<String>,
    },
    FilesEvaluated {
        dirs_to_move: Vec<String>,
    },
    EvaluationFailed {
        reason: String,
    },
    FilesMoved,
    MoveFailed {
        reason: String,
    },
}

impl EffectOutcome {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectOutcome::ScanCompleted { .. } | EffectOutcome::ScanFailed { .. } => {
                EffectKind::Scan
            }
            EffectOutcome::PermissionsChecked { .. } | EffectOutcome::PermissionsFailed { .. } => {
                EffectKind::CheckPermissions
            }
            EffectOutcome::FilesEvaluated { .. } | EffectOutcome::EvaluationFailed { .. } => {
                EffectKind::Evaluate
            }
            EffectOutcome::FilesMoved | EffectOutcome::MoveFailed { .. } => EffectKind::Move,
        }
    }

    pub fn status(&self) -> EffectStatus {
        match self {
            EffectOutcome::ScanCompleted { .. }
            | EffectOutcome::PermissionsChecked { .. }
            | EffectOutcome::FilesEvaluated { .. }
            | EffectOutcome::FilesMoved => EffectStatus::Done,
            EffectOutcome::ScanFailed { .. }
            | EffectOutcome::PermissionsFailed { .. }
            | EffectOutcome::EvaluationFailed { .. }
            | EffectOutcome::MoveFailed { .. } => EffectStatus::Error,
        }
    }

    /// Human-readable failure detail, if the outcome carries one
    pub fn failure_detail(&self) -> Option<String> {
        match self {
            EffectOutcome::ScanFailed { reason }
            | EffectOutcome::EvaluationFailed { reason }
            | EffectOutcome::MoveFailed { reason } => Some(reason.clone()),
            EffectOutcome::PermissionsFailed {
                dirs_to_report,
                reason,
            } => Some(match reason {
                Some(reason) => reason.clone(),
                None => format!("{} directories failed permission checks", dirs_to_report.len()),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectStatus {
    Done,
    Error,
}

/// Identifies the state occupancy an effect was launched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectTicket {
    pub generation: u64,
    pub state: WorkflowState,
}

/// What caused a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionTrigger {
    Event(WorkflowEvent),
    Effect { kind: EffectKind, status: EffectStatus },
}

/// Audit record of an applied transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: WorkflowState,
    pub to: WorkflowState,
    pub trigger: TransitionTrigger,
    pub generation: u64,
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Point-in-time view of a workflow instance for subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub workflow_id: String,
    pub state: WorkflowState,
    pub context: WorkflowContext,
    pub generation: u64,
    pub transitions_count: usize,
    pub last_transition: Option<TransitionRecord>,
    pub faulted: bool,
}

impl WorkflowSnapshot {
    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }
}
