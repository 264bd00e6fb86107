//! Media-library maintenance workflow
//!
//! A cycle runs `idle → Scanning → CheckingFilePermissions → EvaluatingFiles →
//! MovingFiles → idle`. Any failure lands in `ReportingErrors`, which notifies
//! the operator once and waits for an explicit `RESTART`.
//!
//! # Layout
//!
//! - [`types`]: states, events, effect requests and outcomes, audit records
//! - [`context`]: the data carried between states
//! - [`transitions`]: the pure transition table
//! - [`state_machine`]: state, generation counter and history for one instance
//! - [`traits`] / [`effects`]: collaborator contracts and their execution
//! - [`orchestrator`]: the async driver and the caller-facing handle

pub mod context;
pub mod effects;
pub mod errors;
pub mod orchestrator;
pub mod state_machine;
pub mod traits;
pub mod transitions;
pub mod types;

pub use context::{WorkflowContext, ACCEPTED_FILE_TYPES};
pub use effects::Collaborators;
pub use errors::{PermissionFailure, WorkflowError};
pub use orchestrator::{OrchestratorOptions, WorkflowHandle, WorkflowOrchestrator};
pub use state_machine::{EffectLaunch, Resolution, Step, WorkflowMachine};
pub use traits::{
    DirectoryScanner, ErrorNotifier, EvaluationReport, FileEvaluator, FileMover,
    PermissionChecker, PermissionReport,
};
pub use transitions::{transition, MachineInput, Transition, TransitionPolicy};
pub use types::{
    EffectKind, EffectOutcome, EffectRequest, EffectStatus, EffectTicket, TransitionRecord,
    TransitionTrigger, WorkflowEvent, WorkflowSnapshot, WorkflowState,
};
