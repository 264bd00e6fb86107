// MediaFlow Library - Media Library Maintenance Workflow
// This exposes the core components for testing and integration

pub mod config;
pub mod library;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use config::{config, init_config, MediaFlowConfig};
pub use library::{
    ExtensionEvaluator, FsDirectoryScanner, FsFileMover, FsPermissionChecker, LogNotifier,
};
pub use telemetry::{create_workflow_span, generate_correlation_id, init_telemetry};
pub use workflow::{
    Collaborators, OrchestratorOptions, WorkflowContext, WorkflowError, WorkflowEvent,
    WorkflowHandle, WorkflowMachine, WorkflowOrchestrator, WorkflowSnapshot, WorkflowState,
};
