// Transition table for the media-library workflow.
// Pure functions only: (state, context, input) -> next state and next context.

use serde::{Deserialize, Serialize};

use crate::workflow::context::WorkflowContext;
use crate::workflow::types::{EffectOutcome, WorkflowEvent, WorkflowState};

/// Anything the machine can react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineInput {
    Event(WorkflowEvent),
    Effect(EffectOutcome),
}

/// Knobs that change what a transition writes into the context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPolicy {
    /// Drop `dirs_to_report` when RESTART leaves the error report
    pub clear_reports_on_restart: bool,
}

/// Result of applying an input: where to go and the context to carry there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub target: WorkflowState,
    pub context: WorkflowContext,
    pub detail: Option<String>,
}

impl Transition {
    fn to(target: WorkflowState, context: WorkflowContext) -> Self {
        Self {
            target,
            context,
            detail: None,
        }
    }

    fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }
}

/// Apply `input` in `state`. Returns `None` when the table has no entry for
/// the pair, in which case state and context stay as they are.
pub fn transition(
    state: WorkflowState,
    context: &WorkflowContext,
    input: &MachineInput,
    policy: TransitionPolicy,
) -> Option<Transition> {
    use MachineInput::{Effect, Event};
    use WorkflowState::*;

    let next = match (state, input) {
        (Idle, Event(WorkflowEvent::StartScan)) => Transition::to(Scanning, context.clone()),

        (ReportingErrors, Event(WorkflowEvent::Restart)) => {
            let context = if policy.clear_reports_on_restart {
                context.clone().with_dirs_to_report(Vec::new())
            } else {
                context.clone()
            };
            Transition::to(Idle, context)
        }

        (Scanning, Effect(EffectOutcome::ScanCompleted { directories })) => Transition::to(
            CheckingFilePermissions,
            context.clone().with_directories_to_check(directories.clone()),
        ),

        (CheckingFilePermissions, Effect(EffectOutcome::PermissionsChecked {
            dirs_to_evaluate,
            dirs_to_report,
        })) => Transition::to(
            EvaluatingFiles,
            context
                .clone()
                .with_permission_results(dirs_to_evaluate.clone(), dirs_to_report.clone()),
        ),

        (CheckingFilePermissions, Effect(outcome @ EffectOutcome::PermissionsFailed {
            dirs_to_report,
            ..
        })) => Transition::to(
            ReportingErrors,
            context.clone().with_dirs_to_report(dirs_to_report.clone()),
        )
        .with_detail(outcome.failure_detail()),

        (EvaluatingFiles, Effect(EffectOutcome::FilesEvaluated { dirs_to_move })) => {
            Transition::to(
                MovingFiles,
                context.clone().with_dirs_to_move(dirs_to_move.clone()),
            )
        }

        (MovingFiles, Effect(EffectOutcome::FilesMoved)) => Transition::to(Idle, context.clone()),

        // Scan, evaluation and move failures reach the report without touching the context
        (Scanning, Effect(outcome @ EffectOutcome::ScanFailed { .. }))
        | (EvaluatingFiles, Effect(outcome @ EffectOutcome::EvaluationFailed { .. }))
        | (MovingFiles, Effect(outcome @ EffectOutcome::MoveFailed { .. })) => {
            Transition::to(ReportingErrors, context.clone()).with_detail(outcome.failure_detail())
        }

        _ => return None,
    };

    Some(next)
}
