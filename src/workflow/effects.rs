use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::workflow::traits::{
    DirectoryScanner, ErrorNotifier, FileEvaluator, FileMover, PermissionChecker,
};
use crate::workflow::types::{EffectOutcome, EffectRequest};

/// The five collaborators an orchestrator drives
#[derive(Clone)]
pub struct Collaborators {
    pub scanner: Arc<dyn DirectoryScanner>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub evaluator: Arc<dyn FileEvaluator>,
    pub mover: Arc<dyn FileMover>,
    pub notifier: Arc<dyn ErrorNotifier>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    pub fn new(
        scanner: impl DirectoryScanner + 'static,
        permissions: impl PermissionChecker + 'static,
        evaluator: impl FileEvaluator + 'static,
        mover: impl FileMover + 'static,
        notifier: impl ErrorNotifier + 'static,
    ) -> Self {
        Self {
            scanner: Arc::new(scanner),
            permissions: Arc::new(permissions),
            evaluator: Arc::new(evaluator),
            mover: Arc::new(mover),
            notifier: Arc::new(notifier),
        }
    }

    /// Run the collaborator behind `request` and translate its result.
    ///
    /// Returns `None` for error notification, which never drives a
    /// transition. Notifier failures are only logged.
    pub async fn execute(&self, request: EffectRequest) -> Option<EffectOutcome> {
        let outcome = match request {
            EffectRequest::Scan { base_path } => {
                match self.scanner.scan_directories(&base_path).await {
                    Ok(directories) => EffectOutcome::ScanCompleted { directories },
                    Err(e) => EffectOutcome::ScanFailed {
                        reason: format!("{:#}", e),
                    },
                }
            }
            EffectRequest::CheckPermissions { directories } => {
                match self.permissions.check_file_permissions(&directories).await {
                    Ok(report) => EffectOutcome::PermissionsChecked {
                        dirs_to_evaluate: report.dirs_to_evaluate,
                        dirs_to_report: report.dirs_to_report,
                    },
                    Err(failure) => EffectOutcome::PermissionsFailed {
                        reason: Some(failure.to_string()),
                        dirs_to_report: failure.dirs_to_report,
                    },
                }
            }
            EffectRequest::Evaluate {
                directories,
                accepted_file_types,
            } => match self
                .evaluator
                .evaluate_files(&directories, &accepted_file_types)
                .await
            {
                Ok(report) => EffectOutcome::FilesEvaluated {
                    dirs_to_move: report.dirs_to_move,
                },
                Err(e) => EffectOutcome::EvaluationFailed {
                    reason: format!("{:#}", e),
                },
            },
            EffectRequest::Move {
                files,
                destination_path,
            } => match self.mover.move_files(&files, &destination_path).await {
                Ok(()) => EffectOutcome::FilesMoved,
                Err(e) => EffectOutcome::MoveFailed {
                    reason: format!("{:#}", e),
                },
            },
            EffectRequest::NotifyErrors { dirs_to_report } => {
                match self.notifier.notify_errors(&dirs_to_report).await {
                    Ok(()) => debug!(count = dirs_to_report.len(), "Error report delivered"),
                    Err(e) => warn!(
                        count = dirs_to_report.len(),
                        error = %format!("{:#}", e),
                        "Failed to deliver error report"
                    ),
                }
                return None;
            }
        };

        Some(outcome)
    }
}
