// Collaborator interfaces consumed by the orchestrator.
// Each one is a narrow async contract so it can be swapped or mocked.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

#[cfg(test)]
use mockall::automock;

use crate::workflow::errors::PermissionFailure;

/// Directories cleared for evaluation plus those that failed a check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionReport {
    pub dirs_to_evaluate: Vec<String>,
    pub dirs_to_report: Vec<String>,
}

/// Files selected for relocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    pub dirs_to_move: Vec<String>,
}

/// Produces the candidate directories below a library root
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirectoryScanner: Send + Sync {
    async fn scan_directories(&self, base_path: &str) -> Result<Vec<String>>;
}

/// Tests read/write access for each candidate directory
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn check_file_permissions(
        &self,
        directories: &[String],
    ) -> std::result::Result<PermissionReport, PermissionFailure>;
}

/// Picks the files inside cleared directories that should be relocated
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FileEvaluator: Send + Sync {
    async fn evaluate_files(
        &self,
        directories: &[String],
        accepted_file_types: &BTreeSet<String>,
    ) -> Result<EvaluationReport>;
}

/// Relocates files into the destination library
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FileMover: Send + Sync {
    async fn move_files(&self, files: &[String], destination_path: &str) -> Result<()>;
}

/// Hands failures to an operator. Fire-and-forget from the machine's view.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ErrorNotifier: Send + Sync {
    async fn notify_errors(&self, dirs_to_report: &[String]) -> Result<()>;
}
