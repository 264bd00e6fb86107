//! Workflow context carried between states.
//!
//! Every update consumes the current value and returns a new one, so a
//! transition is a plain function from the old context to the new context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Media extensions accepted for relocation, lower-case and without dots
pub const ACCEPTED_FILE_TYPES: [&str; 11] = [
    "mp4", "mkv", "avi", "mov", "m4v", "mpg", "mpeg", "wmv", "flv", "ts", "mts",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowContext {
    base_path: String,
    destination_path: String,
    directories_to_check: Vec<String>,
    dirs_to_evaluate: Vec<String>,
    dirs_to_report: Vec<String>,
    dirs_to_move: Vec<String>,
    /// Reserved for reporting detail; nothing populates it yet
    files_to_email: Vec<String>,
    /// Reserved audit trail; nothing populates it yet
    processed_files: Vec<String>,
    accepted_file_types: BTreeSet<String>,
}

impl WorkflowContext {
    pub fn new(base_path: impl Into<String>, destination_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            destination_path: destination_path.into(),
            directories_to_check: Vec::new(),
            dirs_to_evaluate: Vec::new(),
            dirs_to_report: Vec::new(),
            dirs_to_move: Vec::new(),
            files_to_email: Vec::new(),
            processed_files: Vec::new(),
            accepted_file_types: ACCEPTED_FILE_TYPES
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn destination_path(&self) -> &str {
        &self.destination_path
    }

    pub fn directories_to_check(&self) -> &[String] {
        &self.directories_to_check
    }

    pub fn dirs_to_evaluate(&self) -> &[String] {
        &self.dirs_to_evaluate
    }

    pub fn dirs_to_report(&self) -> &[String] {
        &self.dirs_to_report
    }

    pub fn dirs_to_move(&self) -> &[String] {
        &self.dirs_to_move
    }

    pub fn files_to_email(&self) -> &[String] {
        &self.files_to_email
    }

    pub fn processed_files(&self) -> &[String] {
        &self.processed_files
    }

    pub fn accepted_file_types(&self) -> &BTreeSet<String> {
        &self.accepted_file_types
    }

    /// Case-insensitive membership test against the accepted extensions
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.accepted_file_types
            .contains(&extension.to_ascii_lowercase())
    }

    pub fn with_directories_to_check(self, directories: Vec<String>) -> Self {
        Self {
            directories_to_check: directories,
            ..self
        }
    }

    pub fn with_permission_results(
        self,
        dirs_to_evaluate: Vec<String>,
        dirs_to_report: Vec<String>,
    ) -> Self {
        Self {
            dirs_to_evaluate,
            dirs_to_report,
            ..self
        }
    }

    pub fn with_dirs_to_report(self, dirs_to_report: Vec<String>) -> Self {
        Self {
            dirs_to_report,
            ..self
        }
    }

    pub fn with_dirs_to_move(self, dirs_to_move: Vec<String>) -> Self {
        Self {
            dirs_to_move,
            ..self
        }
    }
}
