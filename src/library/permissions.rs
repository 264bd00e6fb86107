use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::workflow::{PermissionChecker, PermissionFailure, PermissionReport};

/// Clears a directory when it exists, can be listed and accepts a new file.
///
/// Rejects only when there was something to check and nothing passed; a
/// partial failure resolves with both lists filled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPermissionChecker;

impl FsPermissionChecker {
    async fn check_directory(directory: &str) -> Result<(), String> {
        let metadata = tokio::fs::metadata(directory)
            .await
            .map_err(|e| format!("metadata unavailable: {}", e))?;
        if !metadata.is_dir() {
            return Err("not a directory".to_string());
        }
        tokio::fs::read_dir(directory)
            .await
            .map_err(|e| format!("cannot list entries: {}", e))?;

        // Writable means a file can actually be created here
        let check_file =
            Path::new(directory).join(format!(".mediaflow-write-check-{}", Uuid::new_v4()));
        tokio::fs::write(&check_file, b"")
            .await
            .map_err(|e| format!("not writable: {}", e))?;
        if let Err(e) = tokio::fs::remove_file(&check_file).await {
            warn!(file = %check_file.display(), error = %e, "Failed to remove write check file");
        }
        Ok(())
    }
}

#[async_trait]
impl PermissionChecker for FsPermissionChecker {
    async fn check_file_permissions(
        &self,
        directories: &[String],
    ) -> Result<PermissionReport, PermissionFailure> {
        let mut report = PermissionReport::default();

        for directory in directories {
            match Self::check_directory(directory).await {
                Ok(()) => report.dirs_to_evaluate.push(directory.clone()),
                Err(reason) => {
                    warn!(directory = %directory, reason = %reason, "Directory failed permission check");
                    report.dirs_to_report.push(directory.clone());
                }
            }
        }

        debug!(
            cleared = report.dirs_to_evaluate.len(),
            failed = report.dirs_to_report.len(),
            "Permission check finished"
        );

        if !directories.is_empty() && report.dirs_to_evaluate.is_empty() {
            return Err(PermissionFailure::new(report.dirs_to_report));
        }
        Ok(report)
    }
}
