use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::workflow::ErrorNotifier;

/// Reports problem directories through the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl ErrorNotifier for LogNotifier {
    async fn notify_errors(&self, dirs_to_report: &[String]) -> Result<()> {
        if dirs_to_report.is_empty() {
            warn!("Workflow failed before any directory could be attributed");
        }
        for directory in dirs_to_report {
            warn!(directory = %directory, "Directory needs operator attention");
        }
        Ok(())
    }
}
