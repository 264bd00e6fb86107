use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::workflow::{EvaluationReport, FileEvaluator};

/// Selects regular files whose extension is on the accepted list.
/// Extensions are compared lower-cased.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionEvaluator;

pub(crate) fn has_accepted_extension(path: &Path, accepted_file_types: &BTreeSet<String>) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| accepted_file_types.contains(&ext.to_ascii_lowercase()))
        .unwrap_or(false)
}

#[async_trait]
impl FileEvaluator for ExtensionEvaluator {
    async fn evaluate_files(
        &self,
        directories: &[String],
        accepted_file_types: &BTreeSet<String>,
    ) -> Result<EvaluationReport> {
        let mut report = EvaluationReport::default();

        for directory in directories {
            let mut entries = tokio::fs::read_dir(directory)
                .await
                .with_context(|| format!("Failed to read {}", directory))?;

            let mut selected = Vec::new();
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_file()
                    && has_accepted_extension(&path, accepted_file_types)
                {
                    selected.push(path.to_string_lossy().into_owned());
                }
            }
            selected.sort();

            debug!(directory = %directory, selected = selected.len(), "Directory evaluated");
            report.dirs_to_move.extend(selected);
        }

        Ok(report)
    }
}
