use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::workflow::DirectoryScanner;

/// Lists the immediate sub-directories of the library root, sorted
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectoryScanner;

#[async_trait]
impl DirectoryScanner for FsDirectoryScanner {
    async fn scan_directories(&self, base_path: &str) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(base_path)
            .await
            .with_context(|| format!("Failed to read library root {}", base_path))?;

        let mut directories = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("Failed to list {}", base_path))?
        {
            if entry.file_type().await?.is_dir() {
                directories.push(entry.path().to_string_lossy().into_owned());
            }
        }
        directories.sort();

        debug!(base_path, found = directories.len(), "Library scan finished");
        Ok(directories)
    }
}
