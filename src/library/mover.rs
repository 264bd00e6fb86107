use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::workflow::FileMover;

/// Relocates files into the destination root, keeping their file names.
///
/// An existing file at the target is never overwritten. A rename that crosses
/// file systems falls back to copy and remove.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileMover;

#[cfg(unix)]
const CROSS_DEVICE_ERROR: i32 = 18; // EXDEV
#[cfg(windows)]
const CROSS_DEVICE_ERROR: i32 = 17; // ERROR_NOT_SAME_DEVICE

fn crosses_devices(error: &io::Error) -> bool {
    error.raw_os_error() == Some(CROSS_DEVICE_ERROR)
}

/// Copy `source` to `target`, then unlink the source. If the source cannot be
/// removed the copy is deleted again so the file lives in exactly one place.
async fn copy_then_remove(source: &Path, target: &Path) -> Result<()> {
    tokio::fs::copy(source, target).await.with_context(|| {
        format!("Failed to copy {} to {}", source.display(), target.display())
    })?;

    if let Err(e) = tokio::fs::remove_file(source).await {
        if let Err(cleanup) = tokio::fs::remove_file(target).await {
            warn!(
                target = %target.display(),
                error = %cleanup,
                "Failed to remove copy after source could not be unlinked"
            );
        }
        return Err(e).with_context(|| format!("Failed to remove {}", source.display()));
    }
    Ok(())
}

impl FsFileMover {
    async fn move_one(source: &Path, destination_root: &Path) -> Result<PathBuf> {
        let file_name = source
            .file_name()
            .ok_or_else(|| anyhow!("{} has no file name", source.display()))?;
        let target = destination_root.join(file_name);

        if tokio::fs::try_exists(&target)
            .await
            .with_context(|| format!("Failed to inspect {}", target.display()))?
        {
            bail!("{} already exists", target.display());
        }

        match tokio::fs::rename(source, &target).await {
            Ok(()) => {}
            Err(e) if crosses_devices(&e) => {
                debug!(source = %source.display(), "Rename crosses devices, copying instead");
                copy_then_remove(source, &target).await?;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to rename {} to {}", source.display(), target.display())
                })
            }
        }

        Ok(target)
    }
}

#[async_trait]
impl FileMover for FsFileMover {
    async fn move_files(&self, files: &[String], destination_path: &str) -> Result<()> {
        if files.is_empty() {
            debug!("Nothing to move");
            return Ok(());
        }

        let destination_root = Path::new(destination_path);
        tokio::fs::create_dir_all(destination_root)
            .await
            .with_context(|| format!("Failed to create destination {}", destination_path))?;

        for file in files {
            let target = Self::move_one(Path::new(file), destination_root)
                .await
                .with_context(|| format!("Failed to move {}", file))?;
            debug!(source = %file, target = %target.display(), "File moved");
        }

        info!(moved = files.len(), destination = %destination_path, "Files relocated");
        Ok(())
    }
}
