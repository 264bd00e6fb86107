//! Default collaborators backed by the local file system
//!
//! These implementations are intentionally shallow: the scanner lists the
//! immediate sub-directories of the library root, the evaluator selects files
//! by extension only, and the notifier writes the report to the log. Swap any
//! of them for a richer implementation through [`Collaborators::new`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use mediaflow::workflow::{
//!     Collaborators, OrchestratorOptions, WorkflowContext, WorkflowOrchestrator, WorkflowState,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let context = WorkflowContext::new("/srv/media/incoming", "/srv/media/movies");
//!     let handle = WorkflowOrchestrator::new(
//!         context,
//!         Collaborators::filesystem(),
//!         OrchestratorOptions::default(),
//!     )
//!     .spawn();
//!
//!     handle.start_scan().await?;
//!     let snapshot = handle
//!         .wait_until(|s| {
//!             s.transitions_count > 0
//!                 && matches!(s.state, WorkflowState::Idle | WorkflowState::ReportingErrors)
//!         })
//!         .await?;
//!     println!("cycle ended in {}", snapshot.state_name());
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod evaluator;
pub mod mover;
pub mod notifier;
pub mod permissions;
pub mod scanner;

pub use evaluator::ExtensionEvaluator;
pub use mover::FsFileMover;
pub use notifier::LogNotifier;
pub use permissions::FsPermissionChecker;
pub use scanner::FsDirectoryScanner;

use crate::workflow::Collaborators;

impl Collaborators {
    /// Bundle of the file-system backed defaults
    pub fn filesystem() -> Self {
        Collaborators::new(
            FsDirectoryScanner,
            FsPermissionChecker,
            ExtensionEvaluator,
            FsFileMover,
            LogNotifier,
        )
    }
}
