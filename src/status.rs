//! Status narrative for a submission.
//!
//! Inject an [`Arc<dyn SubmissionStatusCallback>`] into
//! [`crate::submit::BatchController`] to be told, in order, what a
//! submission is doing. The stages are presentation only: nothing in the
//! library branches on their text.
//!
//! ```text
//! Preparing ──▶ Sending ──▶ Processing ──▶ Completed
//!     │            │             │
//!     └────────────┴─────────────┴────────▶ Failed
//! ```
//!
//! # Example
//!
//! ```rust
//! use doc2md_client::{SubmissionStage, SubmissionStatusCallback};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Transcript(Mutex<Vec<String>>);
//!
//! impl SubmissionStatusCallback for Transcript {
//!     fn on_stage(&self, stage: &SubmissionStage) {
//!         self.0.lock().unwrap().push(stage.describe());
//!     }
//! }
//!
//! let t = Transcript::default();
//! t.on_stage(&SubmissionStage::Sending { file_count: 2 });
//! assert_eq!(t.0.lock().unwrap()[0], "Uploading 2 files...");
//! ```

use serde::Serialize;
use std::sync::Arc;

/// One step of the narrative. Emitted strictly in the order shown in the
/// module docs; `Failed` can follow any non-terminal stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum SubmissionStage {
    /// Validating the selection and assembling the request.
    Preparing { file_count: usize },
    /// The multipart request is on the wire.
    Sending { file_count: usize },
    /// The server answered; its body is being interpreted.
    Processing,
    /// The response was interpreted (which may still be a "no results" or
    /// per-file failure view).
    Completed { result_count: usize },
    /// The submission failed as a whole.
    Failed { message: String },
}

impl SubmissionStage {
    /// Human-readable status line for this stage.
    pub fn describe(&self) -> String {
        match self {
            SubmissionStage::Preparing { .. } => "Preparing upload...".to_string(),
            SubmissionStage::Sending { file_count: 1 } => "Uploading 1 file...".to_string(),
            SubmissionStage::Sending { file_count } => format!("Uploading {file_count} files..."),
            SubmissionStage::Processing => {
                "The server is processing the files, please wait...".to_string()
            }
            SubmissionStage::Completed { .. } => "Processing complete!".to_string(),
            SubmissionStage::Failed { .. } => "An error occurred.".to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionStage::Completed { .. } | SubmissionStage::Failed { .. }
        )
    }
}

/// Receives the status narrative of each submission.
///
/// Implementations must be `Send + Sync` so a controller can be shared
/// behind an `Arc`. The default implementation ignores every stage.
pub trait SubmissionStatusCallback: Send + Sync {
    fn on_stage(&self, stage: &SubmissionStage) {
        let _ = stage;
    }
}

/// A no-op implementation for callers that don't need status events.
pub struct NoopStatusCallback;

impl SubmissionStatusCallback for NoopStatusCallback {}

/// Convenience alias for the type held by the controller.
pub type StatusCallback = Arc<dyn SubmissionStatusCallback>;
