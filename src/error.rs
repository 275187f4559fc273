//! Error types for the doc2md-client library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ClientError`] is **fatal for one submission**: the batch cannot be
//!   shown at all (nothing selected, server unreachable, non-2xx status,
//!   unparseable body). Returned as `Err(ClientError)` from
//!   [`crate::submit::BatchController::submit`] and turned into a single
//!   inline message by [`crate::session::Session`].
//!
//! * [`PaneError`] is **non-fatal**: one preview pane failed (preview
//!   endpoint returned an error, Markdown renderer missing) while the other
//!   pane and every sibling list entry are fine. Stored inside
//!   [`crate::preview::PaneState::Errored`].
//!
//! Per-file conversion failures are neither: the server reports them inside
//! a successful batch and they live in [`crate::model::Outcome::Failed`].

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors for one submission, plus the I/O and configuration errors
/// the library surfaces to its host.
#[derive(Debug, Error)]
pub enum ClientError {
    // ── Validation errors (no network call) ───────────────────────────────
    /// `submit` was called with an empty selection.
    #[error("Please select at least one file.")]
    NoFilesSelected,

    /// The batch exceeds the server's request size limit.
    #[error("Selected files total {total_bytes} bytes, above the {limit_bytes}-byte upload limit.")]
    BatchTooLarge { total_bytes: u64, limit_bytes: u64 },

    /// Another submission on the same controller has not resolved yet.
    #[error("A submission is already in progress; wait for it to finish.")]
    SubmissionInFlight,

    // ── Network errors ────────────────────────────────────────────────────
    /// The request never completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    ///
    /// `message` is the body's `error` string when there is one, otherwise a
    /// message synthesised from the status line.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body is not valid JSON.
    #[error("Could not read the server response: {detail}")]
    InvalidResponse { detail: String },

    // ── Session errors ────────────────────────────────────────────────────
    /// A command addressed a list entry that does not exist.
    #[error("No result entry at position {item}")]
    UnknownItem { item: usize },

    /// The addressed list entry has no artifact to download or preview.
    #[error("'{original_filename}' has no downloadable Markdown artifact")]
    NoArtifact { original_filename: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A selected file could not be read from disk.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// True for errors detected locally before any request was issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::NoFilesSelected
                | ClientError::BatchTooLarge { .. }
                | ClientError::SubmissionInFlight
        )
    }
}

/// A request that never produced an HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Network request failed: {0}")]
    Network(String),
}

/// A non-fatal failure of a single preview pane.
///
/// The `Display` text is what the pane shows (escaped) in place of content.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PaneError {
    /// The preview endpoint reported an error in its JSON body.
    #[error("Original preview failed: {message}")]
    Server { message: String },

    /// Non-2xx without a usable `error` field.
    #[error("Server responded with an error: {status} {reason}")]
    Status { status: u16, reason: String },

    /// Transport failure or unreadable body.
    #[error("Preview request failed: {detail}")]
    Fetch { detail: String },

    /// 2xx body with neither content nor an error.
    #[error("The preview endpoint returned an unexpected response format.")]
    UnexpectedFormat,

    /// No Markdown renderer is installed.
    #[error("The Markdown preview renderer is not available.")]
    RendererUnavailable,

    /// The Markdown renderer rejected the artifact.
    #[error("An error occurred while rendering the Markdown content: {message}")]
    RenderFailed { message: String },
}
