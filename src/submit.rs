//! Batch submission: selection → one multipart request → [`BatchOutcome`].
//!
//! ## Response interpretation
//!
//! First match wins:
//!
//! 1. non-2xx → [`ClientError::Server`], message from the body's `error`
//!    field, else synthesised from the status line
//! 2. 2xx, non-empty array → [`BatchOutcome::Results`]
//! 3. 2xx, empty array → [`BatchOutcome::NoResults`]
//! 4. 2xx, object with `error` → [`BatchOutcome::Rejected`]
//! 5. anything else → [`BatchOutcome::UnexpectedFormat`]
//!
//! Transport failures and unparseable 2xx bodies come back as
//! `Err(ClientError)` too; nothing panics and nothing is retried.
//!
//! ## One submission at a time
//!
//! A controller refuses to start a second submission while one is pending
//! ([`ClientError::SubmissionInFlight`], no request issued). The flag is
//! released when the pending call returns or is dropped.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{BatchOutcome, UploadBatch, UploadFile};
use crate::status::{NoopStatusCallback, StatusCallback, SubmissionStage};
use crate::transport::{HttpResponse, Transport, UPLOAD_PATH};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives one submission at a time against a [`Transport`].
pub struct BatchController {
    transport: Arc<dyn Transport>,
    upload_field: String,
    max_batch_bytes: u64,
    status: StatusCallback,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path, including cancellation.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BatchController {
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            upload_field: config.upload_field.clone(),
            max_batch_bytes: config.max_batch_bytes,
            status: Arc::new(NoopStatusCallback),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.status = callback;
        self
    }

    /// True while a submission is pending.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit `files` as one batch.
    ///
    /// Emits `Preparing`, then either `Failed` for a rejected selection (no
    /// request issued) or `Sending` → `Processing` → `Completed`/`Failed`.
    pub async fn submit(&self, files: Vec<UploadFile>) -> Result<BatchOutcome, ClientError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Rejected submission: another one is still pending");
            return Err(ClientError::SubmissionInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.emit(SubmissionStage::Preparing {
            file_count: files.len(),
        });
        let batch = match UploadBatch::new(files, self.max_batch_bytes) {
            Ok(batch) => batch,
            Err(e) => {
                debug!("Selection rejected: {}", e);
                self.emit(SubmissionStage::Failed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };
        info!(
            "Submitting {} files ({} bytes)",
            batch.len(),
            batch.total_bytes()
        );

        let result = self.send(&batch).await;
        match &result {
            Ok(outcome) => {
                let count = match outcome {
                    BatchOutcome::Results(items) => items.len(),
                    _ => 0,
                };
                info!("Submission finished with {} results", count);
                self.emit(SubmissionStage::Completed {
                    result_count: count,
                });
            }
            Err(e) => {
                warn!("Submission failed: {}", e);
                self.emit(SubmissionStage::Failed {
                    message: e.to_string(),
                });
            }
        }
        result
    }

    async fn send(&self, batch: &UploadBatch) -> Result<BatchOutcome, ClientError> {
        self.emit(SubmissionStage::Sending {
            file_count: batch.len(),
        });
        let response = self
            .transport
            .post_multipart(UPLOAD_PATH, &self.upload_field, batch.files())
            .await?;
        self.emit(SubmissionStage::Processing);
        interpret_response(&response)
    }

    fn emit(&self, stage: SubmissionStage) {
        debug!("Submission stage: {}", stage.describe());
        self.status.on_stage(&stage);
    }
}

/// Classify an upload response.
pub fn interpret_response(response: &HttpResponse) -> Result<BatchOutcome, ClientError> {
    if !response.is_success() {
        return Err(server_error(response));
    }
    let value = response
        .json_value()
        .map_err(|e| ClientError::InvalidResponse {
            detail: e.to_string(),
        })?;
    Ok(BatchOutcome::from_json(value))
}

/// Build the error for a non-2xx upload response.
fn server_error(response: &HttpResponse) -> ClientError {
    let message = match response.error_field() {
        Ok(Some(message)) => message,
        Ok(None) => format!("Server returned an error: {}", response.status),
        Err(_) => format!("Server responded with an error: {}", response.status_line()),
    };
    ClientError::Server {
        status: response.status,
        message,
    }
}
