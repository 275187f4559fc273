//! Data model: what gets uploaded and what the server reports back.
//!
//! The server speaks in optional-field JSON objects
//! (`{original_filename, status, processed_filename?, message?}`). That shape
//! admits nonsense such as a success with neither a filename nor a note, so
//! it is decoded once at the boundary into [`ResultItem`], whose
//! [`Outcome`] is a tagged variant with exactly the states a list entry can
//! display.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// Text shown for a failed item whose server message is missing or empty.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Unknown error";

// ── Upload side ──────────────────────────────────────────────────────────

/// One selected document: its name and full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, naming it after the path's final component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Lower-cased extension without the dot, if the name has one.
    pub fn extension(&self) -> Option<String> {
        file_extension(&self.name)
    }

    /// MIME type implied by the extension.
    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("pdf") => "application/pdf",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("md") => "text/markdown",
            Some("txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }
}

/// Lower-cased extension of a file name, without the dot.
///
/// `"report.DOCX"` → `Some("docx")`; `"README"` and `".bashrc"` → `None`.
pub fn file_extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// The files of one submission, validated and frozen.
///
/// Construction is the only place files are added; once a batch exists it is
/// only read (by the transport) and then dropped when the request resolves.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    files: Vec<UploadFile>,
}

impl UploadBatch {
    /// Validate a selection.
    ///
    /// # Errors
    /// - [`ClientError::NoFilesSelected`] for an empty selection
    /// - [`ClientError::BatchTooLarge`] when `max_bytes > 0` and the summed
    ///   size exceeds it
    pub fn new(files: Vec<UploadFile>, max_bytes: u64) -> Result<Self, ClientError> {
        if files.is_empty() {
            return Err(ClientError::NoFilesSelected);
        }
        let total: u64 = files.iter().map(|f| f.bytes.len() as u64).sum();
        if max_bytes > 0 && total > max_bytes {
            return Err(ClientError::BatchTooLarge {
                total_bytes: total,
                limit_bytes: max_bytes,
            });
        }
        Ok(Self { files })
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes.len() as u64).sum()
    }
}

// ── Result side ──────────────────────────────────────────────────────────

/// Server-reported outcome for one file of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    pub original_filename: String,
    pub outcome: Outcome,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Converted; the Markdown artifact can be fetched by this name.
    Converted { processed_filename: String },
    /// Converted, but the server named no artifact to fetch.
    ConvertedWithoutArtifact,
    /// Conversion failed.
    Failed { message: Option<String> },
}

impl ResultItem {
    pub fn converted(original: impl Into<String>, processed: impl Into<String>) -> Self {
        Self {
            original_filename: original.into(),
            outcome: Outcome::Converted {
                processed_filename: processed.into(),
            },
        }
    }

    pub fn failed(original: impl Into<String>, message: Option<String>) -> Self {
        Self {
            original_filename: original.into(),
            outcome: Outcome::Failed { message },
        }
    }

    /// Name of the downloadable artifact, for converted items that have one.
    pub fn artifact(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Converted { processed_filename } => Some(processed_filename),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, Outcome::Failed { .. })
    }

    /// The failure text to show, falling back to [`DEFAULT_FAILURE_MESSAGE`].
    pub fn failure_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { message } => Some(
                message
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(DEFAULT_FAILURE_MESSAGE),
            ),
            _ => None,
        }
    }
}

/// Wire shape of one array element.
#[derive(Debug, Deserialize)]
struct WireResultItem {
    #[serde(default)]
    original_filename: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    processed_filename: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<WireResultItem> for ResultItem {
    fn from(w: WireResultItem) -> Self {
        let outcome = if w.status.as_deref() == Some("success") {
            match w.processed_filename.filter(|p| !p.is_empty()) {
                Some(processed_filename) => Outcome::Converted { processed_filename },
                None => Outcome::ConvertedWithoutArtifact,
            }
        } else {
            // The server sends "error"; anything that is not "success" fails.
            Outcome::Failed { message: w.message }
        };
        ResultItem {
            original_filename: w.original_filename.unwrap_or_default(),
            outcome,
        }
    }
}

/// Decode one array element. An element that does not have the result
/// shape becomes a failed entry, keeping whatever file name it carries.
fn decode_item(value: Value) -> ResultItem {
    let name = value
        .get("original_filename")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    match serde_json::from_value::<WireResultItem>(value) {
        Ok(wire) => wire.into(),
        Err(e) => {
            warn!("Malformed result entry for '{}': {}", name, e);
            ResultItem::failed(name, None)
        }
    }
}

/// Interpretation of a 2xx upload response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// One entry per submitted file, in server order.
    Results(Vec<ResultItem>),
    /// The server answered with an empty array.
    NoResults,
    /// The server answered with `{"error": ...}` despite a 2xx status.
    Rejected { message: String },
    /// Anything else.
    UnexpectedFormat,
}

impl BatchOutcome {
    /// Classify a decoded body; first match wins.
    ///
    /// A non-empty array always yields one entry per element; elements that
    /// are not result objects become [`Outcome::Failed`] entries.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) if items.is_empty() => BatchOutcome::NoResults,
            Value::Array(items) => {
                BatchOutcome::Results(items.into_iter().map(decode_item).collect())
            }
            Value::Object(map) => match map.get("error") {
                Some(Value::String(message)) if !message.is_empty() => BatchOutcome::Rejected {
                    message: message.clone(),
                },
                _ => BatchOutcome::UnexpectedFormat,
            },
            _ => BatchOutcome::UnexpectedFormat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(file_extension("report.DOCX").as_deref(), Some("docx"));
        assert_eq!(file_extension("a.b.pdf").as_deref(), Some("pdf"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension(".bashrc"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(UploadFile::new("x.pdf", vec![]).mime_type(), "application/pdf");
        assert!(UploadFile::new("x.Docx", vec![]).mime_type().contains("wordprocessingml"));
        assert_eq!(
            UploadFile::new("x.bin", vec![]).mime_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = UploadBatch::new(vec![], 0).unwrap_err();
        assert!(matches!(err, ClientError::NoFilesSelected));
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let files = vec![
            UploadFile::new("a.pdf", vec![0u8; 6]),
            UploadFile::new("b.pdf", vec![0u8; 6]),
        ];
        match UploadBatch::new(files.clone(), 10) {
            Err(ClientError::BatchTooLarge {
                total_bytes,
                limit_bytes,
            }) => {
                assert_eq!(total_bytes, 12);
                assert_eq!(limit_bytes, 10);
            }
            other => panic!("expected BatchTooLarge, got {other:?}"),
        }
        // Zero disables the limit.
        assert_eq!(UploadBatch::new(files, 0).unwrap().total_bytes(), 12);
    }

    #[test]
    fn classifies_result_array() {
        let body = json!([
            {"original_filename": "a.docx", "status": "success", "processed_filename": "a.md", "message": "ok"},
            {"original_filename": "b.pdf", "status": "success"},
            {"original_filename": "c.txt", "status": "error", "message": "unsupported"},
            {"original_filename": "d.pdf", "status": "weird"}
        ]);
        let BatchOutcome::Results(items) = BatchOutcome::from_json(body) else {
            panic!("expected results");
        };
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], ResultItem::converted("a.docx", "a.md"));
        assert_eq!(items[1].outcome, Outcome::ConvertedWithoutArtifact);
        assert_eq!(items[2].failure_message(), Some("unsupported"));
        assert_eq!(items[3].failure_message(), Some(DEFAULT_FAILURE_MESSAGE));
    }

    #[test]
    fn empty_processed_filename_means_no_artifact() {
        let body = json!([{"original_filename": "a.pdf", "status": "success", "processed_filename": ""}]);
        let BatchOutcome::Results(items) = BatchOutcome::from_json(body) else {
            panic!("expected results");
        };
        assert_eq!(items[0].artifact(), None);
        assert!(items[0].is_success());
    }

    #[test]
    fn classifies_non_list_bodies() {
        assert_eq!(BatchOutcome::from_json(json!([])), BatchOutcome::NoResults);
        assert_eq!(
            BatchOutcome::from_json(json!({"error": "no files"})),
            BatchOutcome::Rejected {
                message: "no files".into()
            }
        );
        assert_eq!(
            BatchOutcome::from_json(json!({"ok": true})),
            BatchOutcome::UnexpectedFormat
        );
        assert_eq!(BatchOutcome::from_json(json!("hello")), BatchOutcome::UnexpectedFormat);
    }

    #[test]
    fn malformed_element_does_not_hide_siblings() {
        let body = json!([
            {"original_filename": "good.pdf", "status": "success", "processed_filename": "good.md"},
            {"original_filename": null, "status": "error"},
            {"original_filename": "odd.pdf", "status": "success", "processed_filename": 7},
            42
        ]);
        let BatchOutcome::Results(items) = BatchOutcome::from_json(body) else {
            panic!("expected results");
        };
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], ResultItem::converted("good.pdf", "good.md"));
        assert_eq!(items[1], ResultItem::failed("", None));
        assert_eq!(items[2], ResultItem::failed("odd.pdf", None));
        assert_eq!(items[3].failure_message(), Some(DEFAULT_FAILURE_MESSAGE));
    }

    #[test]
    fn outcome_serialises_with_status_tag() {
        let v = serde_json::to_value(ResultItem::converted("a.pdf", "a.md")).unwrap();
        assert_eq!(v["outcome"]["status"], "converted");
        assert_eq!(v["outcome"]["processed_filename"], "a.md");
    }
}
