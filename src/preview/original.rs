//! Original-document pane.
//!
//! What can be shown depends on the uploaded file's type:
//!
//! | Extension | Pane content |
//! |-----------|--------------|
//! | `.docx` | HTML rendered by the server (`GET /preview_docx/{name}`) |
//! | `.pdf`  | inline frame on `/preview_pdf/{name}` |
//! | other   | a notice naming the extension |
//!
//! The PDF frame is not validated here: if the server answers the frame with
//! a 404, the frame shows whatever the server sent.

use super::{PaneContent, PaneState};
use crate::error::PaneError;
use crate::model::file_extension;
use crate::transport::{preview_docx_path, Endpoints, Transport};
use serde_json::Value;

/// How the original document can be previewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginalKind {
    Docx,
    Pdf,
    /// Carries the lower-cased extension, if there is one.
    Unsupported(Option<String>),
}

pub fn classify(original_filename: &str) -> OriginalKind {
    match file_extension(original_filename).as_deref() {
        Some("docx") => OriginalKind::Docx,
        Some("pdf") => OriginalKind::Pdf,
        other => OriginalKind::Unsupported(other.map(str::to_string)),
    }
}

/// Settle the original pane for `original_filename`.
pub async fn load_original(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    original_filename: &str,
) -> PaneState {
    match classify(original_filename) {
        OriginalKind::Docx => fetch_docx(transport, original_filename).await,
        OriginalKind::Pdf => PaneState::Loaded(PaneContent::Frame {
            src: endpoints.preview_pdf_url(original_filename),
        }),
        OriginalKind::Unsupported(Some(ext)) => PaneState::Loaded(PaneContent::Notice(format!(
            "Original preview is not supported for .{ext} files."
        ))),
        OriginalKind::Unsupported(None) => PaneState::Loaded(PaneContent::Notice(
            "Original preview is not supported for files without an extension.".to_string(),
        )),
    }
}

async fn fetch_docx(transport: &dyn Transport, original_filename: &str) -> PaneState {
    let response = match transport.get(&preview_docx_path(original_filename)).await {
        Ok(r) => r,
        Err(e) => {
            return PaneState::Errored(PaneError::Fetch {
                detail: e.to_string(),
            })
        }
    };

    if !response.is_success() {
        let error = match response.error_field() {
            Ok(Some(message)) => PaneError::Server { message },
            _ => PaneError::Status {
                status: response.status,
                reason: response.reason.clone(),
            },
        };
        return PaneState::Errored(error);
    }

    let body = match response.json_value() {
        Ok(v) => v,
        Err(e) => {
            return PaneState::Errored(PaneError::Fetch {
                detail: e.to_string(),
            })
        }
    };

    let non_empty = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    if let Some(html) = non_empty("html_content") {
        PaneState::Loaded(PaneContent::Html(html))
    } else if let Some(message) = non_empty("error") {
        PaneState::Errored(PaneError::Server { message })
    } else {
        PaneState::Errored(PaneError::UnexpectedFormat)
    }
}
