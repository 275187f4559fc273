//! Markdown pane: download the artifact, render it, show the HTML.

use super::{PaneContent, PaneState};
use crate::error::PaneError;
use crate::markdown::MarkdownRenderer;
use crate::transport::{download_path, Transport};

/// Settle the Markdown pane for the artifact `processed_filename`.
///
/// Uses the same `/download/{name}` endpoint as the download link. The
/// renderer is consulted only after a successful fetch, so a missing
/// renderer and a missing artifact are reported distinctly.
pub async fn load_markdown(
    transport: &dyn Transport,
    renderer: Option<&dyn MarkdownRenderer>,
    processed_filename: &str,
) -> PaneState {
    let response = match transport.get(&download_path(processed_filename)).await {
        Ok(r) => r,
        Err(e) => {
            return PaneState::Errored(PaneError::Fetch {
                detail: e.to_string(),
            })
        }
    };
    if !response.is_success() {
        return PaneState::Errored(PaneError::Status {
            status: response.status,
            reason: response.reason.clone(),
        });
    }
    let text = match response.body_text() {
        Ok(t) => t,
        Err(e) => {
            return PaneState::Errored(PaneError::Fetch {
                detail: format!("artifact is not valid UTF-8: {e}"),
            })
        }
    };

    let Some(renderer) = renderer else {
        return PaneState::Errored(PaneError::RendererUnavailable);
    };
    match renderer.render(text) {
        Ok(html) => PaneState::Loaded(PaneContent::Html(html)),
        Err(e) => PaneState::Errored(PaneError::RenderFailed {
            message: e.to_string(),
        }),
    }
}
