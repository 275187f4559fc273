//! Comparison preview: per-item state and the two-pane loader.
//!
//! Each converted list entry owns one [`PreviewState`]: a visibility toggle
//! and two independent panes.
//!
//! ```text
//!               ┌─▶ original pane ──▶ Loaded(Html | Frame | Notice) | Errored
//! first open ───┤
//!               └─▶ markdown pane ──▶ Loaded(Html)                  | Errored
//! ```
//!
//! 1. [`original`] dispatches on the original file's extension: `.docx`
//!    is fetched as server-rendered HTML, `.pdf` is embedded by URL, other
//!    types get a static notice
//! 2. [`markdown_pane`] downloads the artifact and hands it to the
//!    [`MarkdownRenderer`]
//!
//! Both loads run concurrently and each writes only its own pane, so a
//! failure on one side never touches the other.
//!
//! ## Staleness
//!
//! Pane content is fetched on the first open only. Closing and re-opening
//! shows the retained content; [`PreviewLoader::load`] can be called again
//! on the same state to refresh it in place.

pub mod markdown_pane;
pub mod original;

use crate::error::PaneError;
use crate::markdown::MarkdownRenderer;
use crate::transport::{Endpoints, Transport};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Content of a loaded pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PaneContent {
    /// Trusted HTML fragment, injected as-is.
    Html(String),
    /// Inline frame pointing at `src`; the frame's response is not inspected.
    Frame { src: String },
    /// Plain text shown instead of a preview (escaped on render).
    Notice(String),
}

/// Lifecycle of one pane. Moves forward only:
/// `Unloaded → Loading → Loaded | Errored`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum PaneState {
    #[default]
    Unloaded,
    Loading,
    Loaded(PaneContent),
    Errored(PaneError),
}

impl PaneState {
    pub fn is_settled(&self) -> bool {
        matches!(self, PaneState::Loaded(_) | PaneState::Errored(_))
    }
}

/// Preview state of one converted list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewState {
    pub visible: bool,
    pub original: PaneState,
    pub markdown: PaneState,
    /// Number of completed loads (first open plus explicit reloads).
    pub loads: u32,
}

impl PreviewState {
    /// Flip visibility. Returns true when this opened a preview whose panes
    /// are not both settled, i.e. the caller must now run the loader. That
    /// covers the first open and a load that was abandoned midway.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible && !self.is_settled()
    }

    /// Both panes finished loading, successfully or not.
    pub fn is_settled(&self) -> bool {
        self.original.is_settled() && self.markdown.is_settled()
    }

    /// Whether the comparison container exists (anything was ever requested).
    pub fn has_container(&self) -> bool {
        self.original != PaneState::Unloaded || self.markdown != PaneState::Unloaded
    }
}

/// Fills [`PreviewState`] panes from the server.
#[derive(Clone)]
pub struct PreviewLoader {
    transport: Arc<dyn Transport>,
    renderer: Option<Arc<dyn MarkdownRenderer>>,
    endpoints: Endpoints,
}

impl PreviewLoader {
    pub fn new(
        transport: Arc<dyn Transport>,
        renderer: Option<Arc<dyn MarkdownRenderer>>,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            transport,
            renderer,
            endpoints,
        }
    }

    /// Load both panes of `state`, concurrently.
    ///
    /// Never fails: every error ends up in the pane it belongs to.
    pub async fn load(
        &self,
        original_filename: &str,
        processed_filename: &str,
        state: &mut PreviewState,
    ) {
        debug!(
            "Loading preview for '{}' / '{}'",
            original_filename, processed_filename
        );
        let PreviewState {
            original: original_slot,
            markdown: markdown_slot,
            ..
        } = state;
        *original_slot = PaneState::Loading;
        *markdown_slot = PaneState::Loading;

        futures::join!(
            async {
                *original_slot =
                    original::load_original(self.transport.as_ref(), &self.endpoints, original_filename)
                        .await;
                if let PaneState::Errored(e) = &*original_slot {
                    warn!("Original preview of '{}' failed: {}", original_filename, e);
                }
            },
            async {
                *markdown_slot = markdown_pane::load_markdown(
                    self.transport.as_ref(),
                    self.renderer.as_deref(),
                    processed_filename,
                )
                .await;
                if let PaneState::Errored(e) = &*markdown_slot {
                    warn!("Markdown preview of '{}' failed: {}", processed_filename, e);
                }
            }
        );
        state.loads += 1;
    }
}
