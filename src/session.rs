//! The results area as one stateful object.
//!
//! A [`Session`] ties the pieces together: it owns the list currently on
//! screen, one [`PreviewState`] per converted entry, and the latest status
//! stage. Hosts call [`Session::submit`] for a file selection and
//! [`Session::dispatch`] for every click on the list, then re-render with
//! [`Session::render`].
//!
//! ```text
//! submit(files) ──▶ BatchController ──▶ ResultsView + fresh PreviewStates
//!                                              │
//! click ──▶ Command ──▶ dispatch ──▶ PreviewState::toggle ──▶ PreviewLoader (first open)
//! ```
//!
//! A new submission replaces the list and drops every preview state with it.
//! Because both calls take `&mut self`, a session never runs a submission and
//! a preview load at the same time.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::markdown::{CommonMarkRenderer, MarkdownRenderer};
use crate::model::{BatchOutcome, ResultItem, UploadFile};
use crate::preview::{PreviewLoader, PreviewState};
use crate::render::{self, Notice, ResultsView};
use crate::status::{NoopStatusCallback, StatusCallback, SubmissionStage, SubmissionStatusCallback};
use crate::submit::BatchController;
use crate::transport::{download_path, Endpoints, HttpTransport, Transport};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub const NO_RESULTS_TEXT: &str =
    "Upload finished, but no results were returned. Possibly none of the files could be processed.";
pub const UNEXPECTED_FORMAT_TEXT: &str =
    "No valid results were received, or the response had an unexpected format.";

/// A click on the list, decoded from the element's `data-*` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show or hide the comparison preview of entry `item`.
    TogglePreview { item: usize },
    /// Fetch both panes of entry `item` again and show them.
    ReloadPreview { item: usize },
}

impl Command {
    /// Decode `data-command` / `data-item`.
    pub fn from_attributes(command: &str, item: &str) -> Option<Self> {
        let item = item.trim().parse().ok()?;
        match command {
            "toggle-preview" => Some(Command::TogglePreview { item }),
            "reload-preview" => Some(Command::ReloadPreview { item }),
            _ => None,
        }
    }

    pub fn item(&self) -> usize {
        match *self {
            Command::TogglePreview { item } | Command::ReloadPreview { item } => item,
        }
    }
}

/// Remembers the latest stage and forwards every stage to the host.
struct StatusTee {
    last: Mutex<Option<SubmissionStage>>,
    inner: StatusCallback,
}

impl StatusTee {
    fn reset(&self) {
        if let Ok(mut last) = self.last.lock() {
            *last = None;
        }
    }

    fn last(&self) -> Option<SubmissionStage> {
        self.last.lock().ok().and_then(|l| l.clone())
    }
}

impl SubmissionStatusCallback for StatusTee {
    fn on_stage(&self, stage: &SubmissionStage) {
        if let Ok(mut last) = self.last.lock() {
            *last = Some(stage.clone());
        }
        self.inner.on_stage(stage);
    }
}

/// The results area and everything it owns.
pub struct Session {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    controller: BatchController,
    loader: PreviewLoader,
    endpoints: Endpoints,
    status: Arc<StatusTee>,
    view: ResultsView,
    previews: Vec<Option<PreviewState>>,
}

impl Session {
    /// A session talking HTTP to `config.server_url`, rendering Markdown
    /// with [`CommonMarkRenderer`].
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// A session over any [`Transport`].
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let endpoints = Endpoints::from_config(&config);
        let status = Arc::new(StatusTee {
            last: Mutex::new(None),
            inner: Arc::new(NoopStatusCallback),
        });
        let controller = BatchController::new(&config, Arc::clone(&transport))
            .with_status_callback(status.clone());
        let renderer: Arc<dyn MarkdownRenderer> = Arc::new(CommonMarkRenderer::default());
        let loader = PreviewLoader::new(Arc::clone(&transport), Some(renderer), endpoints.clone());
        Self {
            config,
            transport,
            controller,
            loader,
            endpoints,
            status,
            view: ResultsView::Empty,
            previews: Vec::new(),
        }
    }

    /// Replace the Markdown renderer; `None` models a renderer that failed
    /// to load.
    pub fn with_markdown_renderer(mut self, renderer: Option<Arc<dyn MarkdownRenderer>>) -> Self {
        self.loader = PreviewLoader::new(Arc::clone(&self.transport), renderer, self.endpoints.clone());
        self
    }

    /// Forward the status narrative of every submission to `callback`.
    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.status = Arc::new(StatusTee {
            last: Mutex::new(None),
            inner: callback,
        });
        self.controller = BatchController::new(&self.config, Arc::clone(&self.transport))
            .with_status_callback(self.status.clone());
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ── Submission ───────────────────────────────────────────────────────

    /// Submit a selection and replace the results area with its outcome.
    ///
    /// Never fails: every error becomes an error notice in the view.
    pub async fn submit(&mut self, files: Vec<UploadFile>) -> &ResultsView {
        self.status.reset();
        self.view = ResultsView::Empty;
        self.previews.clear();

        self.view = match self.controller.submit(files).await {
            Ok(BatchOutcome::Results(items)) => {
                self.previews = items
                    .iter()
                    .map(|item| item.artifact().map(|_| PreviewState::default()))
                    .collect();
                ResultsView::List(items)
            }
            Ok(BatchOutcome::NoResults) => ResultsView::Notice(Notice::info(NO_RESULTS_TEXT)),
            Ok(BatchOutcome::Rejected { message }) => {
                ResultsView::Notice(Notice::error(format!("Processing failed: {message}")))
            }
            Ok(BatchOutcome::UnexpectedFormat) => {
                ResultsView::Notice(Notice::info(UNEXPECTED_FORMAT_TEXT))
            }
            Err(e) if e.is_validation() => ResultsView::Notice(Notice::error(e.to_string())),
            Err(e) => ResultsView::Notice(Notice::error(format!("Error: {e}"))),
        };
        &self.view
    }

    // ── Commands ─────────────────────────────────────────────────────────

    /// Apply a list command.
    ///
    /// Opening a preview for the first time loads both panes before
    /// returning; later toggles only flip visibility.
    pub async fn dispatch(&mut self, command: Command) -> Result<(), ClientError> {
        let index = command.item();
        let ResultsView::List(items) = &self.view else {
            return Err(ClientError::UnknownItem { item: index });
        };
        let item = items
            .get(index)
            .ok_or(ClientError::UnknownItem { item: index })?;
        let processed = item.artifact().ok_or_else(|| ClientError::NoArtifact {
            original_filename: item.original_filename.clone(),
        })?;
        let state = self
            .previews
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(ClientError::UnknownItem { item: index })?;

        match command {
            Command::TogglePreview { .. } => {
                if state.toggle() {
                    self.loader
                        .load(&item.original_filename, processed, state)
                        .await;
                }
                debug!("Preview {} visible={}", index, state.visible);
            }
            Command::ReloadPreview { .. } => {
                state.visible = true;
                self.loader
                    .load(&item.original_filename, processed, state)
                    .await;
            }
        }
        Ok(())
    }

    /// Open the preview of every converted entry that is not open yet.
    /// Returns the number of previews opened.
    pub async fn open_all_previews(&mut self) -> usize {
        let closed: Vec<usize> = self
            .previews
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().filter(|p| !p.visible).map(|_| i))
            .collect();
        let mut opened = 0;
        for item in closed {
            if self.dispatch(Command::TogglePreview { item }).await.is_ok() {
                opened += 1;
            }
        }
        opened
    }

    /// Fetch the Markdown artifact of entry `item`, as the download link would.
    pub async fn download_artifact(&self, item: usize) -> Result<String, ClientError> {
        let entry = self
            .results()
            .get(item)
            .ok_or(ClientError::UnknownItem { item })?;
        let processed = entry.artifact().ok_or_else(|| ClientError::NoArtifact {
            original_filename: entry.original_filename.clone(),
        })?;
        let response = self.transport.get(&download_path(processed)).await?;
        if !response.is_success() {
            let message = match response.error_field() {
                Ok(Some(m)) => m,
                _ => format!("Failed to download '{}': {}", processed, response.status_line()),
            };
            return Err(ClientError::Server {
                status: response.status,
                message,
            });
        }
        String::from_utf8(response.body).map_err(|e| ClientError::InvalidResponse {
            detail: format!("artifact '{processed}' is not valid UTF-8: {e}"),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn view(&self) -> &ResultsView {
        &self.view
    }

    /// The entries on screen; empty unless the view is a list.
    pub fn results(&self) -> &[ResultItem] {
        match &self.view {
            ResultsView::List(items) => items,
            _ => &[],
        }
    }

    pub fn preview(&self, item: usize) -> Option<&PreviewState> {
        self.previews.get(item).and_then(Option::as_ref)
    }

    /// The latest status stage of the current submission.
    pub fn status(&self) -> Option<SubmissionStage> {
        self.status.last()
    }

    pub fn status_line(&self) -> Option<String> {
        self.status().map(|s| s.describe())
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Markup of the results area.
    pub fn render(&self) -> String {
        render::render_results(&self.view, &self.previews, &self.endpoints)
    }

    /// The results area as a standalone HTML document.
    pub fn render_page(&self, title: &str) -> String {
        render::render_page(title, self.status_line().as_deref(), &self.render())
    }

    /// Write [`Session::render_page`] to `path`.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    pub async fn save_page(&self, path: impl AsRef<Path>, title: &str) -> Result<(), ClientError> {
        let path = path.as_ref();
        let fail = |source| ClientError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(fail)?;
        }
        let tmp_path = path.with_extension("html.tmp");
        tokio::fs::write(&tmp_path, self.render_page(title))
            .await
            .map_err(fail)?;
        tokio::fs::rename(&tmp_path, path).await.map_err(fail)?;
        info!("Wrote results page to {}", path.display());
        Ok(())
    }
}
