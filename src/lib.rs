//! # doc2md-client
//!
//! Client for a document-to-Markdown conversion service.
//!
//! The service accepts a batch of documents (PDF, DOCX, …) on `POST /upload`,
//! converts each one to Markdown and answers with one result per file. This
//! crate submits batches, interprets the many shapes the answer can take,
//! and drives a side-by-side "original vs. Markdown" preview for every
//! converted file. All markup is produced by pure functions of the client
//! state, so any host (a web view, a static report, a test) can show it.
//!
//! ## Flow
//!
//! ```text
//! files
//!  │
//!  ├─ 1. Submit   one multipart POST /upload, status narrative via callback
//!  ├─ 2. Classify results list │ no results │ rejected │ unexpected format
//!  ├─ 3. Render   results list with download links and preview toggles
//!  └─ 4. Preview  on first open, load both panes concurrently
//!                   original: /preview_docx/{name} │ /preview_pdf/{name} │ notice
//!                   markdown: /download/{name} → CommonMark → HTML
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2md_client::{ClientConfig, Command, Session, UploadFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .server_url("http://127.0.0.1:5000")
//!         .build()?;
//!     let mut session = Session::new(config)?;
//!
//!     let file = UploadFile::from_path("report.docx").await?;
//!     session.submit(vec![file]).await;
//!     session.dispatch(Command::TogglePreview { item: 0 }).await?;
//!
//!     println!("{}", session.render());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2md` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! doc2md-client = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod markdown;
pub mod model;
pub mod preview;
pub mod render;
pub mod session;
pub mod status;
pub mod submit;
pub mod transport;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ClientError, PaneError, TransportError};
pub use markdown::{CommonMarkRenderer, MarkdownError, MarkdownRenderer};
pub use model::{BatchOutcome, Outcome, ResultItem, UploadBatch, UploadFile};
pub use preview::{PaneContent, PaneState, PreviewLoader, PreviewState};
pub use render::{Notice, NoticeKind, ResultsView};
pub use session::{Command, Session};
pub use status::{NoopStatusCallback, StatusCallback, SubmissionStage, SubmissionStatusCallback};
pub use submit::BatchController;
pub use transport::{Endpoints, HttpResponse, HttpTransport, Transport};
