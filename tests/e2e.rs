//! End-to-end integration tests for doc2md-client.
//!
//! These tests talk to a live conversion server. They are gated behind the
//! `E2E_SERVER_URL` environment variable so they do not run in CI unless
//! explicitly requested.
//!
//! Run with:
//!   E2E_SERVER_URL=http://127.0.0.1:5000 cargo test --test e2e -- --nocapture
//!
//! Tests that upload real documents also need the sample files in
//! `./test_cases/` (`sample.pdf`, `sample.docx`).

use doc2md_client::{
    ClientConfig, Command, Outcome, PaneContent, PaneState, ResultsView, Session, UploadFile,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test unless E2E_SERVER_URL is set; evaluates to the URL.
macro_rules! e2e_skip_unless_server {
    () => {{
        match std::env::var("E2E_SERVER_URL") {
            Ok(url) => url,
            Err(_) => {
                println!("SKIP: set E2E_SERVER_URL to run e2e tests");
                return;
            }
        }
    }};
}

/// Skip this test if the sample file at `path` is missing.
macro_rules! e2e_skip_unless_file {
    ($path:expr) => {{
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn session(url: &str) -> Session {
    let config = ClientConfig::builder()
        .server_url(url)
        .request_timeout_secs(300)
        .build()
        .expect("valid E2E_SERVER_URL");
    Session::new(config).expect("HTTP client")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unsupported_file_is_reported() {
    let url = e2e_skip_unless_server!();
    let mut s = session(&url);

    s.submit(vec![UploadFile::new("notes.xyz", b"hello".to_vec())])
        .await;

    // The server either rejects the batch or fails the single item; both
    // must surface as visible text.
    let html = s.render();
    println!("{html}");
    assert!(!html.is_empty());
    assert!(!html.contains("/download/"));
}

#[tokio::test]
async fn test_pdf_round_trip() {
    let url = e2e_skip_unless_server!();
    let path = e2e_skip_unless_file!(test_cases_dir().join("sample.pdf"));
    let mut s = session(&url);

    let file = UploadFile::from_path(&path).await.expect("read sample.pdf");
    s.submit(vec![file]).await;

    let ResultsView::List(items) = s.view() else {
        panic!("expected a result list, got {:?}", s.view());
    };
    assert_eq!(items.len(), 1);
    assert!(
        matches!(items[0].outcome, Outcome::Converted { .. }),
        "conversion failed: {:?}",
        items[0]
    );

    let markdown = s.download_artifact(0).await.expect("download artifact");
    assert!(!markdown.trim().is_empty());

    s.dispatch(Command::TogglePreview { item: 0 })
        .await
        .expect("open preview");
    let preview = s.preview(0).expect("preview state");
    assert!(matches!(
        preview.original,
        PaneState::Loaded(PaneContent::Frame { .. })
    ));
    assert!(matches!(preview.markdown, PaneState::Loaded(_)));
}

#[tokio::test]
async fn test_docx_preview() {
    let url = e2e_skip_unless_server!();
    let path = e2e_skip_unless_file!(test_cases_dir().join("sample.docx"));
    let mut s = session(&url);

    let file = UploadFile::from_path(&path).await.expect("read sample.docx");
    s.submit(vec![file]).await;
    s.dispatch(Command::TogglePreview { item: 0 })
        .await
        .expect("open preview");

    let preview = s.preview(0).expect("preview state");
    match &preview.original {
        PaneState::Loaded(PaneContent::Html(html)) => assert!(!html.is_empty()),
        other => panic!("unexpected original pane: {other:?}"),
    }
    assert!(matches!(preview.markdown, PaneState::Loaded(_)));

    let out = tempfile::tempdir().expect("tempdir");
    s.save_page(out.path().join("results.html"), "E2E")
        .await
        .expect("save page");
}
