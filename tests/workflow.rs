//! Workflow tests for doc2md-client.
//!
//! Every test drives a [`Session`] end to end (submit, click, render) over a
//! scripted [`StubTransport`], so no server is needed.
//!
//! Run with:
//!   cargo test --test workflow

use doc2md_client::transport::{Method, StubTransport};
use doc2md_client::{
    ClientConfig, ClientError, Command, MarkdownRenderer, Notice, PaneContent, PaneError,
    PaneState, ResultsView, Session, SubmissionStage, SubmissionStatusCallback, TransportError,
    UploadFile,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn session(stub: &Arc<StubTransport>) -> Session {
    Session::with_transport(ClientConfig::default(), stub.clone())
}

fn upload_ok(body: Value) -> StubTransport {
    StubTransport::new().respond_json(Method::Post, "/upload", 200, body)
}

fn file(name: &str) -> UploadFile {
    UploadFile::new(name, b"%PDF-1.7 stub".to_vec())
}

fn success(original: &str, processed: &str) -> Value {
    json!({"original_filename": original, "status": "success", "processed_filename": processed})
}

#[derive(Default)]
struct Transcript(Mutex<Vec<SubmissionStage>>);

impl SubmissionStatusCallback for Transcript {
    fn on_stage(&self, stage: &SubmissionStage) {
        self.0.lock().unwrap().push(stage.clone());
    }
}

// ── Submission ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_selection_makes_no_request() {
    let stub = Arc::new(StubTransport::new());
    let mut s = session(&stub);

    let view = s.submit(Vec::new()).await.clone();

    assert!(stub.requests().is_empty());
    assert_eq!(
        view,
        ResultsView::Notice(Notice::error("Please select at least one file."))
    );
    assert!(s.render().contains("Please select at least one file."));
    assert_eq!(s.status_line().as_deref(), Some("An error occurred."));
}

#[tokio::test]
async fn one_entry_per_result_in_order() {
    let names = ["c.pdf", "a.docx", "b.txt", "d.pdf"];
    let body = Value::Array(
        names
            .iter()
            .map(|n| success(n, &format!("{n}.md")))
            .collect(),
    );
    let stub = Arc::new(upload_ok(body));
    let mut s = session(&stub);
    s.submit(names.iter().map(|n| file(n)).collect()).await;

    let html = s.render();
    assert_eq!(html.matches("<li class=\"result-item\"").count(), names.len());
    let positions: Vec<usize> = names
        .iter()
        .map(|n| html.find(&format!("<strong>{n}:</strong>")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "order: {positions:?}");

    let sent = stub.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].file_names, names);
    assert_eq!(sent[0].field.as_deref(), Some("files[]"));
}

#[tokio::test]
async fn failed_entry_shows_message_and_no_download() {
    let stub = Arc::new(upload_ok(json!([
        {"original_filename": "bad.pdf", "status": "failure", "message": "encrypted document"},
        {"original_filename": "worse.pdf", "status": "failure"},
    ])));
    let mut s = session(&stub);
    s.submit(vec![file("bad.pdf"), file("worse.pdf")]).await;

    let html = s.render();
    assert!(html.contains("encrypted document"));
    assert!(html.contains("Unknown error"));
    assert!(!html.contains("/download/"));
    assert!(!html.contains("data-command"));
}

#[tokio::test]
async fn malformed_entry_keeps_good_siblings() {
    let stub = Arc::new(upload_ok(json!([
        success("good.pdf", "good.md"),
        {"original_filename": null, "status": "error"},
    ])));
    let mut s = session(&stub);
    s.submit(vec![file("good.pdf"), file("bad.pdf")]).await;

    assert_eq!(s.results().len(), 2);
    let html = s.render();
    assert_eq!(html.matches("<li class=\"result-item\"").count(), 2);
    assert!(html.contains("href=\"/download/good.md\""));
    assert!(html.contains("Unknown error"));
}

#[tokio::test]
async fn converted_entry_has_one_link_and_one_toggle() {
    let stub = Arc::new(upload_ok(json!([success("report.docx", "report.md")])));
    let mut s = session(&stub);
    s.submit(vec![file("report.docx")]).await;

    let html = s.render();
    assert_eq!(html.matches("href=\"/download/report.md\"").count(), 1);
    assert_eq!(html.matches("data-command=\"toggle-preview\"").count(), 1);
    assert!(html.contains("data-item=\"0\""));
}

#[tokio::test]
async fn rejected_upload_shows_server_message_without_list() {
    let stub = Arc::new(StubTransport::new().respond_json(
        Method::Post,
        "/upload",
        415,
        json!({"error": "bad file"}),
    ));
    let mut s = session(&stub);
    s.submit(vec![file("x.exe")]).await;

    let html = s.render();
    assert!(html.contains("bad file"));
    assert!(!html.contains("<ul"));
    assert!(s.results().is_empty());
}

#[tokio::test]
async fn body_level_error_and_empty_list_are_notices() {
    let stub = Arc::new(upload_ok(json!({"error": "disk full"})));
    let mut s = session(&stub);
    s.submit(vec![file("a.pdf")]).await;
    assert_eq!(
        s.view(),
        &ResultsView::Notice(Notice::error("Processing failed: disk full"))
    );

    let stub = Arc::new(upload_ok(json!([])));
    let mut s = session(&stub);
    s.submit(vec![file("a.pdf")]).await;
    assert!(s.render().contains("no results were returned"));

    let stub = Arc::new(upload_ok(json!({"results": []})));
    let mut s = session(&stub);
    s.submit(vec![file("a.pdf")]).await;
    assert!(s.render().contains("unexpected format"));
}

#[tokio::test]
async fn transport_failure_is_a_generic_error() {
    let stub = Arc::new(StubTransport::new().fail(
        Method::Post,
        "/upload",
        TransportError::Network("connection refused".into()),
    ));
    let mut s = session(&stub);
    s.submit(vec![file("a.pdf")]).await;

    match s.view() {
        ResultsView::Notice(n) => assert!(n.text.starts_with("Error: "), "{}", n.text),
        other => panic!("unexpected view: {other:?}"),
    }
    assert_eq!(s.status_line().as_deref(), Some("An error occurred."));
}

#[tokio::test]
async fn hostile_filename_is_escaped() {
    let hostile = "<img src=x onerror=alert(1)>";
    let stub = Arc::new(upload_ok(json!([
        {"original_filename": hostile, "status": "failure", "message": "<script>x</script>"}
    ])));
    let mut s = session(&stub);
    s.submit(vec![file("a.pdf")]).await;

    let html = s.render();
    assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<img"));
    assert!(!html.contains("<script"));
}

#[tokio::test]
async fn status_narrative_reaches_host_callback() {
    let stub = Arc::new(upload_ok(json!([success("a.pdf", "a.md")])));
    let transcript = Arc::new(Transcript::default());
    let mut s = session(&stub).with_status_callback(transcript.clone());
    s.submit(vec![file("a.pdf"), file("b.pdf")]).await;

    let stages = transcript.0.lock().unwrap().clone();
    assert_eq!(
        stages,
        vec![
            SubmissionStage::Preparing { file_count: 2 },
            SubmissionStage::Sending { file_count: 2 },
            SubmissionStage::Processing,
            SubmissionStage::Completed { result_count: 1 },
        ]
    );
}

// ── Preview ──────────────────────────────────────────────────────────────────

fn docx_stub() -> Arc<StubTransport> {
    Arc::new(
        upload_ok(json!([success("report.docx", "report.md")]))
            .respond_json(
                Method::Get,
                "/preview_docx/report.docx",
                200,
                json!({"html_content": "<p>x</p>"}),
            )
            .respond_text(Method::Get, "/download/report.md", 200, "# Report\n\nBody"),
    )
}

#[tokio::test]
async fn docx_preview_injects_server_html() {
    let stub = docx_stub();
    let mut s = session(&stub);
    s.submit(vec![file("report.docx")]).await;
    s.dispatch(Command::TogglePreview { item: 0 }).await.unwrap();

    assert_eq!(stub.count("/preview_docx/report.docx"), 1);
    let preview = s.preview(0).unwrap();
    assert!(preview.visible);
    assert_eq!(
        preview.original,
        PaneState::Loaded(PaneContent::Html("<p>x</p>".into()))
    );

    let html = s.render();
    assert!(html.contains("<p>x</p>"));
    assert!(html.contains("<h1>Report</h1>"));
    assert!(html.contains("aria-expanded=\"true\""));
}

#[tokio::test]
async fn open_close_open_fetches_each_pane_once() {
    let stub = docx_stub();
    let mut s = session(&stub);
    s.submit(vec![file("report.docx")]).await;

    for _ in 0..3 {
        s.dispatch(Command::TogglePreview { item: 0 }).await.unwrap();
    }

    assert!(s.preview(0).unwrap().visible);
    assert_eq!(stub.count("/preview_docx/report.docx"), 1);
    assert_eq!(stub.count("/download/report.md"), 1);
    assert_eq!(s.preview(0).unwrap().loads, 1);
}

#[tokio::test]
async fn closed_preview_stays_in_markup_but_hidden() {
    let stub = docx_stub();
    let mut s = session(&stub);
    s.submit(vec![file("report.docx")]).await;
    s.dispatch(Command::TogglePreview { item: 0 }).await.unwrap();
    s.dispatch(Command::TogglePreview { item: 0 }).await.unwrap();

    let html = s.render();
    assert!(html.contains("<p>x</p>"));
    assert!(html.contains("hidden"));
    assert!(html.contains("aria-expanded=\"false\""));
}

#[tokio::test]
async fn reload_fetches_again() {
    let stub = docx_stub();
    let mut s = session(&stub);
    s.submit(vec![file("report.docx")]).await;
    s.dispatch(Command::TogglePreview { item: 0 }).await.unwrap();

    // The open preview carries its own reload control.
    let html = s.render();
    assert!(html.contains("data-command=\"reload-preview\" data-item=\"0\""));
    let reload = Command::from_attributes("reload-preview", "0").unwrap();
    s.dispatch(reload).await.unwrap();

    assert_eq!(stub.count("/preview_docx/report.docx"), 2);
    assert_eq!(stub.count("/download/report.md"), 2);
    assert_eq!(s.preview(0).unwrap().loads, 2);
}

#[tokio::test]
async fn pane_failures_are_contained() {
    let stub = Arc::new(
        upload_ok(json!([success("scan.pdf", "scan.md")]))
            .respond_text(Method::Get, "/download/scan.md", 500, "boom"),
    );
    let mut s = session(&stub);
    s.submit(vec![file("scan.pdf")]).await;
    s.dispatch(Command::TogglePreview { item: 0 }).await.unwrap();

    let preview = s.preview(0).unwrap();
    assert_eq!(
        preview.original,
        PaneState::Loaded(PaneContent::Frame {
            src: "/preview_pdf/scan.pdf".into()
        })
    );
    assert_eq!(
        preview.markdown,
        PaneState::Errored(PaneError::Status {
            status: 500,
            reason: "Internal Server Error".into()
        })
    );
    let html = s.render();
    assert!(html.contains("pdf-preview-frame"));
    assert!(html.contains("Server responded with an error: 500 Internal Server Error"));
}

#[tokio::test]
async fn missing_renderer_only_affects_markdown_pane() {
    let stub = docx_stub();
    let mut s = session(&stub).with_markdown_renderer(None::<Arc<dyn MarkdownRenderer>>);
    s.submit(vec![file("report.docx")]).await;
    s.dispatch(Command::TogglePreview { item: 0 }).await.unwrap();

    let preview = s.preview(0).unwrap();
    assert!(matches!(preview.original, PaneState::Loaded(_)));
    assert_eq!(
        preview.markdown,
        PaneState::Errored(PaneError::RendererUnavailable)
    );
}

#[tokio::test]
async fn new_submission_discards_previews() {
    let stub = docx_stub();
    let mut s = session(&stub);
    s.submit(vec![file("report.docx")]).await;
    s.dispatch(Command::TogglePreview { item: 0 }).await.unwrap();
    assert!(s.preview(0).unwrap().visible);

    s.submit(vec![file("report.docx")]).await;
    let fresh = s.preview(0).unwrap();
    assert!(!fresh.visible);
    assert_eq!(fresh.original, PaneState::Unloaded);
    assert!(!s.render().contains("comparison-preview-area"));
}

#[tokio::test]
async fn commands_for_unknown_items_are_rejected() {
    let stub = docx_stub();
    let mut s = session(&stub);
    s.submit(vec![file("report.docx")]).await;

    let err = s
        .dispatch(Command::TogglePreview { item: 9 })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::UnknownItem { item: 9 }));

    let cmd = Command::from_attributes("toggle-preview", "0").unwrap();
    s.dispatch(cmd).await.unwrap();
    assert!(s.preview(0).unwrap().visible);
}

// ── Output ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_page_writes_standalone_document() {
    let stub = docx_stub();
    let mut s = session(&stub);
    s.submit(vec![file("report.docx")]).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/results.html");
    s.save_page(&path, "Results").await.unwrap();

    let page = std::fs::read_to_string(&path).unwrap();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("Processing complete!"));
    assert!(page.contains("report.docx"));
    assert!(!path.with_extension("html.tmp").exists());
}
