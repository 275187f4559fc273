//! Markup for the results area.
//!
//! Rendering is a pure function of the current [`ResultsView`] and the
//! per-item [`PreviewState`]s: the same inputs always produce the same
//! markup, and nothing here performs I/O. Hosts re-render after every
//! [`crate::session::Session`] call and swap the markup in.
//!
//! Every string that came from the server (file names, messages, error
//! text) goes through [`escape_html`]. The only unescaped content is pane
//! HTML, which is the output of the server's DOCX renderer or of the local
//! Markdown renderer.
//!
//! Interactive elements carry `data-command` / `data-item` attributes
//! instead of handlers, so a host wires one delegated listener for the
//! whole list and maps clicks to [`crate::session::Command`].

use crate::model::{Outcome, ResultItem};
use crate::preview::{PaneContent, PaneState, PreviewState};
use crate::transport::Endpoints;

/// What the results area currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultsView {
    #[default]
    Empty,
    Notice(Notice),
    List(Vec<ResultItem>),
}

/// A single message in place of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the results area.
///
/// `previews[i]` belongs to list entry `i`; entries without an artifact
/// have `None`.
pub fn render_results(
    view: &ResultsView,
    previews: &[Option<PreviewState>],
    endpoints: &Endpoints,
) -> String {
    match view {
        ResultsView::Empty => String::new(),
        ResultsView::Notice(notice) => render_notice(notice),
        ResultsView::List(items) => {
            let mut out = String::from("<ul class=\"results-list\">\n");
            for (index, item) in items.iter().enumerate() {
                let preview = previews.get(index).and_then(Option::as_ref);
                out.push_str(&render_item(index, item, preview, endpoints));
                out.push('\n');
            }
            out.push_str("</ul>");
            out
        }
    }
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::Info => format!("<p>{}</p>", escape_html(&notice.text)),
        NoticeKind::Error => format!("<p class=\"error-message\">{}</p>", escape_html(&notice.text)),
    }
}

/// One `<li>` for one result.
pub fn render_item(
    index: usize,
    item: &ResultItem,
    preview: Option<&PreviewState>,
    endpoints: &Endpoints,
) -> String {
    let mut li = format!(
        "<li class=\"result-item\" data-item=\"{index}\"><strong>{}:</strong> ",
        escape_html(&item.original_filename)
    );
    match &item.outcome {
        Outcome::Converted { processed_filename } => {
            let name = escape_html(processed_filename);
            let visible = preview.map(|p| p.visible).unwrap_or(false);
            li.push_str("<span class=\"status-success\">Converted successfully.</span> ");
            li.push_str(&format!(
                "<a class=\"download-link\" href=\"{}\" download=\"{name}\">Download {name}</a> ",
                escape_html(&endpoints.download_url(processed_filename)),
            ));
            li.push_str(&format!(
                "<button type=\"button\" class=\"comparison-preview-button\" \
                 data-command=\"toggle-preview\" data-item=\"{index}\" \
                 aria-expanded=\"{visible}\">Compare preview</button>"
            ));
            if let Some(state) = preview.filter(|p| p.has_container()) {
                li.push_str(&render_preview_area(index, state));
            }
        }
        Outcome::ConvertedWithoutArtifact => {
            li.push_str("<span class=\"status-success\">Converted successfully.</span> ");
            li.push_str(
                "<span>Markdown content was generated, but no download link was provided.</span>",
            );
        }
        Outcome::Failed { .. } => {
            let message = item.failure_message().unwrap_or_default();
            li.push_str(&format!(
                "<span class=\"status-error\">Conversion failed. Reason: {}</span>",
                escape_html(message)
            ));
        }
    }
    li.push_str("</li>");
    li
}

/// The comparison container with both panes.
pub fn render_preview_area(index: usize, state: &PreviewState) -> String {
    let hidden = if state.visible { "" } else { " hidden" };
    format!(
        "<div class=\"comparison-preview-area\" data-item=\"{index}\"{hidden}>\
         <div class=\"comparison-preview-headings\"><h4>Original document</h4><h4>Markdown</h4></div>\
         <div class=\"comparison-preview-panes\">\
         <div class=\"original-preview-pane\">{}</div>\
         <div class=\"markdown-preview-pane\">{}</div>\
         </div>\
         <button type=\"button\" class=\"comparison-reload-button\" \
         data-command=\"reload-preview\" data-item=\"{index}\">Reload preview</button>\
         </div>",
        render_pane(&state.original, "Loading original preview..."),
        render_pane(&state.markdown, "Loading Markdown preview..."),
    )
}

fn render_pane(pane: &PaneState, loading_text: &str) -> String {
    match pane {
        PaneState::Unloaded => String::new(),
        PaneState::Loading => format!("<p class=\"loading\">{loading_text}</p>"),
        PaneState::Loaded(PaneContent::Html(html)) => html.clone(),
        PaneState::Loaded(PaneContent::Frame { src }) => format!(
            "<iframe class=\"pdf-preview-frame\" src=\"{}\" title=\"Original document preview\"></iframe>",
            escape_html(src)
        ),
        PaneState::Loaded(PaneContent::Notice(text)) => format!("<p>{}</p>", escape_html(text)),
        PaneState::Errored(e) => {
            format!("<p class=\"error-message\">{}</p>", escape_html(&e.to_string()))
        }
    }
}

const PAGE_STYLE: &str = "\
body{font-family:sans-serif;margin:2em;}\
.error-message{color:#b00020;}\
.status-success{color:#1b7f3b;}\
.status-error{color:#b00020;}\
.result-item{margin-bottom:1em;}\
.comparison-preview-area{margin-top:10px;border:1px solid #eee;padding:10px;}\
.comparison-preview-headings,.comparison-preview-panes{display:flex;justify-content:space-between;gap:10px;}\
.original-preview-pane,.markdown-preview-pane{width:49%;border:1px solid #ccc;padding:5px;height:400px;overflow-y:auto;background:#f9f9f9;}\
.pdf-preview-frame{width:100%;height:100%;border:0;}";

/// Wrap a rendered results area into a standalone HTML document.
pub fn render_page(title: &str, status_line: Option<&str>, results_html: &str) -> String {
    let status = status_line
        .map(|s| format!("<div id=\"uploadStatus\">{}</div>\n", escape_html(s)))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>{PAGE_STYLE}</style>\n</head>\n<body>\n<h1>{}</h1>\n{status}\
         <div id=\"resultsArea\">\n{results_html}\n</div>\n</body>\n</html>\n",
        escape_html(title),
        escape_html(title),
    )
}
