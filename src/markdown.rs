//! Markdown → HTML for the preview pane.
//!
//! The preview pane treats rendering as an external collaborator: a pure
//! `render(markdown) -> html` that may be missing or may fail. The
//! [`MarkdownRenderer`] trait is that seam; [`CommonMarkRenderer`] is the
//! default implementation on top of pulldown-cmark.

use pulldown_cmark::{html, Options, Parser};
use thiserror::Error;

/// Error returned by a [`MarkdownRenderer`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarkdownError {
    #[error("{0}")]
    Render(String),

    /// The artifact is larger than the renderer accepts.
    #[error("document is {len} bytes, above the {limit}-byte preview limit")]
    TooLarge { len: usize, limit: usize },
}

/// Turns Markdown source into an HTML fragment.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, MarkdownError>;
}

/// GitHub-flavoured CommonMark via pulldown-cmark.
#[derive(Debug, Clone)]
pub struct CommonMarkRenderer {
    /// Enable GFM tables, strikethrough and task lists. Default: true.
    pub gfm: bool,
    /// Refuse documents longer than this many bytes. Default: 8 MiB.
    pub max_input_bytes: usize,
}

impl Default for CommonMarkRenderer {
    fn default() -> Self {
        Self {
            gfm: true,
            max_input_bytes: 8 * 1024 * 1024,
        }
    }
}

impl CommonMarkRenderer {
    fn options(&self) -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_FOOTNOTES);
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
        }
        options
    }
}

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> Result<String, MarkdownError> {
        if markdown.len() > self.max_input_bytes {
            return Err(MarkdownError::TooLarge {
                len: markdown.len(),
                limit: self.max_input_bytes,
            });
        }
        let parser = Parser::new_ext(markdown, self.options());
        let mut out = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}
