//! HTTP boundary: the four server endpoints behind an async trait.
//!
//! Everything that touches the network goes through [`Transport`], so the
//! submission controller and the preview loader never see `reqwest` types.
//! [`HttpTransport`] is the real implementation; [`StubTransport`] answers
//! from a scripted route table and records every request, which is how the
//! tests (and hosts that want a dry run) drive the client without a server.
//!
//! ## Endpoints
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | POST | `/upload` | multipart, every file under the same field |
//! | GET | `/download/{name}` | raw Markdown text |
//! | GET | `/preview_docx/{name}` | `{html_content}` or `{error}` |
//! | GET | `/preview_pdf/{name}` | the PDF itself (embedded, never fetched here) |

use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use crate::model::UploadFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

// ── Endpoint paths ───────────────────────────────────────────────────────

pub const UPLOAD_PATH: &str = "/upload";

/// `/download/{name}` with the name percent-encoded as one path segment.
pub fn download_path(name: &str) -> String {
    format!("/download/{}", urlencoding::encode(name))
}

/// `/preview_docx/{name}` with the name percent-encoded as one path segment.
pub fn preview_docx_path(name: &str) -> String {
    format!("/preview_docx/{}", urlencoding::encode(name))
}

/// `/preview_pdf/{name}` with the name percent-encoded as one path segment.
pub fn preview_pdf_path(name: &str) -> String {
    format!("/preview_pdf/{}", urlencoding::encode(name))
}

/// Link targets as they appear in rendered markup.
///
/// Requests use paths (the transport knows the server); markup needs links
/// a browser can follow, which are the same paths optionally prefixed by
/// [`ClientConfig::link_base`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    link_base: String,
}

impl Endpoints {
    pub fn new(link_base: Option<&str>) -> Self {
        Self {
            link_base: link_base.unwrap_or("").trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.link_base.as_deref())
    }

    pub fn download_url(&self, processed_filename: &str) -> String {
        format!("{}{}", self.link_base, download_path(processed_filename))
    }

    pub fn preview_pdf_url(&self, original_filename: &str) -> String {
        format!("{}{}", self.link_base, preview_pdf_path(original_filename))
    }
}

// ── Responses ────────────────────────────────────────────────────────────

/// A fully-read HTTP response.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase for `status` (empty for unknown codes).
    pub reason: String,
    pub body: Vec<u8>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("body_len", &self.body.len())
            .finish()
    }
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();
        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn text(status: u16, text: impl Into<String>) -> Self {
        Self::new(status, text.into().into_bytes())
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn body_text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// The `error` string of a JSON object body.
    ///
    /// `Err` when the body is not JSON at all, `Ok(None)` when it is JSON but
    /// carries no non-empty `error` string.
    pub fn error_field(&self) -> Result<Option<String>, serde_json::Error> {
        let value = self.json_value()?;
        Ok(value
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string))
    }

    /// `"{status} {reason}"`, trimmed when the reason is unknown.
    pub fn status_line(&self) -> String {
        format!("{} {}", self.status, self.reason).trim_end().to_string()
    }
}

// ── The trait ────────────────────────────────────────────────────────────

/// The network seam.
///
/// Paths are server-relative and already percent-encoded (see
/// [`download_path`] and friends). Implementations return `Ok` for every
/// response that arrived, whatever its status; `Err` means no response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError>;

    async fn post_multipart(
        &self,
        path: &str,
        field: &str,
        files: &[UploadFile],
    ) -> Result<HttpResponse, TransportError>;
}

// ── reqwest implementation ───────────────────────────────────────────────

/// [`Transport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    root: String,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            root: config.server_root().to_string(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }

    fn map_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            TransportError::Network(e.to_string())
        }
    }

    async fn read(&self, response: reqwest::Response) -> Result<HttpResponse, TransportError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;
        debug!("HTTP {} ({} bytes)", status, body.len());
        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        self.read(response).await
    }

    async fn post_multipart(
        &self,
        path: &str,
        field: &str,
        files: &[UploadFile],
    ) -> Result<HttpResponse, TransportError> {
        let url = self.url(path);
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(file.mime_type())
                .map_err(|e| TransportError::Network(e.to_string()))?;
            form = form.part(field.to_string(), part);
        }
        debug!("POST {} ({} files under '{}')", url, files.len(), field);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        self.read(response).await
    }
}

// ── Scripted implementation ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

/// A request as seen by [`StubTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    /// Multipart field name (POST only).
    pub field: Option<String>,
    /// Names of the uploaded files, in attachment order (POST only).
    pub file_names: Vec<String>,
}

#[derive(Debug, Clone)]
enum StubReply {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Never answers, like a server that accepted the connection and stalled.
    Hang,
}

/// In-memory [`Transport`] answering from a route table.
///
/// Routes are matched on method + exact path. Unrouted requests get an
/// empty 404, like a server that does not know the path.
///
/// ```rust
/// use doc2md_client::transport::{Method, StubTransport, Transport};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let stub = StubTransport::new()
///     .respond_json(Method::Post, "/upload", 200, json!([]));
/// let resp = stub.post_multipart("/upload", "files[]", &[]).await.unwrap();
/// assert_eq!(resp.status, 200);
/// assert_eq!(stub.requests().len(), 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<(Method, String), StubReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, method: Method, path: impl Into<String>, response: HttpResponse) -> Self {
        self.insert(method, path.into(), StubReply::Respond(response));
        self
    }

    pub fn respond_json(self, method: Method, path: impl Into<String>, status: u16, body: Value) -> Self {
        self.respond(method, path, HttpResponse::json(status, &body))
    }

    pub fn respond_text(
        self,
        method: Method,
        path: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.respond(method, path, HttpResponse::text(status, body))
    }

    pub fn fail(self, method: Method, path: impl Into<String>, error: TransportError) -> Self {
        self.insert(method, path.into(), StubReply::Fail(error));
        self
    }

    /// Record requests to `path` but never answer them.
    pub fn hang(self, method: Method, path: impl Into<String>) -> Self {
        self.insert(method, path.into(), StubReply::Hang);
        self
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of requests received for `path`, any method.
    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }

    fn insert(&self, method: Method, path: String, reply: StubReply) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert((method, path), reply);
        }
    }

    async fn answer(&self, request: RecordedRequest) -> Result<HttpResponse, TransportError> {
        let key = (request.method, request.path.clone());
        if let Ok(mut log) = self.requests.lock() {
            log.push(request);
        }
        let reply = self
            .routes
            .lock()
            .ok()
            .and_then(|routes| routes.get(&key).cloned());
        match reply {
            Some(StubReply::Respond(r)) => Ok(r),
            Some(StubReply::Fail(e)) => Err(e),
            Some(StubReply::Hang) => futures::future::pending().await,
            None => Ok(HttpResponse::new(404, Vec::new())),
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        self.answer(RecordedRequest {
            method: Method::Get,
            path: path.to_string(),
            field: None,
            file_names: Vec::new(),
        })
        .await
    }

    async fn post_multipart(
        &self,
        path: &str,
        field: &str,
        files: &[UploadFile],
    ) -> Result<HttpResponse, TransportError> {
        self.answer(RecordedRequest {
            method: Method::Post,
            path: path.to_string(),
            field: Some(field.to_string()),
            file_names: files.iter().map(|f| f.name.clone()).collect(),
        })
        .await
    }
}
