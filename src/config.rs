//! Configuration types for talking to a conversion server.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. Every knob lives in one struct so a session, its
//! transport, and its renderer all agree on the same server and limits.

use crate::error::ClientError;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Multipart field name the conversion server reads uploaded files from.
pub const DEFAULT_UPLOAD_FIELD: &str = "files[]";

/// Largest request body the conversion server accepts (32 MiB).
pub const DEFAULT_MAX_BATCH_BYTES: u64 = 32 * 1024 * 1024;

/// Configuration for a conversion-server client.
///
/// Built via [`ClientConfig::builder()`] or using [`ClientConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2md_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .server_url("http://localhost:5000")
///     .request_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.upload_field, "files[]");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the conversion server. Default: `http://127.0.0.1:5000`.
    pub server_url: String,

    /// Multipart field every selected file is attached under. Default: `files[]`.
    pub upload_field: String,

    /// Per-request timeout in seconds. Default: 120.
    ///
    /// Conversion happens while the upload request is open, so this bounds
    /// the slowest document in a batch, not just the transfer.
    pub request_timeout_secs: u64,

    /// Upper bound on the summed size of one batch. Default: 32 MiB; `0` disables.
    ///
    /// Oversized batches are rejected locally instead of letting the server
    /// answer 413.
    pub max_batch_bytes: u64,

    /// Prefix for links placed in rendered markup (download links, PDF frames).
    ///
    /// `None` keeps links server-relative (`/download/x.md`), which is what a
    /// page served by the conversion server wants. A page opened from disk
    /// needs the absolute server URL here.
    pub link_base: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            upload_field: DEFAULT_UPLOAD_FIELD.to_string(),
            request_timeout_secs: 120,
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            link_base: None,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// The server URL with any trailing slash removed.
    pub fn server_root(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into();
        self
    }

    pub fn upload_field(mut self, field: impl Into<String>) -> Self {
        self.config.upload_field = field.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn max_batch_bytes(mut self, bytes: u64) -> Self {
        self.config.max_batch_bytes = bytes;
        self
    }

    pub fn link_base(mut self, base: impl Into<String>) -> Self {
        self.config.link_base = Some(base.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ClientError> {
        let c = &self.config;
        let url = Url::parse(&c.server_url).map_err(|e| {
            ClientError::InvalidConfig(format!("server URL '{}' is invalid: {e}", c.server_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "server URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.upload_field.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "upload field name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
